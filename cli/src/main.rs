use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use usage_grammar::output::{OutputFormat, format_batch, format_evaluation};
use usage_grammar::{EvalConfig, Grammar};

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Table,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(fmt: CliOutputFormat) -> Self {
        match fmt {
            CliOutputFormat::Json => Self::Json,
            CliOutputFormat::Yaml => Self::Yaml,
            CliOutputFormat::Table => Self::Table,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "usage-grammar", version)]
#[command(about = "Compile usage grammars and match argument vectors against them")]
struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. warn, debug, usage_grammar=trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluate an argument vector against a grammar.
    Eval(EvalArgs),
    /// Compile a grammar and report problems in its option declarations.
    Check(GrammarArgs),
    /// Print the normalized pattern tree of a grammar.
    Inspect(GrammarArgs),
    /// Evaluate one argument vector per input line, in parallel.
    Batch(BatchArgs),
}

#[derive(Debug, Args)]
struct GrammarArgs {
    /// Grammar description file (`-` reads stdin).
    #[arg(long)]
    grammar: PathBuf,
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// YAML evaluation settings; the flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Answer --version with this string.
    #[arg(long)]
    version_string: Option<String>,
    /// Match -h/--help like any other option instead of printing help.
    #[arg(long)]
    no_help: bool,
    /// Treat everything after the first positional argument as positional.
    #[arg(long)]
    options_first: bool,
}

#[derive(Debug, Args)]
struct EvalArgs {
    #[command(flatten)]
    grammar: GrammarArgs,
    #[command(flatten)]
    config: ConfigArgs,
    /// Output format for parsed arguments.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Argument vector to evaluate, given after `--`.
    #[arg(last = true)]
    argv: Vec<String>,
}

#[derive(Debug, Args)]
struct BatchArgs {
    #[command(flatten)]
    grammar: GrammarArgs,
    #[command(flatten)]
    config: ConfigArgs,
    /// File with one whitespace-separated argument vector per line.
    #[arg(long)]
    input: PathBuf,
}

/// A failure that ends the process with `code`.
#[derive(Debug)]
struct Failure {
    message: String,
    code: u8,
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Self { message, code: 1 }
    }
}

impl From<usage_grammar::Error> for Failure {
    fn from(err: usage_grammar::Error) -> Self {
        Self {
            message: err.to_string(),
            code: u8::try_from(err.exit_code()).unwrap_or(1),
        }
    }
}

impl From<usage_grammar::GrammarError> for Failure {
    fn from(err: usage_grammar::GrammarError) -> Self {
        usage_grammar::Error::from(err).into()
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let result = match cli.command {
        Command::Eval(args) => run_eval(args),
        Command::Check(args) => run_check(args),
        Command::Inspect(args) => run_inspect(args),
        Command::Batch(args) => run_batch(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            eprintln!("error: {}", failure.message);
            ExitCode::from(failure.code)
        }
    }
}

fn run_eval(args: EvalArgs) -> Result<(), Failure> {
    let grammar = compile(&args.grammar.grammar)?;
    let config = eval_config(&args.config)?;
    debug!(argv = ?args.argv, ?config, "evaluating");

    let evaluation = grammar.evaluate(args.argv, &config)?;
    let output = format_evaluation(&evaluation, args.format.into())?;
    println!("{}", output.trim_end());
    Ok(())
}

fn run_check(args: GrammarArgs) -> Result<(), Failure> {
    let grammar = compile(&args.grammar)?;
    let findings = grammar.lint();

    println!("grammar OK");
    println!("{}", grammar.usage().trim_end());
    println!("options: {}", grammar.options().len());
    println!("leaves: {}", grammar.tree().leaves().len());
    for finding in &findings {
        println!("warning: {finding}");
    }
    Ok(())
}

fn run_inspect(args: GrammarArgs) -> Result<(), Failure> {
    let grammar = compile(&args.grammar)?;
    println!("{}", grammar.tree());
    println!();
    println!("{}", grammar.usage().trim_end());
    Ok(())
}

fn run_batch(args: BatchArgs) -> Result<(), Failure> {
    let grammar = compile(&args.grammar.grammar)?;
    let config = eval_config(&args.config)?;
    let input = fs::read_to_string(&args.input)
        .map_err(|err| format!("Failed to read '{}': {err}", args.input.display()))?;

    let argvs = input
        .lines()
        .map(|line| line.split_whitespace().map(String::from).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    debug!(count = argvs.len(), "evaluating batch");

    let results = grammar.evaluate_batch(&argvs, &config);
    println!("{}", format_batch(&results)?);
    Ok(())
}

fn compile(path: &Path) -> Result<Grammar, Failure> {
    let doc = read_grammar(path)?;
    Ok(Grammar::compile(&doc)?)
}

fn read_grammar(path: &Path) -> Result<String, String> {
    if path == Path::new("-") {
        let mut doc = String::new();
        std::io::stdin()
            .read_to_string(&mut doc)
            .map_err(|err| format!("Failed to read stdin: {err}"))?;
        return Ok(doc);
    }
    fs::read_to_string(path).map_err(|err| format!("Failed to read '{}': {err}", path.display()))
}

fn eval_config(args: &ConfigArgs) -> Result<EvalConfig, String> {
    let mut config = match &args.config {
        Some(path) => EvalConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => EvalConfig::default(),
    };
    if let Some(version) = &args.version_string {
        config.version = Some(version.clone());
    }
    if args.no_help {
        config.help = false;
    }
    if args.options_first {
        config.options_first = true;
    }
    Ok(config)
}
