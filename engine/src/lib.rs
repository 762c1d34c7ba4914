//! Usage-grammar compiler and argument matcher.
//!
//! A program describes its command line in a grammar description: one
//! `<usage>` section listing the accepted invocations and any number of
//! `<options>` sections declaring options, their arguments and defaults.
//! This crate compiles such a description into a pattern tree and matches
//! argument vectors against it, producing a [`ParsedArgs`] map from every
//! element name to its value.
//!
//! # Main entry points
//!
//! - [`evaluate`]: compile and evaluate in one call.
//! - [`Grammar::compile`] followed by [`Grammar::evaluate`]: compile once,
//!   evaluate many argument vectors (from any number of threads).
//! - [`Grammar::evaluate_batch`]: evaluate many argument vectors in
//!   parallel.
//!
//! # Example
//!
//! ```
//! use usage_grammar::{EvalConfig, Evaluation, Grammar, Value};
//!
//! let doc = "\
//! <usage>
//!   my_program tcp <host> <port> [--timeout=<seconds>]
//!   my_program (-h | --help | --version)
//! </usage>
//! ";
//!
//! let grammar = Grammar::compile(doc).unwrap();
//! let argv = ["tcp", "127.0.0.1", "80", "--timeout", "30"];
//! let Evaluation::Args(args) = grammar.evaluate(argv, &EvalConfig::default()).unwrap() else {
//!     panic!("expected parsed arguments");
//! };
//! assert_eq!(args.get("tcp"), Some(&Value::Bool(true)));
//! assert_eq!(args.str("<port>"), Some("80"));
//! assert_eq!(args.str("--timeout"), Some("30"));
//! assert_eq!(args.get("--version"), Some(&Value::Bool(false)));
//! ```
//!
//! # Errors
//!
//! A malformed description is a [`GrammarError`]; an argument vector the
//! grammar rejects is a [`UsageError`], which displays together with the
//! usage text.

pub mod config;
mod error;
pub mod matcher;
pub mod normalize;
pub mod output;
pub mod parser;

use rayon::prelude::*;
use tracing::{debug, trace};

pub use config::EvalConfig;
pub use error::{
    ConfigError, Error, ErrorKind, GrammarError, ParseError, TokenError, UsageError, UsageFailure,
};
pub use usage_grammar_core::{
    Leaf, OptionLeaf, ParsedArgs, Pattern, PatternTree, ValidationError, Value,
};

use matcher::Matcher;
use parser::{Section, Tokens};
use usage_grammar_core::{assemble, validate_options};

/// Outcome of a successful evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// The argument vector matched.
    Args(ParsedArgs),
    /// Help was requested; carries the help text.
    Help(String),
    /// The version was requested; carries the configured version string.
    Version(String),
}

impl Evaluation {
    /// The parsed arguments, if the argument vector matched.
    pub fn args(&self) -> Option<&ParsedArgs> {
        match self {
            Self::Args(args) => Some(args),
            _ => None,
        }
    }
}

/// A compiled grammar description.
///
/// Compilation parses and normalizes the description once; evaluation only
/// reads it, so one `Grammar` can be shared across threads.
#[derive(Debug, Clone)]
pub struct Grammar {
    usage: String,
    help: String,
    /// Options declared in `<options>` sections.
    declared: Vec<OptionLeaf>,
    /// Declared options plus those first met in the usage section.
    options: Vec<OptionLeaf>,
    tree: PatternTree,
}

impl Grammar {
    /// Compiles a grammar description.
    ///
    /// # Errors
    ///
    /// Returns a [`GrammarError`] when the description has no `<usage>`
    /// section, more than one, an empty one, or a pattern that does not
    /// parse.
    pub fn compile(doc: &str) -> Result<Self, GrammarError> {
        let section = match parser::sections::extract(Section::Usage, doc).as_slice() {
            [] => return Err(GrammarError::MissingUsage),
            [section] => *section,
            _ => return Err(GrammarError::DuplicateUsage),
        };
        let formal = parser::formal_usage(section).ok_or(GrammarError::EmptyUsage)?;

        let declared = parser::parse_defaults(doc);
        let mut options = declared.clone();
        let mut tree = parser::parse_pattern(&formal, &mut options)?;
        parser::fill_options_shortcuts(&mut tree, &declared);
        normalize::normalize(&mut tree);

        debug!(
            declared = declared.len(),
            options = options.len(),
            leaves = tree.leaves().len(),
            "compiled grammar"
        );
        trace!(tree = %tree, "pattern tree");

        Ok(Self {
            usage: parser::usage_text(section),
            help: parser::help_text(doc),
            declared,
            options,
            tree,
        })
    }

    /// Evaluates one argument vector (program name excluded).
    ///
    /// Help and version requests are answered before matching, help first,
    /// and only for spellings the grammar itself knows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Usage`] when the argument vector does not fit the
    /// grammar.
    pub fn evaluate<I, S>(&self, argv: I, config: &EvalConfig) -> Result<Evaluation, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options = self.options.clone();
        let mut tokens = Tokens::from_argv(argv);
        let parsed = parser::parse_argv(&mut tokens, &mut options, config.options_first)
            .map_err(|err| err.into_error(&self.usage))?;

        if config.help && self.requested(&parsed, &["-h", "--help"]) {
            return Ok(Evaluation::Help(self.help.clone()));
        }
        if let Some(version) = config.version.as_deref().filter(|v| !v.is_empty()) {
            if self.requested(&parsed, &["--version"]) {
                return Ok(Evaluation::Version(version.to_string()));
            }
        }

        let outcome = Matcher::new(&self.tree).run(&parsed);
        trace!(
            matched = outcome.matched,
            left = outcome.left.len(),
            collected = outcome.collected.len(),
            "match finished"
        );
        if outcome.is_complete() {
            return Ok(Evaluation::Args(assemble(&self.tree.flat(), &outcome.collected)));
        }
        if outcome.left.is_empty() {
            Err(UsageError::no_match(&self.usage).into())
        } else {
            Err(UsageError::leftover(&outcome.left, &self.usage).into())
        }
    }

    /// Evaluates many argument vectors in parallel. Results are in input
    /// order.
    pub fn evaluate_batch(
        &self,
        argvs: &[Vec<String>],
        config: &EvalConfig,
    ) -> Vec<Result<Evaluation, Error>> {
        argvs
            .par_iter()
            .map(|argv| self.evaluate(argv.iter().cloned(), config))
            .collect()
    }

    /// The usage text shown with usage errors (`Usage:` plus the section).
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// The text returned by [`Evaluation::Help`].
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Every option known to the grammar: declared ones first, then those
    /// only mentioned in the usage section.
    pub fn options(&self) -> &[OptionLeaf] {
        &self.options
    }

    /// The normalized pattern tree.
    pub fn tree(&self) -> &PatternTree {
        &self.tree
    }

    /// Problems in the `<options>` declarations that compilation tolerates.
    pub fn lint(&self) -> Vec<ValidationError> {
        validate_options(&self.declared)
    }

    /// Whether `parsed` sets one of `names` that the grammar declares.
    /// Options first met in the argument vector never count.
    fn requested(&self, parsed: &[Leaf], names: &[&str]) -> bool {
        let declared: Vec<&str> = names
            .iter()
            .copied()
            .filter(|name| self.options.iter().any(|option| option.matches(name)))
            .collect();
        parsed.iter().any(|leaf| is_set(leaf, &declared))
    }
}

fn is_set(leaf: &Leaf, names: &[&str]) -> bool {
    leaf.name().is_some_and(|name| names.contains(&name)) && leaf.value().is_truthy()
}

/// Compiles `doc` and evaluates `argv` against it.
///
/// # Examples
///
/// ```
/// use usage_grammar::{EvalConfig, Evaluation, evaluate};
///
/// let doc = "<usage>\nprog [-v]...\nprog --help\n</usage>";
/// let result = evaluate(doc, ["-vv"], &EvalConfig::default()).unwrap();
/// assert_eq!(result.args().unwrap().count("-v"), 2);
///
/// let help = evaluate(doc, ["--help"], &EvalConfig::default()).unwrap();
/// assert_eq!(help, Evaluation::Help("prog [-v]...\nprog --help".into()));
/// ```
pub fn evaluate<I, S>(doc: &str, argv: I, config: &EvalConfig) -> Result<Evaluation, Error>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Grammar::compile(doc)?.evaluate(argv, config)
}
