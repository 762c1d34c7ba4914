use std::fs;
use std::path::PathBuf;

use usage_grammar::normalize::normalize;
use usage_grammar::{
    Error, EvalConfig, Evaluation, Grammar, GrammarError, ParsedArgs, TokenError, UsageFailure,
    Value, evaluate,
};

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(path).expect("fixture file must be readable")
}

fn args(doc: &str, argv: &[&str]) -> ParsedArgs {
    args_with(doc, argv, &EvalConfig::default())
}

fn args_with(doc: &str, argv: &[&str], config: &EvalConfig) -> ParsedArgs {
    match evaluate(doc, argv.iter().copied(), config) {
        Ok(Evaluation::Args(args)) => args,
        other => panic!("expected parsed arguments for {argv:?}, got {other:?}"),
    }
}

fn list(items: &[&str]) -> Value {
    Value::List(items.iter().map(|s| s.to_string()).collect())
}

#[test]
fn test_tcp_scenario_produces_full_result() {
    let doc = "<usage>\nmy_program tcp <host> <port> [--timeout=<seconds>]\nmy_program (-h | --help | --version)\n</usage>";
    let result = args(doc, &["tcp", "127.0.0.1", "80", "--timeout", "30"]);

    let expected: ParsedArgs = [
        ("tcp", Value::Bool(true)),
        ("<host>", Value::from("127.0.0.1")),
        ("<port>", Value::from("80")),
        ("--timeout", Value::from("30")),
        ("-h", Value::Bool(false)),
        ("--help", Value::Bool(false)),
        ("--version", Value::Bool(false)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    assert_eq!(result, expected);
}

#[test]
fn test_serial_mode_uses_declared_default() {
    let doc = fixture("tcp_serial.txt");
    let result = args(&doc, &["serial", "/dev/ttyS0"]);
    assert_eq!(result.str("--baud"), Some("9600"));
    assert_eq!(result.get("--timeout"), Some(&Value::Null));
    assert!(result.flag("serial"));
    assert!(!result.flag("tcp"));
}

#[test]
fn test_option_value_forms_are_equivalent() {
    let doc = fixture("tcp_serial.txt");
    let spaced = args(&doc, &["serial", "p", "--baud", "115200"]);
    let inline = args(&doc, &["serial", "p", "--baud=115200"]);
    let prefix = args(&doc, &["serial", "p", "--ba=115200"]);
    assert_eq!(spaced, inline);
    assert_eq!(spaced, prefix);
    assert_eq!(spaced.str("--baud"), Some("115200"));
}

#[test]
fn test_option_order_does_not_matter() {
    let doc = fixture("tcp_serial.txt");
    let a = args(&doc, &["serial", "p", "--baud=1", "--timeout=2"]);
    let b = args(&doc, &["--timeout=2", "serial", "--baud=1", "p"]);
    assert_eq!(a, b);
}

#[test]
fn test_short_flag_repetition_counts() {
    let doc = "<usage>\nprog [-v]...\n</usage>\n<options>\n-v, --verbose  Verbose.\n</options>";
    assert_eq!(args(doc, &["-vvv"]).get("--verbose"), Some(&Value::Count(3)));
    assert_eq!(args(doc, &["-v", "--verbose", "-v"]).count("--verbose"), 3);
    assert_eq!(args(doc, &[]).count("--verbose"), 0);
}

#[test]
fn test_declared_spellings_share_one_count() {
    let doc = "<usage>\nprog (-v | --verbose)...\n</usage>\n<options>\n-v, --verbose  Verbose.\n</options>";
    assert_eq!(args(doc, &["-vvv"]).get("--verbose"), Some(&Value::Count(3)));
    assert_eq!(args(doc, &["--verbose", "-v", "--verbose"]).count("--verbose"), 3);
    assert!(args(doc, &["-v"]).get("-v").is_none());
}

#[test]
fn test_alternative_spellings_count_independently() {
    let doc = fixture("git_like.txt");
    let result = args(&doc, &["-vv", "--verbose", "status"]);
    assert_eq!(result.count("-v"), 2);
    assert_eq!(result.count("--verbose"), 1);
    assert_eq!(result.str("<command>"), Some("status"));
    assert_eq!(result.get("<args>"), Some(&list(&[])));
}

#[test]
fn test_options_shortcut_accepts_declared_options() {
    let doc = fixture("git_like.txt");
    let result = args(&doc, &["-C", "/tmp", "--bare", "log", "--", "-p"]);
    assert_eq!(result.str("-C"), Some("/tmp"));
    assert!(result.flag("--bare"));
    assert_eq!(result.str("--git-dir"), Some(".git"));
    assert_eq!(result.str("<command>"), Some("log"));
    assert_eq!(result.get("<args>"), Some(&list(&["--", "-p"])));
}

#[test]
fn test_options_first_keeps_later_options_positional() {
    let doc = fixture("git_like.txt");
    let config = EvalConfig::default().with_options_first();
    let result = args_with(&doc, &["--bare", "commit", "--amend", "-m"], &config);
    assert!(result.flag("--bare"));
    assert_eq!(result.str("<command>"), Some("commit"));
    assert_eq!(result.get("<args>"), Some(&list(&["--amend", "-m"])));
}

#[test]
fn test_unknown_option_is_usage_error() {
    let doc = fixture("git_like.txt");
    let err = evaluate(&doc, ["--no-such-option", "status"], &EvalConfig::default()).unwrap_err();
    let Error::Usage(usage) = err else {
        panic!("expected usage error, got {err:?}");
    };
    assert!(matches!(usage.reason, UsageFailure::Leftover(_)));
    assert!(usage.to_string().contains("--no-such-option"));
}

#[test]
fn test_ambiguous_prefix_is_usage_error() {
    let doc = "<usage>\nprog [--verbose] [--version]\n</usage>";
    let err = evaluate(doc, ["--ver"], &EvalConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::Usage(ref usage) if matches!(usage.reason, UsageFailure::Token(TokenError::AmbiguousPrefix { .. }))
    ));
}

#[test]
fn test_ambiguous_declaration_is_grammar_error() {
    let doc = "<usage>\nprog -x\n</usage>\n<options>\n-x, --ex  One.\n-x, --extra  Two.\n</options>";
    let err = Grammar::compile(doc).unwrap_err();
    assert_eq!(
        err,
        GrammarError::Syntax(TokenError::AmbiguousShort {
            short: "-x".into(),
            count: 2
        })
    );
}

#[test]
fn test_either_prefers_alternative_consuming_most() {
    let doc = fixture("naval_fate.txt");
    let result = args(&doc, &["ship", "shoot", "3", "4"]);
    assert!(result.flag("shoot"));
    assert_eq!(result.str("<x>"), Some("3"));

    let named = args(&doc, &["ship", "Titanic", "move", "1", "2"]);
    assert_eq!(named.get("<name>"), Some(&list(&["Titanic"])));
    assert!(!named.flag("shoot"));
}

#[test]
fn test_repeated_positional_collects_list() {
    let doc = fixture("naval_fate.txt");
    let result = args(&doc, &["ship", "new", "A", "B", "C"]);
    assert_eq!(result.get("<name>"), Some(&list(&["A", "B", "C"])));
    assert_eq!(result.str("--speed"), Some("10"));
}

#[test]
fn test_help_and_version_require_declaration() {
    let doc = "<usage>\nprog <x>\n</usage>";
    let config = EvalConfig::default().with_version("1.0");
    for argv in [["-h"], ["--help"], ["--version"]] {
        let err = evaluate(doc, argv, &config).unwrap_err();
        assert!(
            matches!(&err, Error::Usage(usage) if matches!(usage.reason, UsageFailure::Leftover(_))),
            "{argv:?} gave {err:?}"
        );
    }
}

#[test]
fn test_help_and_version_short_circuit() {
    let doc = fixture("naval_fate.txt");
    let config = EvalConfig::default().with_version("Naval Fate 2.0");

    let help = evaluate(&doc, ["ship", "--help"], &config).unwrap();
    let Evaluation::Help(text) = help else {
        panic!("expected help text");
    };
    assert!(text.starts_with("Naval Fate.\n  naval_fate ship new"));
    assert!(text.ends_with("Drifting mine."));

    assert_eq!(
        evaluate(&doc, ["--version"], &config).unwrap(),
        Evaluation::Version("Naval Fate 2.0".into())
    );
    assert!(matches!(
        evaluate(&doc, ["--help", "--version"], &config).unwrap(),
        Evaluation::Help(_)
    ));
}

#[test]
fn test_double_dash_matches_grammar_literal() {
    let doc = "<usage>\nprog [-o] [--] <file>\n</usage>";
    let result = args(doc, &["--", "-o"]);
    assert!(result.flag("--"));
    assert!(!result.flag("-o"));
    assert_eq!(result.str("<file>"), Some("-o"));
}

#[test]
fn test_normalize_is_idempotent_on_compiled_tree() {
    let grammar = Grammar::compile(&fixture("git_like.txt")).unwrap();
    let mut tree = grammar.tree().clone();
    normalize(&mut tree);
    assert_eq!(&tree, grammar.tree());
}

#[test]
fn test_compiled_grammar_is_reusable_across_threads() {
    let grammar = Grammar::compile(&fixture("naval_fate.txt")).unwrap();
    let config = EvalConfig::default();
    std::thread::scope(|scope| {
        for n in 0..4 {
            let grammar = &grammar;
            let config = &config;
            scope.spawn(move || {
                let x = n.to_string();
                let result = grammar
                    .evaluate(["mine", "set", x.as_str(), "0", "--moored"], config)
                    .unwrap();
                let args = result.args().unwrap();
                assert_eq!(args.str("<x>"), Some(x.as_str()));
                assert!(args.flag("--moored"));
            });
        }
    });
    let argvs = (0..16)
        .map(|n| vec!["ship".to_string(), "new".to_string(), format!("s{n}")])
        .collect::<Vec<_>>();
    let results = grammar.evaluate_batch(&argvs, &config);
    for (n, result) in results.iter().enumerate() {
        let args = result.as_ref().unwrap().args().unwrap();
        assert_eq!(args.list("<name>"), vec![format!("s{n}")]);
    }
}
