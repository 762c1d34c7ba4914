//! Option registry: declared options and option-token parsing.
//!
//! The registry is the list of options known while a token stream is being
//! consumed. It starts with the declarations from the `<options>` sections
//! and grows whenever an undeclared option is seen, so later references to
//! the same spelling resolve to the same record.

use std::sync::LazyLock;

use regex::Regex;
use usage_grammar_core::{OptionLeaf, Value};

use super::sections::{self, Section};
use super::tokens::Tokens;
use crate::error::{ParseError, TokenError};

// SAFETY: This regex is a compile-time constant and is validated by tests.
static DEFAULT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[default: (.*)\]").expect("static regex must compile"));

/// Parses every option declared in the `<options>` sections of `doc`.
///
/// A declaration starts at a line whose first non-blank text is a hyphen
/// followed by a non-blank character; lines without one are folded into the
/// preceding declaration. Text before the first declaration is ignored.
pub fn parse_defaults(doc: &str) -> Vec<OptionLeaf> {
    let mut defaults = Vec::new();
    for section in sections::extract(Section::Options, doc) {
        let mut fragments: Vec<String> = Vec::new();
        for line in section.lines() {
            let stripped = line.trim_start_matches([' ', '\t']);
            if starts_declaration(stripped) {
                fragments.push(stripped.to_string());
            } else if let Some(current) = fragments.last_mut() {
                current.push('\n');
                current.push_str(line);
            }
        }
        defaults.extend(fragments.iter().map(|fragment| parse_option(fragment)));
    }
    defaults
}

fn starts_declaration(line: &str) -> bool {
    let mut chars = line.chars();
    chars.next() == Some('-') && chars.next().is_some_and(|c| !c.is_whitespace())
}

/// Parses one option declaration such as `-o FILE, --output=FILE  Out [default: a.txt]`.
///
/// Spellings and the argument placeholder come before the first double
/// space; the description after it may carry a `[default: X]` annotation,
/// which only applies to options taking a value.
pub fn parse_option(fragment: &str) -> OptionLeaf {
    let trimmed = fragment.trim();
    let (spellings, description) = trimmed.split_once("  ").unwrap_or((trimmed, ""));
    let spellings = spellings.replace([',', '='], " ");

    let mut short = None;
    let mut long = None;
    let mut takes_value = false;
    for word in spellings.split_whitespace() {
        if word.starts_with("--") {
            long = Some(word);
        } else if word.starts_with('-') {
            short = Some(word);
        } else {
            takes_value = true;
        }
    }

    let option = OptionLeaf::new(short, long, takes_value);
    if !takes_value {
        return option;
    }
    match DEFAULT_RE.captures(description).and_then(|caps| caps.get(1)) {
        Some(default) => option.with_value(Value::from(default.as_str())),
        None => option,
    }
}

/// Parses a long option token (`--name` or `--name=value`).
///
/// On an argv stream an unambiguous prefix of a declared long option is
/// accepted, and the returned record carries the value given on the
/// command line (`true` for a flag). On a grammar stream the returned
/// record carries the declared default.
pub fn parse_long(
    tokens: &mut Tokens,
    options: &mut Vec<OptionLeaf>,
) -> Result<OptionLeaf, ParseError> {
    let token = tokens.take().unwrap_or_default();
    let (long, inline_value) = match token.split_once('=') {
        Some((long, value)) => (long.to_string(), Some(value.to_string())),
        None => (token, None),
    };

    let mut similar = options
        .iter()
        .filter(|o| o.long.as_deref() == Some(long.as_str()))
        .cloned()
        .collect::<Vec<_>>();
    if tokens.is_argv() && similar.is_empty() {
        similar = options
            .iter()
            .filter(|o| o.long.as_deref().is_some_and(|l| l.starts_with(long.as_str())))
            .cloned()
            .collect();
    }

    match similar.as_slice() {
        [] => {
            let takes_value = inline_value.is_some();
            options.push(OptionLeaf::new(None, Some(long.as_str()), takes_value));
            let mut option = OptionLeaf::new(None, Some(long.as_str()), takes_value);
            if tokens.is_argv() {
                option.value = inline_value.map_or(Value::Bool(true), Value::from);
            }
            Ok(option)
        }
        [declared] => {
            let mut option = declared.clone();
            let display = option.long.clone().unwrap_or_default();
            let value = if option.takes_value {
                match inline_value {
                    Some(value) => Some(value),
                    None => Some(take_value(tokens, &display)?),
                }
            } else {
                if inline_value.is_some() {
                    return Err(tokens.error(TokenError::UnexpectedValue(display)));
                }
                None
            };
            if tokens.is_argv() {
                option.value = value.map_or(Value::Bool(true), Value::from);
            }
            Ok(option)
        }
        _ => Err(tokens.error(TokenError::AmbiguousPrefix {
            prefix: long.clone(),
            candidates: similar.iter().filter_map(|o| o.long.clone()).collect(),
        })),
    }
}

/// Parses a short option cluster (`-abc`, `-ofile`, `-o file`).
///
/// Each character is one option; the first one that takes a value consumes
/// the rest of the cluster, or the next token when the cluster ends there.
pub fn parse_shorts(
    tokens: &mut Tokens,
    options: &mut Vec<OptionLeaf>,
) -> Result<Vec<OptionLeaf>, ParseError> {
    let token = tokens.take().unwrap_or_default();
    let mut left = token.trim_start_matches('-');
    let mut parsed = Vec::new();

    while let Some(first) = left.chars().next() {
        let short = format!("-{first}");
        left = &left[first.len_utf8()..];

        let similar = options
            .iter()
            .filter(|o| o.short.as_deref() == Some(short.as_str()))
            .cloned()
            .collect::<Vec<_>>();

        let option = match similar.as_slice() {
            [] => {
                options.push(OptionLeaf::new(Some(short.as_str()), None, false));
                let mut option = OptionLeaf::new(Some(short.as_str()), None, false);
                if tokens.is_argv() {
                    option.value = Value::Bool(true);
                }
                option
            }
            [declared] => {
                let mut option = declared.clone();
                let mut value = None;
                if option.takes_value {
                    if left.is_empty() {
                        value = Some(take_value(tokens, &short)?);
                    } else {
                        value = Some(left.to_string());
                        left = "";
                    }
                }
                if tokens.is_argv() {
                    option.value = value.map_or(Value::Bool(true), Value::from);
                }
                option
            }
            _ => {
                return Err(tokens.error(TokenError::AmbiguousShort {
                    short,
                    count: similar.len(),
                }));
            }
        };
        parsed.push(option);
    }
    Ok(parsed)
}

/// Takes the next token as an option's value. `--` never counts as one.
fn take_value(tokens: &mut Tokens, option: &str) -> Result<String, ParseError> {
    match tokens.current() {
        None | Some("--") => Err(tokens.error(TokenError::MissingValue(option.to_string()))),
        Some(_) => Ok(tokens.take().unwrap_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn registry() -> Vec<OptionLeaf> {
        vec![
            OptionLeaf::new(Some("-h"), Some("--help"), false),
            OptionLeaf::new(Some("-o"), Some("--output"), true),
            OptionLeaf::new(None, Some("--verbose"), false),
            OptionLeaf::new(None, Some("--version"), false),
        ]
    }

    #[test]
    fn test_parse_option_spellings_and_arity() {
        assert_eq!(
            parse_option("-h, --help  Show this screen."),
            OptionLeaf::new(Some("-h"), Some("--help"), false)
        );
        assert_eq!(
            parse_option("--speed=<kn>  Speed in knots [default: 10]."),
            OptionLeaf::new(None, Some("--speed"), true).with_value("10".into())
        );
        assert_eq!(
            parse_option("-o FILE  Output file."),
            OptionLeaf::new(Some("-o"), None, true)
        );
    }

    #[test]
    fn test_parse_option_default_is_case_insensitive() {
        let option = parse_option("--baud=<n>  Baudrate [DEFAULT: 9600]");
        assert_eq!(option.value, Value::from("9600"));
    }

    #[test]
    fn test_flag_ignores_default_annotation() {
        let option = parse_option("-q  Quiet [default: yes]");
        assert_eq!(option.value, Value::Bool(false));
    }

    #[test]
    fn test_parse_defaults_folds_continuation_lines() {
        let doc = "\
<options>
Options:
  --moored     Moored (anchored) mine.
  --speed=<kn>  Speed in knots.
                Applies when moving [default: 10].
  -h --help    Show this screen.
</options>
";
        let options = parse_defaults(doc);
        assert_eq!(options.len(), 3);
        assert_eq!(options[0], OptionLeaf::new(None, Some("--moored"), false));
        assert_eq!(options[1].value, Value::from("10"));
        assert_eq!(options[2].short.as_deref(), Some("-h"));
    }

    #[test]
    fn test_parse_defaults_without_options_section() {
        assert!(parse_defaults("<usage>\nprog\n</usage>").is_empty());
    }

    #[test]
    fn test_parse_long_exact_match_takes_next_token() {
        let mut options = registry();
        let mut tokens = Tokens::from_argv(["--output", "out.txt", "rest"]);
        let option = parse_long(&mut tokens, &mut options).unwrap();
        assert_eq!(option.value, Value::from("out.txt"));
        assert_eq!(tokens.current(), Some("rest"));
    }

    #[test]
    fn test_parse_long_unique_prefix_on_argv() {
        let mut options = registry();
        let mut tokens = Tokens::from_argv(["--out=a.txt"]);
        let option = parse_long(&mut tokens, &mut options).unwrap();
        assert_eq!(option.long.as_deref(), Some("--output"));
        assert_eq!(option.value, Value::from("a.txt"));
    }

    #[test]
    fn test_parse_long_ambiguous_prefix() {
        let mut options = registry();
        let mut tokens = Tokens::from_argv(["--ver"]);
        let err = parse_long(&mut tokens, &mut options).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Invocation);
        assert_eq!(
            err.to_string(),
            "--ver is not a unique prefix: --verbose, --version?"
        );
    }

    #[test]
    fn test_parse_long_prefix_not_used_in_grammar() {
        let mut options = registry();
        let mut tokens = Tokens::from_pattern("--ver");
        let option = parse_long(&mut tokens, &mut options).unwrap();
        assert_eq!(option, OptionLeaf::new(None, Some("--ver"), false));
        assert_eq!(options.len(), 5);
    }

    #[test]
    fn test_parse_long_flag_rejects_value() {
        let mut options = registry();
        let mut tokens = Tokens::from_argv(["--help=yes"]);
        let err = parse_long(&mut tokens, &mut options).unwrap_err();
        assert_eq!(err.error, TokenError::UnexpectedValue("--help".into()));
    }

    #[test]
    fn test_parse_long_missing_value_before_double_dash() {
        let mut options = registry();
        let mut tokens = Tokens::from_argv(["--output", "--"]);
        let err = parse_long(&mut tokens, &mut options).unwrap_err();
        assert_eq!(err.error, TokenError::MissingValue("--output".into()));
    }

    #[test]
    fn test_parse_long_unknown_option_is_registered() {
        let mut options = registry();
        let mut tokens = Tokens::from_argv(["--color=auto"]);
        let option = parse_long(&mut tokens, &mut options).unwrap();
        assert_eq!(option.value, Value::from("auto"));
        assert!(option.takes_value);
        let registered = options.last().unwrap();
        assert_eq!(registered.long.as_deref(), Some("--color"));
        assert_eq!(registered.value, Value::Null);
    }

    #[test]
    fn test_parse_shorts_cluster_and_attached_value() {
        let mut options = registry();
        let mut tokens = Tokens::from_argv(["-hofile.txt"]);
        let parsed = parse_shorts(&mut tokens, &mut options).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].value, Value::Bool(true));
        assert_eq!(parsed[1].long.as_deref(), Some("--output"));
        assert_eq!(parsed[1].value, Value::from("file.txt"));
    }

    #[test]
    fn test_parse_shorts_value_from_next_token() {
        let mut options = registry();
        let mut tokens = Tokens::from_argv(["-o", "file.txt"]);
        let parsed = parse_shorts(&mut tokens, &mut options).unwrap();
        assert_eq!(parsed[0].value, Value::from("file.txt"));
        assert_eq!(tokens.current(), None);
    }

    #[test]
    fn test_parse_shorts_missing_value() {
        let mut options = registry();
        let mut tokens = Tokens::from_argv(["-o"]);
        let err = parse_shorts(&mut tokens, &mut options).unwrap_err();
        assert_eq!(err.error, TokenError::MissingValue("-o".into()));
    }

    #[test]
    fn test_parse_shorts_ambiguous_declaration_is_grammar_error() {
        let mut options = vec![
            OptionLeaf::new(Some("-x"), Some("--ex"), false),
            OptionLeaf::new(Some("-x"), Some("--extra"), false),
        ];
        let mut tokens = Tokens::from_pattern("-x");
        let err = parse_shorts(&mut tokens, &mut options).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Grammar);
        assert_eq!(err.to_string(), "-x is specified ambiguously 2 times");
    }
}
