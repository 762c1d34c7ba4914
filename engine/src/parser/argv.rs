//! Argument vector parsing.

use usage_grammar_core::{Leaf, OptionLeaf};

use super::options::{parse_long, parse_shorts};
use super::tokens::Tokens;
use crate::error::ParseError;

/// Converts a user's argument vector into leaves.
///
/// Options are resolved against (and, when unknown, added to) `options`;
/// everything else becomes an unnamed positional. `--` ends option
/// parsing: it and every later token are kept as positionals. With
/// `options_first`, the first positional does the same.
pub fn parse_argv(
    tokens: &mut Tokens,
    options: &mut Vec<OptionLeaf>,
    options_first: bool,
) -> Result<Vec<Leaf>, ParseError> {
    let mut parsed = Vec::new();
    while let Some(current) = tokens.current() {
        if current == "--" {
            parsed.extend(tokens.drain().iter().map(|t| Leaf::positional(t)));
        } else if current.starts_with("--") {
            parsed.push(parse_long(tokens, options)?.into());
        } else if current.starts_with('-') && current != "-" {
            parsed.extend(parse_shorts(tokens, options)?.into_iter().map(Leaf::from));
        } else if options_first {
            parsed.extend(tokens.drain().iter().map(|t| Leaf::positional(t)));
        } else {
            let token = tokens.take().unwrap_or_default();
            parsed.push(Leaf::positional(&token));
        }
    }
    Ok(parsed)
}
