//! Token streams over grammar text and argument vectors.

use std::collections::VecDeque;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ErrorKind, ParseError, TokenError};

// SAFETY: These regexes are compile-time constants and are validated by tests.
static GROUPING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\[\]()|]|\.\.\.)").expect("static regex must compile"));
// A `<...>` placeholder stays one token even when it contains spaces.
static FRAGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S*<.*?>|\S+").expect("static regex must compile"));

/// Ordered, consumable sequence of string tokens.
///
/// Carries the [`ErrorKind`] of its source so that failures raised while
/// consuming it land in the right category.
#[derive(Debug, Clone)]
pub struct Tokens {
    items: VecDeque<String>,
    kind: ErrorKind,
}

impl Tokens {
    pub fn new<I, S>(items: I, kind: ErrorKind) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            kind,
        }
    }

    /// Tokens of a user's argument vector, one per element.
    pub fn from_argv<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(argv, ErrorKind::Invocation)
    }

    /// Splits a formal usage pattern into grammar tokens.
    ///
    /// Brackets, parentheses, pipes and ellipses become separate tokens;
    /// `<...>` placeholders are kept whole.
    pub fn from_pattern(source: &str) -> Self {
        let spaced = GROUPING_RE.replace_all(source, " ${1} ");
        let fragments = FRAGMENT_RE
            .find_iter(&spaced)
            .map(|m| m.as_str().to_string())
            .collect::<Vec<_>>();
        Self::new(fragments, ErrorKind::Grammar)
    }

    /// Removes and returns the current token.
    pub fn take(&mut self) -> Option<String> {
        self.items.pop_front()
    }

    /// The current token, without consuming it.
    pub fn current(&self) -> Option<&str> {
        self.items.front().map(String::as_str)
    }

    /// Consumes every remaining token.
    pub fn drain(&mut self) -> Vec<String> {
        self.items.drain(..).collect()
    }

    pub fn remaining(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    /// Whether this stream holds a user's argument vector.
    pub fn is_argv(&self) -> bool {
        self.kind == ErrorKind::Invocation
    }

    /// Tags `error` with this stream's kind.
    pub fn error(&self, error: TokenError) -> ParseError {
        ParseError {
            kind: self.kind,
            error,
        }
    }
}
