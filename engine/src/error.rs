//! Error taxonomy.
//!
//! Failures fall into two categories that must never be confused:
//!
//! - [`GrammarError`]: the grammar description itself is malformed (a
//!   bug in the embedding program).
//! - [`UsageError`]: the user typed an argument vector the grammar does
//!   not accept. Always carries the usage text so it can be shown back.
//!
//! Token-level failures ([`TokenError`]) can arise in either category; the
//! token stream that raised them decides which ([`ErrorKind`]).

use std::fmt;

use thiserror::Error;

use usage_grammar_core::Leaf;

/// Which kind of token stream raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Tokens of a grammar description.
    Grammar,
    /// Tokens of a user's argument vector.
    Invocation,
}

/// Failures raised while consuming a token stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// A long option prefix matches several declared options.
    #[error("{prefix} is not a unique prefix: {}?", .candidates.join(", "))]
    AmbiguousPrefix {
        prefix: String,
        candidates: Vec<String>,
    },
    /// A short option is declared more than once.
    #[error("{short} is specified ambiguously {count} times")]
    AmbiguousShort { short: String, count: usize },
    /// A flag was given an `=value`.
    #[error("{0} must not have an argument")]
    UnexpectedValue(String),
    /// An option that takes a value has none available.
    #[error("{0} requires argument")]
    MissingValue(String),
    #[error("unmatched '{0}'")]
    Unmatched(char),
    /// Tokens left over after the top-level expression.
    #[error("unexpected ending: {0:?}")]
    UnexpectedEnding(String),
}

/// A [`TokenError`] tagged with the kind of stream that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct ParseError {
    pub kind: ErrorKind,
    #[source]
    pub error: TokenError,
}

impl ParseError {
    /// Routes the error to its category. Invocation errors get `usage`
    /// attached.
    pub fn into_error(self, usage: &str) -> Error {
        match self.kind {
            ErrorKind::Grammar => Error::Grammar(GrammarError::Syntax(self.error)),
            ErrorKind::Invocation => Error::Usage(UsageError {
                reason: UsageFailure::Token(self.error),
                usage: usage.to_string(),
            }),
        }
    }
}

/// Errors in the grammar description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("\"usage\" section not found (expected <usage> ... </usage>)")]
    MissingUsage,
    #[error("more than one \"usage\" section")]
    DuplicateUsage,
    #[error("\"usage\" section is empty")]
    EmptyUsage,
    #[error("{0}")]
    Syntax(TokenError),
}

impl From<ParseError> for GrammarError {
    fn from(err: ParseError) -> Self {
        Self::Syntax(err.error)
    }
}

/// Why an argument vector was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageFailure {
    Token(TokenError),
    /// The match left these tokens unconsumed (rendered leaves).
    Leftover(Vec<String>),
    /// No alternative of the grammar matched.
    NoMatch,
}

/// The user invoked the program with arguments the grammar rejects.
///
/// Displays as the failure message followed by the usage text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError {
    pub reason: UsageFailure,
    pub usage: String,
}

impl UsageError {
    pub fn leftover(left: &[Leaf], usage: &str) -> Self {
        Self {
            reason: UsageFailure::Leftover(left.iter().map(ToString::to_string).collect()),
            usage: usage.to_string(),
        }
    }

    pub fn no_match(usage: &str) -> Self {
        Self {
            reason: UsageFailure::NoMatch,
            usage: usage.to_string(),
        }
    }

    /// The failure message without the usage text.
    pub fn message(&self) -> String {
        match &self.reason {
            UsageFailure::Token(err) => err.to_string(),
            UsageFailure::Leftover(left) => {
                format!("found unmatched (duplicate?) arguments [{}]", left.join(", "))
            }
            UsageFailure::NoMatch => String::new(),
        }
    }
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = format!("{}\n{}", self.message(), self.usage);
        f.write_str(rendered.trim())
    }
}

impl std::error::Error for UsageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.reason {
            UsageFailure::Token(err) => Some(err),
            _ => None,
        }
    }
}

/// Top-level error of [`evaluate`](crate::evaluate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid grammar: {0}")]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Usage(#[from] UsageError),
}

impl Error {
    /// Process exit status conventionally used for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 1,
            Self::Grammar(_) => 2,
        }
    }
}

/// Errors loading an [`EvalConfig`](crate::EvalConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
