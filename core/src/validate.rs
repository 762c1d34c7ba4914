//! Option declaration checks.
//!
//! Catches declarations that would only blow up once a grammar or an
//! argument vector references them: options with no spelling, malformed
//! spellings, and spellings declared twice (which make short-option lookup
//! ambiguous).
//!
//! # Examples
//!
//! ```
//! use usage_grammar_core::*;
//!
//! let options = vec![OptionLeaf::new(Some("-v"), Some("--verbose"), false)];
//! assert!(validate_options(&options).is_empty());
//!
//! // Invalid: short option missing its leading dash
//! let bad = vec![OptionLeaf::new(Some("v"), Some("--verbose"), false)];
//! assert!(!validate_options(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::OptionLeaf;

/// Option declaration problems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An option has neither short nor long form.
    #[error("option must define a short or long form")]
    MissingOptionName,
    /// Short option is not a single dash followed by one character.
    #[error("invalid short option format: {0}")]
    InvalidShortOption(String),
    /// Long option does not start with `--` or is too short.
    #[error("invalid long option format: {0}")]
    InvalidLongOption(String),
    /// The same spelling is declared by more than one option.
    #[error("option declared more than once: {0}")]
    DuplicateOption(String),
}

/// Checks a list of option declarations, reporting every problem found.
///
/// # Examples
///
/// ```
/// use usage_grammar_core::*;
///
/// let options = vec![
///     OptionLeaf::new(Some("-v"), Some("--verbose"), false),
///     OptionLeaf::new(Some("-v"), Some("--version"), false),
/// ];
/// assert_eq!(
///     validate_options(&options),
///     vec![ValidationError::DuplicateOption("-v".to_string())]
/// );
/// ```
pub fn validate_options(options: &[OptionLeaf]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for option in options {
        if option.short.is_none() && option.long.is_none() {
            errors.push(ValidationError::MissingOptionName);
            continue;
        }

        if let Some(short) = &option.short {
            if !short.starts_with('-') || short.starts_with("--") || short.chars().count() != 2 {
                errors.push(ValidationError::InvalidShortOption(short.clone()));
            } else if !seen.insert(short.clone()) {
                errors.push(ValidationError::DuplicateOption(short.clone()));
            }
        }

        if let Some(long) = &option.long {
            if !long.starts_with("--") || long.len() < 3 {
                errors.push(ValidationError::InvalidLongOption(long.clone()));
            } else if !seen.insert(long.clone()) {
                errors.push(ValidationError::DuplicateOption(long.clone()));
            }
        }
    }

    errors
}
