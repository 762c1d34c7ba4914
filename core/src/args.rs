use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Value;

/// Two result keys sanitized to the same attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("the '{key}' key produced the '{attribute}' attribute which already exists")]
pub struct AttributeCollision {
    pub key: String,
    pub attribute: String,
}

/// Converts a result key such as `--dry-run` or `<host>` into an
/// identifier-like attribute name (`dry_run`, `host`).
///
/// # Examples
///
/// ```
/// use usage_grammar_core::attribute_name;
///
/// assert_eq!(attribute_name("--dry-run"), "dry_run");
/// assert_eq!(attribute_name("<host>"), "host");
/// assert_eq!(attribute_name("tcp"), "tcp");
/// ```
pub fn attribute_name(key: &str) -> String {
    key.trim_matches(|ch| matches!(ch, '-' | '<' | '>'))
        .replace('-', "_")
}

/// Result of a successful match: every grammar element name mapped to its
/// final value, ordered by name.
///
/// Absent elements keep their unset value (`false`, `null`, `0` or `[]`).
///
/// # Examples
///
/// ```
/// use usage_grammar_core::{ParsedArgs, Value};
///
/// let mut args = ParsedArgs::new();
/// args.insert("--verbose", Value::Count(3));
/// args.insert("<host>", Value::from("example.org"));
///
/// assert_eq!(args.count("--verbose"), 3);
/// assert_eq!(args.str("<host>"), Some("example.org"));
/// assert!(!args.flag("--missing"));
///
/// let attrs = args.attributes().unwrap();
/// assert_eq!(attrs["host"], Value::from("example.org"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedArgs {
    values: BTreeMap<String, Value>,
}

impl ParsedArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, replacing any earlier value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Truthiness of `name`; `false` when absent.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).is_some_and(Value::is_truthy)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Occurrence count of `name`. A plain boolean counts as 0 or 1.
    pub fn count(&self, name: &str) -> u64 {
        match self.get(name) {
            Some(Value::Count(n)) => *n,
            Some(Value::Bool(true)) => 1,
            _ => 0,
        }
    }

    /// Accumulated values of `name`; a scalar string is a one-element list.
    pub fn list(&self, name: &str) -> Vec<String> {
        match self.get(name) {
            Some(Value::List(items)) => items.clone(),
            Some(Value::Str(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// Builds an attribute-style view keyed by [`attribute_name`].
    ///
    /// # Errors
    ///
    /// Returns [`AttributeCollision`] when two keys sanitize to the same
    /// attribute (e.g. `--dry-run` and `<dry-run>`).
    pub fn attributes(&self) -> Result<BTreeMap<String, Value>, AttributeCollision> {
        let mut out = BTreeMap::new();
        for (key, value) in &self.values {
            let attribute = attribute_name(key);
            if out.contains_key(&attribute) {
                return Err(AttributeCollision {
                    key: key.clone(),
                    attribute,
                });
            }
            out.insert(attribute, value.clone());
        }
        Ok(out)
    }
}

impl IntoIterator for ParsedArgs {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl FromIterator<(String, Value)> for ParsedArgs {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ParsedArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, (name, value)) in self.values.iter().enumerate() {
            if idx > 0 {
                write!(f, ",\n ")?;
            }
            write!(f, "{name:?}: {value}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_name_strips_both_ends() {
        assert_eq!(attribute_name("<input-file>"), "input_file");
        assert_eq!(attribute_name("-v"), "v");
        assert_eq!(attribute_name("--"), "");
    }

    #[test]
    fn test_attributes_reject_collision() {
        let mut args = ParsedArgs::new();
        args.insert("--dry-run", Value::Bool(true));
        args.insert("<dry-run>", Value::Null);

        let err = args.attributes().unwrap_err();
        assert_eq!(err.attribute, "dry_run");
    }

    #[test]
    fn test_list_and_count_accessors() {
        let mut args = ParsedArgs::new();
        args.insert("<file>", Value::List(vec!["a".into(), "b".into()]));
        args.insert("--quiet", Value::Bool(true));
        args.insert("<name>", Value::from("x"));

        assert_eq!(args.list("<file>"), vec!["a", "b"]);
        assert_eq!(args.list("<name>"), vec!["x"]);
        assert_eq!(args.count("--quiet"), 1);
        assert_eq!(args.count("<file>"), 0);
    }

    #[test]
    fn test_display_is_sorted() {
        let mut args = ParsedArgs::new();
        args.insert("tcp", Value::Bool(true));
        args.insert("--timeout", Value::from("30"));
        assert_eq!(args.to_string(), "{\"--timeout\": \"30\",\n \"tcp\": true}");
    }
}
