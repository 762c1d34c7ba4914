//! Result assembly.
//!
//! A match only reports the leaves it bound. [`assemble`] overlays those
//! bindings on the full list of grammar leaves so that elements the user
//! did not type still appear in the result with their unset value.
//!
//! # Example
//!
//! ```
//! use usage_grammar_core::*;
//!
//! let defaults = vec![
//!     Leaf::command("tcp"),
//!     Leaf::from(OptionLeaf::new(None, Some("--timeout"), true)),
//! ];
//! let collected = vec![Leaf::Command { name: "tcp".into(), value: Value::Bool(true) }];
//!
//! let args = assemble(&defaults, &collected);
//! assert!(args.flag("tcp"));
//! assert_eq!(args.get("--timeout"), Some(&Value::Null));
//! ```

use std::borrow::Borrow;

use crate::{Leaf, ParsedArgs};

/// Merges grammar leaves (their unset values) with collected leaves.
///
/// Later entries win by name, so collected values overwrite defaults.
/// Unnamed leaves (raw argv tokens) are skipped.
pub fn assemble<D, C>(defaults: &[D], collected: &[C]) -> ParsedArgs
where
    D: Borrow<Leaf>,
    C: Borrow<Leaf>,
{
    let mut args = ParsedArgs::new();
    let leaves = defaults
        .iter()
        .map(Borrow::borrow)
        .chain(collected.iter().map(Borrow::borrow));
    for leaf in leaves {
        if let Some(name) = leaf.name() {
            args.insert(name, leaf.value().clone());
        }
    }
    args
}
