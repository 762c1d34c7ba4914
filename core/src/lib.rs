//! Core data model for usage-grammar command-line matching.
//!
//! This crate defines the types shared by the grammar compiler and matcher:
//!
//! - [`Leaf`]: a terminal grammar element: a positional argument, a
//!   literal command, or an option ([`OptionLeaf`]).
//! - [`Pattern`]: a node of the pattern tree (`Required`, `Optional`,
//!   `Either`, `OneOrMore`, `OptionsShortcut`, or a leaf reference).
//! - [`PatternTree`]: a root pattern plus the arena of leaves it
//!   references.
//! - [`Value`]: the value shapes a leaf can carry (flag, string, count,
//!   list).
//! - [`ParsedArgs`]: the final name→value result of a match.
//!
//! Result assembly ([`assemble`]) overlays matched leaves on grammar
//! defaults. Validation ([`validate_options`]) flags option declarations
//! that would make option lookup ambiguous.
//!
//! # Example
//!
//! ```
//! use usage_grammar_core::*;
//!
//! let mut tree = PatternTree::new();
//! let verbose = tree.push_leaf(Leaf::from(OptionLeaf::new(Some("-v"), Some("--verbose"), false)));
//! let file = tree.push_leaf(Leaf::argument("<file>"));
//! tree.set_root(Pattern::Required(vec![
//!     Pattern::Optional(vec![Pattern::Leaf(verbose)]),
//!     Pattern::Leaf(file),
//! ]));
//!
//! let args = assemble(&tree.flat(), &[Leaf::Argument {
//!     name: Some("<file>".into()),
//!     value: Value::from("notes.txt"),
//! }]);
//! assert_eq!(args.str("<file>"), Some("notes.txt"));
//! assert!(!args.flag("--verbose"));
//! ```

mod args;
mod assemble;
mod types;
mod validate;

pub use args::{AttributeCollision, ParsedArgs, attribute_name};
pub use assemble::assemble;
pub use types::*;
pub use validate::{ValidationError, validate_options};
