//! Grammar description and argument vector parsing.
//!
//! A grammar description is free text with one `<usage>` section and any
//! number of `<options>` sections, each delimited by tags on their own
//! lines:
//!
//! ```text
//! Naval Fate.
//! <usage>
//!   naval_fate ship <name> move <x> <y> [--speed=<kn>]
//!   naval_fate -h | --help
//! </usage>
//! <options>
//!   -h --help     Show this screen.
//!   --speed=<kn>  Speed in knots [default: 10].
//! </options>
//! ```
//!
//! Parsing happens in stages:
//!
//! - [`sections`] extracts the delimited sections and rewrites the usage
//!   section as one formal pattern.
//! - [`options`] turns `<options>` declarations into the option registry
//!   and resolves option tokens against it.
//! - [`grammar`] parses the formal pattern into a [`PatternTree`].
//! - [`argv`] turns a user's argument vector into leaves.
//!
//! [`PatternTree`]: usage_grammar_core::PatternTree

pub mod argv;
pub mod grammar;
pub mod options;
pub mod sections;
pub mod tokens;

pub use argv::parse_argv;
pub use grammar::{fill_options_shortcuts, parse_pattern};
pub use options::{parse_defaults, parse_long, parse_option, parse_shorts};
pub use sections::{Section, formal_usage, help_text, usage_text};
pub use tokens::Tokens;
