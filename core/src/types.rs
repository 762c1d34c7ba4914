//! Pattern tree data model.
//!
//! A grammar description compiles into a [`PatternTree`]: a tree of
//! [`Pattern`] branch nodes whose tips reference [`Leaf`] elements stored in
//! an arena owned by the tree. Keeping leaves in an arena lets several tree
//! positions share one canonical leaf (see the normalizer in the engine
//! crate) without shared mutable pointers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Value carried by a leaf or reported in the parse result.
///
/// Serializes untagged, so a result renders as plain JSON/YAML scalars:
/// `null`, `true`, `3`, `"x"`, `["a", "b"]`.
///
/// # Examples
///
/// ```
/// use usage_grammar_core::Value;
///
/// assert!(!Value::Bool(false).is_truthy());
/// assert!(Value::Count(2).is_truthy());
/// assert_eq!(Value::from("x").as_str(), Some("x"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// No value (an absent option argument or positional).
    #[default]
    Null,
    /// Presence flag.
    Bool(bool),
    /// Occurrence count of a repeating flag or command.
    Count(u64),
    /// Scalar string.
    Str(String),
    /// Accumulated strings of a repeating argument or option.
    List(Vec<String>),
}

impl Value {
    /// Truthiness: `Null`, `false`, `0`, `""` and `[]` are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Count(n) => *n > 0,
            Self::Str(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` for accumulator values (counts and lists).
    pub fn is_accumulator(&self) -> bool {
        matches!(self, Self::Count(_) | Self::List(_))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Count(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item:?}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// An option declaration or an option occurrence in an argument vector.
///
/// An option has an optional short form (e.g. `-v`) and/or long form
/// (e.g. `--verbose`). Options that take a value hold a string (or
/// [`Value::Null`] when no default was declared); flags hold a boolean, or a
/// count once the normalizer marks them as repeating.
///
/// # Examples
///
/// ```
/// use usage_grammar_core::{OptionLeaf, Value};
///
/// let flag = OptionLeaf::new(Some("-v"), Some("--verbose"), false);
/// assert_eq!(flag.name(), Some("--verbose"));
/// assert_eq!(flag.value, Value::Bool(false));
///
/// let timeout = OptionLeaf::new(None, Some("--timeout"), true);
/// assert_eq!(timeout.value, Value::Null);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OptionLeaf {
    /// Short form (e.g. "-v")
    pub short: Option<String>,
    /// Long form (e.g. "--verbose")
    pub long: Option<String>,
    /// Whether the option consumes an argument
    pub takes_value: bool,
    pub value: Value,
}

impl OptionLeaf {
    /// Creates an option with its unset value: `false` for flags, `Null`
    /// for options taking a value.
    pub fn new(short: Option<&str>, long: Option<&str>, takes_value: bool) -> Self {
        Self {
            short: short.map(String::from),
            long: long.map(String::from),
            takes_value,
            value: if takes_value {
                Value::Null
            } else {
                Value::Bool(false)
            },
        }
    }

    /// Replaces the value.
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }

    /// Long form if present, else the short form.
    pub fn name(&self) -> Option<&str> {
        self.long.as_deref().or(self.short.as_deref())
    }

    /// Checks if this option is spelled `s` (short or long form).
    pub fn matches(&self, s: &str) -> bool {
        self.short.as_deref() == Some(s) || self.long.as_deref() == Some(s)
    }

    /// Number of arguments the option consumes (0 or 1).
    pub fn argcount(&self) -> u8 {
        u8::from(self.takes_value)
    }
}

/// Terminal element of a pattern tree.
///
/// Two leaves denote the same grammar element when they are structurally
/// equal (kind, name and value), which is what the derived `PartialEq`
/// compares.
///
/// # Examples
///
/// ```
/// use usage_grammar_core::{Leaf, Value};
///
/// let host = Leaf::argument("<host>");
/// assert_eq!(host.name(), Some("<host>"));
///
/// let typed = Leaf::positional("127.0.0.1");
/// assert_eq!(typed.name(), None);
/// assert_eq!(typed.value(), &Value::from("127.0.0.1"));
///
/// let tcp = Leaf::command("tcp");
/// assert_eq!(tcp.value(), &Value::Bool(false));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Leaf {
    /// Positional value; `name` is a placeholder such as `<host>`. Tokens
    /// typed by the user are unnamed arguments.
    Argument { name: Option<String>, value: Value },
    /// Fixed literal token.
    Command { name: String, value: Value },
    Option(OptionLeaf),
}

impl Leaf {
    /// A named positional placeholder with no value.
    pub fn argument(name: &str) -> Self {
        Self::Argument {
            name: Some(name.to_string()),
            value: Value::Null,
        }
    }

    /// An unnamed positional token as typed on the command line.
    pub fn positional(token: &str) -> Self {
        Self::Argument {
            name: None,
            value: Value::from(token),
        }
    }

    pub fn command(name: &str) -> Self {
        Self::Command {
            name: name.to_string(),
            value: Value::Bool(false),
        }
    }

    /// Identity used for matching and for result keys.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Argument { name, .. } => name.as_deref(),
            Self::Command { name, .. } => Some(name),
            Self::Option(option) => option.name(),
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            Self::Argument { value, .. } | Self::Command { value, .. } => value,
            Self::Option(option) => &option.value,
        }
    }

    pub fn value_mut(&mut self) -> &mut Value {
        match self {
            Self::Argument { value, .. } | Self::Command { value, .. } => value,
            Self::Option(option) => &mut option.value,
        }
    }

    pub fn set_value(&mut self, value: Value) {
        *self.value_mut() = value;
    }

    pub fn as_option(&self) -> Option<&OptionLeaf> {
        match self {
            Self::Option(option) => Some(option),
            _ => None,
        }
    }

    /// Returns `true` for leaves whose repeated occurrences accumulate into
    /// a list (arguments and value-taking options) rather than a count.
    pub fn collects_values(&self) -> bool {
        match self {
            Self::Argument { .. } => true,
            Self::Command { .. } => false,
            Self::Option(option) => option.takes_value,
        }
    }
}

impl From<OptionLeaf> for Leaf {
    fn from(option: OptionLeaf) -> Self {
        Self::Option(option)
    }
}

fn quoted(s: Option<&str>) -> String {
    s.map_or_else(|| "None".to_string(), |s| format!("{s:?}"))
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argument { name, value } => {
                write!(f, "Argument({}, {value})", quoted(name.as_deref()))
            }
            Self::Command { name, value } => write!(f, "Command({name:?}, {value})"),
            Self::Option(option) => write!(
                f,
                "Option({}, {}, {}, {})",
                quoted(option.short.as_deref()),
                quoted(option.long.as_deref()),
                option.argcount(),
                option.value
            ),
        }
    }
}

/// Index of a leaf in a [`PatternTree`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeafId(usize);

impl LeafId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

/// Node of a pattern tree.
///
/// A closed set of branch kinds plus a reference to a leaf. Each branch owns
/// its children exclusively; `OneOrMore` owns exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Leaf(LeafId),
    /// All children must match in sequence.
    Required(Vec<Pattern>),
    /// Children are matched if possible; never fails.
    Optional(Vec<Pattern>),
    /// `[options]` placeholder, matched like `Optional`. Populated after
    /// parsing with every declared option not spelled out elsewhere.
    OptionsShortcut(Vec<Pattern>),
    /// Exactly one alternative is chosen.
    Either(Vec<Pattern>),
    /// The child repeats; at least one repetition must match.
    OneOrMore(Box<Pattern>),
}

impl Pattern {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Child nodes (empty for leaves).
    pub fn children(&self) -> &[Pattern] {
        match self {
            Self::Leaf(_) => &[],
            Self::Required(children)
            | Self::Optional(children)
            | Self::OptionsShortcut(children)
            | Self::Either(children) => children,
            Self::OneOrMore(child) => std::slice::from_ref(child.as_ref()),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Leaf(_) => "Leaf",
            Self::Required(_) => "Required",
            Self::Optional(_) => "Optional",
            Self::OptionsShortcut(_) => "OptionsShortcut",
            Self::Either(_) => "Either",
            Self::OneOrMore(_) => "OneOrMore",
        }
    }

    /// Leaf references in tree order, duplicates included.
    pub fn leaf_ids(&self) -> Vec<LeafId> {
        let mut out = Vec::new();
        self.collect_leaf_ids(&mut out);
        out
    }

    fn collect_leaf_ids(&self, out: &mut Vec<LeafId>) {
        match self {
            Self::Leaf(id) => out.push(*id),
            _ => {
                for child in self.children() {
                    child.collect_leaf_ids(out);
                }
            }
        }
    }

    /// Visits every leaf reference mutably, in tree order.
    pub fn for_each_leaf_mut(&mut self, f: &mut impl FnMut(&mut LeafId)) {
        match self {
            Self::Leaf(id) => f(id),
            Self::Required(children)
            | Self::Optional(children)
            | Self::OptionsShortcut(children)
            | Self::Either(children) => {
                for child in children {
                    child.for_each_leaf_mut(f);
                }
            }
            Self::OneOrMore(child) => child.for_each_leaf_mut(f),
        }
    }

    /// Visits every `[options]` shortcut node mutably, in tree order.
    pub fn for_each_shortcut_mut(&mut self, f: &mut impl FnMut(&mut Vec<Pattern>)) {
        match self {
            Self::Leaf(_) => {}
            Self::OptionsShortcut(children) => f(children),
            Self::Required(children) | Self::Optional(children) | Self::Either(children) => {
                for child in children {
                    child.for_each_shortcut_mut(f);
                }
            }
            Self::OneOrMore(child) => child.for_each_shortcut_mut(f),
        }
    }
}

/// A compiled grammar: the root pattern and the arena of leaves it
/// references.
///
/// # Examples
///
/// ```
/// use usage_grammar_core::{Leaf, Pattern, PatternTree};
///
/// let mut tree = PatternTree::new();
/// let go = tree.push_leaf(Leaf::command("go"));
/// let x = tree.push_leaf(Leaf::argument("<x>"));
/// tree.set_root(Pattern::Required(vec![Pattern::Leaf(go), Pattern::Leaf(x)]));
///
/// let names: Vec<_> = tree.flat().iter().filter_map(|leaf| leaf.name()).collect();
/// assert_eq!(names, vec!["go", "<x>"]);
/// assert_eq!(
///     tree.to_string(),
///     r#"Required(Command("go", false), Argument("<x>", null))"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternTree {
    root: Pattern,
    leaves: Vec<Leaf>,
}

impl Default for PatternTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternTree {
    /// Creates an empty tree rooted at an empty `Required`.
    pub fn new() -> Self {
        Self {
            root: Pattern::Required(Vec::new()),
            leaves: Vec::new(),
        }
    }

    /// Assembles a tree from parts. Every `LeafId` in `root` must index
    /// into `leaves`.
    pub fn from_parts(root: Pattern, leaves: Vec<Leaf>) -> Self {
        debug_assert!(root.leaf_ids().iter().all(|id| id.index() < leaves.len()));
        Self { root, leaves }
    }

    pub fn into_parts(self) -> (Pattern, Vec<Leaf>) {
        (self.root, self.leaves)
    }

    /// Adds a leaf to the arena and returns its reference.
    pub fn push_leaf(&mut self, leaf: Leaf) -> LeafId {
        self.leaves.push(leaf);
        LeafId::new(self.leaves.len() - 1)
    }

    pub fn leaf(&self, id: LeafId) -> &Leaf {
        &self.leaves[id.index()]
    }

    pub fn leaf_mut(&mut self, id: LeafId) -> &mut Leaf {
        &mut self.leaves[id.index()]
    }

    /// Every leaf in the arena, referenced or not.
    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn root(&self) -> &Pattern {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Pattern {
        &mut self.root
    }

    pub fn set_root(&mut self, root: Pattern) {
        self.root = root;
    }

    /// Leaves in tree order, duplicates included.
    pub fn flat(&self) -> Vec<&Leaf> {
        self.root
            .leaf_ids()
            .into_iter()
            .map(|id| self.leaf(id))
            .collect()
    }

    /// Option leaves in tree order, duplicates included.
    pub fn flat_options(&self) -> Vec<&OptionLeaf> {
        self.flat()
            .into_iter()
            .filter_map(Leaf::as_option)
            .collect()
    }

    fn write_pattern(&self, pattern: &Pattern, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match pattern {
            Pattern::Leaf(id) => write!(f, "{}", self.leaf(*id)),
            branch => {
                write!(f, "{}(", branch.kind_name())?;
                for (idx, child) in branch.children().iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    self.write_pattern(child, f)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for PatternTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_pattern(&self.root, f)
    }
}
