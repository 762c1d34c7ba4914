//! Delimited sections of a grammar description.

use std::sync::LazyLock;

use regex::Regex;

// SAFETY: These regexes are compile-time constants and are validated by tests.
static USAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^<usage>$(.*?)^</usage>$").expect("static regex must compile")
});
static OPTIONS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^<options>$(.*?)^</options>$").expect("static regex must compile")
});

const TAG_LINES: [&str; 4] = ["<usage>", "</usage>", "<options>", "</options>"];

/// Kinds of delimited section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Usage,
    Options,
}

impl Section {
    fn regex(self) -> &'static Regex {
        match self {
            Self::Usage => &USAGE_RE,
            Self::Options => &OPTIONS_RE,
        }
    }
}

/// Contents of every `section` block in `doc`, tags excluded.
///
/// Tags must sit alone on their line.
pub fn extract(section: Section, doc: &str) -> Vec<&str> {
    section
        .regex()
        .captures_iter(doc)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// The usage text shown back to the user alongside invocation errors.
pub fn usage_text(section: &str) -> String {
    format!("Usage:{section}")
}

/// Rewrites a usage section as a single pattern.
///
/// The first word names the program; every later occurrence of it starts a
/// new top-level alternative. Returns `None` when the section is blank.
pub fn formal_usage(section: &str) -> Option<String> {
    let words = section.split_whitespace().collect::<Vec<_>>();
    let (program, rest) = words.split_first()?;
    let body = rest
        .iter()
        .map(|&word| if word == *program { ") | (" } else { word })
        .collect::<Vec<_>>()
        .join(" ");
    Some(format!("( {body} )"))
}

/// Help text: the description without surrounding blank lines or tag lines.
pub fn help_text(doc: &str) -> String {
    doc.trim_matches('\n')
        .lines()
        .filter(|line| !TAG_LINES.contains(line))
        .collect::<Vec<_>>()
        .join("\n")
}
