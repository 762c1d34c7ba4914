//! Recursive-descent parser for formal usage patterns.
//!
//! ```text
//! expr  ::= seq ( '|' seq )* ;
//! seq   ::= ( atom [ '...' ] )* ;
//! atom  ::= '(' expr ')' | '[' expr ']' | 'options'
//!         | long | shorts | argument | command ;
//! ```

use tracing::trace;
use usage_grammar_core::{Leaf, OptionLeaf, Pattern, PatternTree};

use super::options::{parse_long, parse_shorts};
use super::tokens::Tokens;
use crate::error::{ParseError, TokenError};

/// Parses a formal usage pattern into a tree rooted at a `Required`.
///
/// Options met in the pattern but absent from `options` are appended to it.
pub fn parse_pattern(
    source: &str,
    options: &mut Vec<OptionLeaf>,
) -> Result<PatternTree, ParseError> {
    let mut parser = PatternParser {
        tokens: Tokens::from_pattern(source),
        options,
        tree: PatternTree::new(),
    };
    let children = parser.parse_expr()?;
    if parser.tokens.current().is_some() {
        let rest = parser.tokens.remaining().collect::<Vec<_>>().join(" ");
        return Err(parser.tokens.error(TokenError::UnexpectedEnding(rest)));
    }
    let mut tree = parser.tree;
    tree.set_root(Pattern::Required(children));
    Ok(tree)
}

struct PatternParser<'a> {
    tokens: Tokens,
    options: &'a mut Vec<OptionLeaf>,
    tree: PatternTree,
}

impl PatternParser<'_> {
    fn parse_expr(&mut self) -> Result<Vec<Pattern>, ParseError> {
        let seq = self.parse_seq()?;
        if self.tokens.current() != Some("|") {
            return Ok(seq);
        }
        let mut alternatives = group(seq);
        while self.tokens.current() == Some("|") {
            self.tokens.take();
            let seq = self.parse_seq()?;
            alternatives.extend(group(seq));
        }
        if alternatives.len() > 1 {
            Ok(vec![Pattern::Either(alternatives)])
        } else {
            Ok(alternatives)
        }
    }

    fn parse_seq(&mut self) -> Result<Vec<Pattern>, ParseError> {
        let mut result = Vec::new();
        while !matches!(self.tokens.current(), None | Some("]" | ")" | "|")) {
            let mut atom = self.parse_atom()?;
            if self.tokens.current() == Some("...") {
                self.tokens.take();
                let child = if atom.len() == 1 {
                    atom.remove(0)
                } else {
                    Pattern::Required(atom)
                };
                atom = vec![Pattern::OneOrMore(Box::new(child))];
            }
            result.extend(atom);
        }
        Ok(result)
    }

    fn parse_atom(&mut self) -> Result<Vec<Pattern>, ParseError> {
        let Some(token) = self.tokens.current().map(str::to_string) else {
            return Ok(Vec::new());
        };
        match token.as_str() {
            "(" | "[" => {
                self.tokens.take();
                let children = self.parse_expr()?;
                let (closing, pattern) = if token == "(" {
                    (")", Pattern::Required(children))
                } else {
                    ("]", Pattern::Optional(children))
                };
                if self.tokens.take().as_deref() != Some(closing) {
                    let opening = if token == "(" { '(' } else { '[' };
                    return Err(self.tokens.error(TokenError::Unmatched(opening)));
                }
                Ok(vec![pattern])
            }
            "options" => {
                self.tokens.take();
                Ok(vec![Pattern::OptionsShortcut(Vec::new())])
            }
            t if t.starts_with("--") && t != "--" => {
                let option = parse_long(&mut self.tokens, self.options)?;
                Ok(vec![self.leaf(option.into())])
            }
            t if t.starts_with('-') && t != "-" && t != "--" => {
                let options = parse_shorts(&mut self.tokens, self.options)?;
                Ok(options
                    .into_iter()
                    .map(|option| self.leaf(option.into()))
                    .collect())
            }
            t if is_placeholder(t) => {
                self.tokens.take();
                Ok(vec![self.leaf(Leaf::argument(&token))])
            }
            _ => {
                self.tokens.take();
                Ok(vec![self.leaf(Leaf::command(&token))])
            }
        }
    }

    fn leaf(&mut self, leaf: Leaf) -> Pattern {
        trace!(leaf = %leaf, "grammar leaf");
        Pattern::Leaf(self.tree.push_leaf(leaf))
    }
}

/// One alternative of an `Either`: several atoms are grouped as `Required`,
/// an empty one contributes nothing.
fn group(seq: Vec<Pattern>) -> Vec<Pattern> {
    if seq.len() > 1 {
        vec![Pattern::Required(seq)]
    } else {
        seq
    }
}

/// `<name>` or an all-uppercase word such as `FILE`.
fn is_placeholder(token: &str) -> bool {
    (token.starts_with('<') && token.ends_with('>'))
        || (token.chars().any(char::is_uppercase) && !token.chars().any(char::is_lowercase))
}

/// Fills every `[options]` shortcut with the declared options not already
/// referenced elsewhere in the tree.
///
/// Shortcuts are filled in tree order, and options placed in one shortcut
/// count as referenced for the next.
pub fn fill_options_shortcuts(tree: &mut PatternTree, declared: &[OptionLeaf]) {
    let shortcuts = count_shortcuts(tree.root());
    for index in 0..shortcuts {
        let mut children = Vec::new();
        let mut referenced = tree.flat_options().into_iter().cloned().collect::<Vec<_>>();
        for option in declared {
            if referenced.contains(option) {
                continue;
            }
            referenced.push(option.clone());
            children.push(Pattern::Leaf(tree.push_leaf(option.clone().into())));
        }

        let mut position = 0;
        let mut filled = Some(children);
        tree.root_mut().for_each_shortcut_mut(&mut |slot| {
            if position == index {
                if let Some(children) = filled.take() {
                    *slot = children;
                }
            }
            position += 1;
        });
    }
}

fn count_shortcuts(pattern: &Pattern) -> usize {
    match pattern {
        Pattern::OptionsShortcut(_) => 1,
        other => other.children().iter().map(count_shortcuts).sum(),
    }
}
