//! Matching parsed argument vectors against a pattern tree.
//!
//! Matching never mutates the tree: every step takes the current leftover
//! and collected leaves by reference and returns new ones, so a compiled
//! tree can be matched from many threads at once.

use tracing::trace;
use usage_grammar_core::{Leaf, LeafId, Pattern, PatternTree, Value};

/// Result of matching one pattern node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub matched: bool,
    /// Argument leaves not consumed.
    pub left: Vec<Leaf>,
    /// Leaves bound so far, with their matched values.
    pub collected: Vec<Leaf>,
}

impl MatchOutcome {
    fn failed(left: &[Leaf], collected: &[Leaf]) -> Self {
        Self {
            matched: false,
            left: left.to_vec(),
            collected: collected.to_vec(),
        }
    }

    /// Whether the match succeeded and consumed every argument leaf.
    pub fn is_complete(&self) -> bool {
        self.matched && self.left.is_empty()
    }
}

/// Matches argument leaves against a normalized [`PatternTree`].
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    tree: &'a PatternTree,
}

impl<'a> Matcher<'a> {
    pub fn new(tree: &'a PatternTree) -> Self {
        Self { tree }
    }

    /// Matches `argv` against the whole tree.
    pub fn run(&self, argv: &[Leaf]) -> MatchOutcome {
        self.match_pattern(self.tree.root(), argv, &[])
    }

    pub fn match_pattern(
        &self,
        pattern: &Pattern,
        left: &[Leaf],
        collected: &[Leaf],
    ) -> MatchOutcome {
        match pattern {
            Pattern::Leaf(id) => self.match_leaf(*id, left, collected),
            Pattern::Required(children) => {
                let mut current = MatchOutcome {
                    matched: true,
                    left: left.to_vec(),
                    collected: collected.to_vec(),
                };
                for child in children {
                    current = self.match_pattern(child, &current.left, &current.collected);
                    if !current.matched {
                        return MatchOutcome::failed(left, collected);
                    }
                }
                current
            }
            Pattern::Optional(children) | Pattern::OptionsShortcut(children) => {
                let mut current = MatchOutcome {
                    matched: true,
                    left: left.to_vec(),
                    collected: collected.to_vec(),
                };
                for child in children {
                    let step = self.match_pattern(child, &current.left, &current.collected);
                    current.left = step.left;
                    current.collected = step.collected;
                }
                current
            }
            Pattern::OneOrMore(child) => self.match_repeated(child, left, collected),
            Pattern::Either(arms) => self.match_either(arms, left, collected),
        }
    }

    /// Matches `child` as many times as it keeps consuming leaves.
    fn match_repeated(&self, child: &Pattern, left: &[Leaf], collected: &[Leaf]) -> MatchOutcome {
        let mut current_left = left.to_vec();
        let mut current_collected = collected.to_vec();
        let mut previous: Option<Vec<Leaf>> = None;
        let mut times = 0usize;

        loop {
            let step = self.match_pattern(child, &current_left, &current_collected);
            if step.matched {
                times += 1;
            }
            let stalled = previous.as_ref() == Some(&step.left);
            current_left = step.left;
            current_collected = step.collected;
            if !step.matched || stalled {
                break;
            }
            previous = Some(current_left.clone());
        }

        if times == 0 {
            return MatchOutcome::failed(left, collected);
        }
        MatchOutcome {
            matched: true,
            left: current_left,
            collected: current_collected,
        }
    }

    /// Tries every arm and keeps the successful one with the fewest
    /// leftover leaves; ties go to the earlier arm.
    fn match_either(&self, arms: &[Pattern], left: &[Leaf], collected: &[Leaf]) -> MatchOutcome {
        let mut best: Option<(usize, MatchOutcome)> = None;
        for (index, arm) in arms.iter().enumerate() {
            let outcome = self.match_pattern(arm, left, collected);
            if !outcome.matched {
                continue;
            }
            if best
                .as_ref()
                .is_none_or(|(_, current)| outcome.left.len() < current.left.len())
            {
                best = Some((index, outcome));
            }
        }
        match best {
            Some((index, outcome)) => {
                trace!(arm = index, left = outcome.left.len(), "either arm chosen");
                outcome
            }
            None => MatchOutcome::failed(left, collected),
        }
    }

    fn match_leaf(&self, id: LeafId, left: &[Leaf], collected: &[Leaf]) -> MatchOutcome {
        let template = self.tree.leaf(id);
        let Some((position, mut bound)) = single_match(template, left) else {
            return MatchOutcome::failed(left, collected);
        };

        let mut left = left.to_vec();
        left.remove(position);
        let mut collected = collected.to_vec();
        let same_name = collected
            .iter()
            .position(|leaf| leaf.name() == template.name());

        match (template.value(), same_name) {
            (Value::Count(_), Some(index)) => {
                if let Value::Count(count) = collected[index].value_mut() {
                    *count += 1;
                }
            }
            (Value::Count(_), None) => {
                bound.set_value(Value::Count(1));
                collected.push(bound);
            }
            (Value::List(_), Some(index)) => {
                if let (Value::Str(item), Value::List(items)) =
                    (bound.value().clone(), collected[index].value_mut())
                {
                    items.push(item);
                }
            }
            (Value::List(_), None) => {
                if let Value::Str(item) = bound.value() {
                    let items = vec![item.clone()];
                    bound.set_value(Value::List(items));
                }
                collected.push(bound);
            }
            _ => collected.push(bound),
        }

        MatchOutcome {
            matched: true,
            left,
            collected,
        }
    }
}

/// Finds the first leaf in `left` that `template` can bind, returning its
/// position and the bound leaf.
fn single_match(template: &Leaf, left: &[Leaf]) -> Option<(usize, Leaf)> {
    match template {
        Leaf::Argument { name, .. } => left.iter().enumerate().find_map(|(n, leaf)| match leaf {
            Leaf::Argument { value, .. } => Some((
                n,
                Leaf::Argument {
                    name: name.clone(),
                    value: value.clone(),
                },
            )),
            _ => None,
        }),
        Leaf::Command { name, .. } => {
            let (n, value) = left.iter().enumerate().find_map(|(n, leaf)| match leaf {
                Leaf::Argument { value, .. } => Some((n, value)),
                _ => None,
            })?;
            (value.as_str() == Some(name.as_str())).then(|| {
                (
                    n,
                    Leaf::Command {
                        name: name.clone(),
                        value: Value::Bool(true),
                    },
                )
            })
        }
        Leaf::Option(option) => {
            let name = option.name()?;
            left.iter()
                .position(|leaf| leaf.name() == Some(name))
                .map(|n| (n, left[n].clone()))
        }
    }
}
