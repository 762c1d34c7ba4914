//! Normalization of parsed pattern trees.
//!
//! Two passes run after parsing:
//!
//! 1. **Identity unification**: structurally equal leaves anywhere in the
//!    tree are merged into one arena slot, so every reference to
//!    `--verbose` denotes the same element.
//! 2. **Repetition marking**: the tree is expanded into its alternatives
//!    (every `Either` arm and every `OneOrMore` counted twice); an element
//!    occurring more than once within one alternative gets an accumulator
//!    value, a count for flags and commands, a list for arguments and
//!    value-taking options.
//!
//! Both passes are idempotent.

use std::collections::{HashMap, VecDeque};

use tracing::debug;
use usage_grammar_core::{Leaf, LeafId, Pattern, PatternTree, Value};

/// Runs identity unification, then repetition marking.
pub fn normalize(tree: &mut PatternTree) {
    unify_identities(tree);
    let repeating = mark_repeating(tree);
    if !repeating.is_empty() {
        debug!(
            repeating = ?repeating.iter().map(|id| tree.leaf(*id).to_string()).collect::<Vec<_>>(),
            "marked repeating leaves"
        );
    }
}

/// Merges structurally equal leaves into one arena slot.
///
/// The rebuilt arena holds only reachable leaves, in first-occurrence tree
/// order.
pub fn unify_identities(tree: &mut PatternTree) {
    let (mut root, leaves) = std::mem::take(tree).into_parts();

    let mut unique: Vec<Leaf> = Vec::new();
    let mut remap: HashMap<LeafId, LeafId> = HashMap::new();
    for id in root.leaf_ids() {
        if remap.contains_key(&id) {
            continue;
        }
        let leaf = &leaves[id.index()];
        let target = match unique.iter().position(|existing| existing == leaf) {
            Some(index) => LeafId::new(index),
            None => {
                unique.push(leaf.clone());
                LeafId::new(unique.len() - 1)
            }
        };
        remap.insert(id, target);
    }

    root.for_each_leaf_mut(&mut |id| {
        if let Some(target) = remap.get(id) {
            *id = *target;
        }
    });
    *tree = PatternTree::from_parts(root, unique);
}

/// Expands `root` into the leaf sequences of its alternatives.
///
/// `Either` arms become separate alternatives and the child of a
/// `OneOrMore` is listed twice; every other branch is flattened in place.
/// For example `((-a | -b) (-c | -d))` expands to `-a -c`, `-a -d`,
/// `-b -c`, `-b -d`.
pub fn expand(root: &Pattern) -> Vec<Vec<LeafId>> {
    let mut cases = Vec::new();
    let mut groups: VecDeque<Vec<&Pattern>> = VecDeque::from([vec![root]]);

    while let Some(mut children) = groups.pop_front() {
        let Some(position) = children.iter().position(|c| !c.is_leaf()) else {
            cases.push(
                children
                    .iter()
                    .filter_map(|c| match c {
                        Pattern::Leaf(id) => Some(*id),
                        _ => None,
                    })
                    .collect(),
            );
            continue;
        };
        let branch = children.remove(position);
        match branch {
            Pattern::Either(arms) => {
                for arm in arms {
                    let mut group = vec![arm];
                    group.extend(children.iter().copied());
                    groups.push_back(group);
                }
            }
            Pattern::OneOrMore(child) => {
                let mut group = vec![child.as_ref(), child.as_ref()];
                group.extend(children);
                groups.push_back(group);
            }
            other => {
                let mut group = other.children().iter().collect::<Vec<_>>();
                group.extend(children);
                groups.push_back(group);
            }
        }
    }
    cases
}

/// Gives every leaf that repeats within one alternative an accumulator
/// value. Returns the marked leaves.
pub fn mark_repeating(tree: &mut PatternTree) -> Vec<LeafId> {
    let mut marked: Vec<LeafId> = Vec::new();
    for case in expand(tree.root()) {
        let mut occurrences: HashMap<LeafId, usize> = HashMap::new();
        for id in &case {
            *occurrences.entry(*id).or_default() += 1;
        }
        for id in case {
            if occurrences[&id] < 2 {
                continue;
            }
            let leaf = tree.leaf_mut(id);
            let value = if leaf.collects_values() {
                match leaf.value() {
                    Value::Null => Value::List(Vec::new()),
                    Value::Str(s) => {
                        Value::List(s.split_whitespace().map(String::from).collect())
                    }
                    other => other.clone(),
                }
            } else {
                Value::Count(0)
            };
            leaf.set_value(value);
            if !marked.contains(&id) {
                marked.push(id);
            }
        }
    }
    marked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_pattern;
    use usage_grammar_core::OptionLeaf;

    fn normalized(source: &str, options: &mut Vec<OptionLeaf>) -> PatternTree {
        let mut tree = parse_pattern(source, options).unwrap();
        normalize(&mut tree);
        tree
    }

    #[test]
    fn test_unify_merges_equal_leaves() {
        let mut options = Vec::new();
        let mut tree = parse_pattern("(go <x>) | (stop <x>)", &mut options).unwrap();
        assert_eq!(tree.leaves().len(), 4);
        unify_identities(&mut tree);
        assert_eq!(tree.leaves().len(), 3);
        let ids = tree.root().leaf_ids();
        assert_eq!(ids[1], ids[3]);
    }

    #[test]
    fn test_unify_drops_unreachable_leaves() {
        let mut tree = PatternTree::new();
        let kept = tree.push_leaf(Leaf::command("a"));
        tree.push_leaf(Leaf::command("orphan"));
        tree.set_root(Pattern::Required(vec![Pattern::Leaf(kept)]));
        unify_identities(&mut tree);
        assert_eq!(tree.leaves(), &[Leaf::command("a")]);
    }

    #[test]
    fn test_expand_either_product() {
        let mut options = Vec::new();
        let tree = parse_pattern("(-a | -b) (-c | -d)", &mut options).unwrap();
        let render = |case: &Vec<LeafId>| {
            case.iter()
                .map(|id| tree.leaf(*id).name().unwrap_or_default().to_string())
                .collect::<Vec<_>>()
                .join(" ")
        };
        let mut cases = expand(tree.root()).iter().map(render).collect::<Vec<_>>();
        cases.sort();
        assert_eq!(cases, vec!["-a -c", "-a -d", "-b -c", "-b -d"]);
    }

    #[test]
    fn test_expand_counts_one_or_more_twice() {
        let mut options = Vec::new();
        let tree = parse_pattern("[-v]...", &mut options).unwrap();
        let cases = expand(tree.root());
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].len(), 2);
    }

    #[test]
    fn test_repeated_flag_becomes_count() {
        let mut options = Vec::new();
        let tree = normalized("-v -v", &mut options);
        assert_eq!(tree.leaves().len(), 1);
        assert_eq!(tree.leaves()[0].value(), &Value::Count(0));
    }

    #[test]
    fn test_repeated_argument_becomes_list() {
        let mut options = Vec::new();
        let tree = normalized("<file>...", &mut options);
        assert_eq!(tree.leaves()[0].value(), &Value::List(Vec::new()));
    }

    #[test]
    fn test_repeated_option_default_is_split() {
        let mut options =
            vec![OptionLeaf::new(None, Some("--path"), true).with_value("a b".into())];
        let tree = normalized("[--path=<p>]...", &mut options);
        assert_eq!(
            tree.leaves()[0].value(),
            &Value::List(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_alternatives_do_not_make_repetition() {
        let mut options = Vec::new();
        let tree = normalized("(go <x>) | (stop <x>)", &mut options);
        assert!(tree.leaves().iter().all(|leaf| !leaf.value().is_accumulator()));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut options = Vec::new();
        let mut tree = normalized("(-v | --verbose)... <f> <f> [go go]", &mut options);
        let once = tree.clone();
        normalize(&mut tree);
        assert_eq!(tree, once);
    }
}
