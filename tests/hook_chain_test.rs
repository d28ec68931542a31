//! Tests for hook chain composition across nesting levels

use rstest::rstest;

use nestcase::domain::resolve_chain;
use nestcase::{ExpansionEngine, GroupId, HookKind, SuiteTree};

/// Chain of `depth` nested groups below the root, each with `befores`
/// before hooks and `afters` after hooks. Returns the innermost group.
fn nested(depth: usize, befores: usize, afters: usize) -> (SuiteTree, GroupId) {
    let mut tree = SuiteTree::new();
    let mut group = tree.root();
    for level in 0..depth {
        group = tree.add_child(group, &format!("L{}", level + 1)).unwrap();
        for _ in 0..befores {
            tree.add_before_hook(group, |_| Ok(())).unwrap();
        }
        for _ in 0..afters {
            tree.add_after_hook(group, |_| Ok(())).unwrap();
        }
    }
    tree.add_example(group, "leaf", |_| Ok(())).unwrap();
    (tree, group)
}

#[rstest]
#[case(1, 1, 1)]
#[case(3, 2, 1)]
#[case(5, 0, 3)]
#[case(4, 3, 0)]
fn given_nested_groups_when_resolving_then_lengths_are_sums_along_ancestry(
    #[case] depth: usize,
    #[case] befores: usize,
    #[case] afters: usize,
) {
    // Arrange
    let (tree, leaf) = nested(depth, befores, afters);

    // Act
    let chain = resolve_chain(&tree, leaf, " ");

    // Assert
    assert_eq!(chain.before.len(), depth * befores);
    assert_eq!(chain.after.len(), depth * afters);

    let before_levels: Vec<_> = chain.before.iter().map(|h| h.level).collect();
    let mut sorted = before_levels.clone();
    sorted.sort();
    assert_eq!(before_levels, sorted, "befores must run outermost first");

    let after_levels: Vec<_> = chain.after.iter().map(|h| h.level).collect();
    let mut reversed = after_levels.clone();
    reversed.sort_by(|a, b| b.cmp(a));
    assert_eq!(after_levels, reversed, "afters must run innermost first");

    assert!(chain.before.iter().all(|h| h.id.kind == HookKind::Before));
    assert!(chain.after.iter().all(|h| h.id.kind == HookKind::After));
}

#[test]
fn given_several_afters_in_one_group_when_resolving_then_declaration_order_kept() {
    // Arrange
    let (tree, leaf) = nested(2, 0, 3);

    // Act
    let chain = resolve_chain(&tree, leaf, " ");

    // Assert
    let ids: Vec<_> = chain
        .after
        .iter()
        .map(|h| format!("{}#{}", h.id.group, h.id.position))
        .collect();
    assert_eq!(
        ids,
        vec!["L1 L2#1", "L1 L2#2", "L1 L2#3", "L1#1", "L1#2", "L1#3"]
    );
}

#[test]
fn given_expanded_unit_when_inspecting_chain_then_matches_resolver() {
    // Arrange
    let (tree, leaf) = nested(3, 1, 1);
    let expected = resolve_chain(&tree, leaf, " ");

    // Act
    let units = ExpansionEngine::default().expand(tree);

    // Assert
    assert_eq!(units.len(), 1);
    let before_ids: Vec<_> = units[0].chain.before.iter().map(|h| h.id.clone()).collect();
    let expected_ids: Vec<_> = expected.before.iter().map(|h| h.id.clone()).collect();
    assert_eq!(before_ids, expected_ids);
    assert_eq!(units[0].chain.after.len(), expected.after.len());
}
