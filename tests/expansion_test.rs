//! Tests for ExpansionEngine

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use nestcase::domain::assign_names;
use rstest::rstest;

use nestcase::{ApplicationError, ExpansionEngine, Settings, SuiteTree};

fn counting_tree(calls: Arc<AtomicUsize>) -> SuiteTree {
    let mut tree = SuiteTree::new();
    let (hook_calls, bind_calls, body_calls) = (calls.clone(), calls.clone(), calls);
    tree.describe(move |root| {
        root.bind("v", move || {
            bind_calls.fetch_add(1, Ordering::SeqCst);
            1u8
        })?;
        root.before(move |_| {
            hook_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })?;
        root.context("G", move |g| {
            g.it("a", move |_| {
                body_calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })?;
            g.context("H", |h| h.it("b", |_| Ok(())))?;
            Ok(())
        })?;
        root.it("c", |_| Ok(()))?;
        Ok(())
    })
    .unwrap();
    tree
}

#[test]
fn given_tree_when_expanding_then_one_unit_per_example_in_declaration_order() {
    // Arrange
    let tree = counting_tree(Arc::new(AtomicUsize::new(0)));
    let example_count = tree.example_count();

    // Act
    let units = ExpansionEngine::default().expand(tree);

    // Assert
    assert_eq!(units.len(), example_count);
    let described: Vec<_> = units.iter().map(|u| u.description.as_str()).collect();
    assert_eq!(described, vec!["G a", "G H b", "c"]);
    let ids: HashSet<_> = units.iter().map(|u| u.id.clone()).collect();
    assert_eq!(ids.len(), units.len(), "ids must be unique");
}

#[test]
fn given_hooks_binds_and_bodies_when_expanding_then_nothing_is_invoked() {
    // Arrange
    let calls = Arc::new(AtomicUsize::new(0));
    let tree = counting_tree(calls.clone());

    // Act
    let units = ExpansionEngine::default().expand(tree);

    // Assert
    assert_eq!(units.len(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn given_custom_separators_when_expanding_then_ids_and_descriptions_use_them() {
    // Arrange
    let settings = Settings {
        description_separator: " / ".into(),
        id_separator: "-".into(),
        ..Default::default()
    };
    let tree = counting_tree(Arc::new(AtomicUsize::new(0)));

    // Act
    let units = ExpansionEngine::new(&settings).unwrap().expand(tree);

    // Assert
    assert_eq!(units[1].description, "G / H / b");
    assert_eq!(units[1].id, "1-1-2-1");
}

#[test]
fn given_several_blocks_when_expanding_all_then_root_segment_disambiguates() {
    // Arrange
    let mut first = SuiteTree::numbered(1);
    let mut second = SuiteTree::numbered(2);
    for tree in [&mut first, &mut second] {
        tree.describe(|root| root.it("same", |_| Ok(()))).unwrap();
    }

    // Act
    let units = ExpansionEngine::default().expand_all(vec![first, second]);

    // Assert
    let ids: Vec<_> = units.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["1_1", "2_1"]);
}

#[test]
fn given_default_trees_when_expanding_all_then_blocks_follow_input_position() {
    // Arrange
    let trees: Vec<_> = (0..3)
        .map(|_| {
            let mut tree = SuiteTree::new();
            tree.describe(|root| root.it("x", |_| Ok(()))).unwrap();
            tree
        })
        .collect();

    // Act
    let units = ExpansionEngine::default().expand_all(trees);

    // Assert
    let ids: Vec<_> = units.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["1_1", "2_1", "3_1"]);
    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), units.len());
}

#[test]
fn given_explicit_blocks_when_expanding_all_then_input_position_wins() {
    let mut late = SuiteTree::numbered(9);
    let mut early = SuiteTree::numbered(9);
    late.describe(|root| root.it("late", |_| Ok(()))).unwrap();
    early.describe(|root| root.it("early", |_| Ok(()))).unwrap();

    let units = ExpansionEngine::default().expand_all(vec![late, early]);

    let ids: Vec<_> = units.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["1_1", "2_1"]);
}

#[rstest]
#[case("")]
#[case("1")]
#[case("a0")]
fn given_ambiguous_id_separator_when_building_engine_then_config_error(#[case] separator: &str) {
    // Arrange
    let settings = Settings {
        id_separator: separator.into(),
        ..Default::default()
    };

    // Act
    let result = ExpansionEngine::new(&settings);

    // Assert
    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_paths_that_concatenate_alike_when_expanding_then_ids_stay_distinct() {
    // Arrange: [1,1,11] and [1,11,1] only differ by where the separator falls
    let mut tree = SuiteTree::new();
    tree.describe(|root| {
        root.context("first", |g| {
            for _ in 0..11 {
                g.it("e", |_| Ok(()))?;
            }
            Ok(())
        })?;
        for _ in 0..9 {
            root.it("filler", |_| Ok(()))?;
        }
        root.context("eleventh", |g| g.it("e", |_| Ok(())))?;
        Ok(())
    })
    .unwrap();

    // Act
    let units = ExpansionEngine::default().expand(tree);

    // Assert
    let ids: HashSet<_> = units.iter().map(|u| u.id.clone()).collect();
    assert_eq!(ids.len(), units.len());
    assert!(ids.contains("1_1_11"));
    assert!(ids.contains("1_11_1"));
}

#[test]
fn given_unmodified_tree_when_naming_twice_then_tables_are_identical() {
    // Arrange
    let tree = counting_tree(Arc::new(AtomicUsize::new(0)));

    // Act
    let first = assign_names(&tree, " ");
    let second = assign_names(&tree, " ");

    // Assert
    assert_eq!(first, second);
}

#[test]
fn given_shared_tree_when_expanding_twice_then_units_match() {
    // Arrange
    let mut tree = counting_tree(Arc::new(AtomicUsize::new(0)));
    tree.freeze();
    let tree = Arc::new(tree);
    let engine = ExpansionEngine::default();

    // Act
    let first = engine.expand_shared(Arc::clone(&tree));
    let second = engine.expand_shared(tree);

    // Assert
    let key = |units: &[nestcase::ExecutableUnit]| {
        units
            .iter()
            .map(|u| (u.path.clone(), u.description.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(key(&first), key(&second));
}
