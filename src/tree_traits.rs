/*
Debug rendering of a group tree via termtree.
Groups become branches, examples become leaves; ignored and failing
examples are tagged so a glance shows what will actually run.
 */
use termtree::Tree;
use tracing::instrument;

use crate::domain::{Entry, ExampleMode, GroupId, SuiteTree};

pub trait TreeRender {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeRender for SuiteTree {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn build_tree(tree: &SuiteTree, group: GroupId, parent_tree: &mut Tree<String>) {
            let Some(node) = tree.get(group) else { return };
            for entry in &node.entries {
                match *entry {
                    Entry::Group(child) => {
                        if let Some(child_node) = tree.get(child) {
                            let mut child_tree = Tree::new(child_node.description.clone());
                            build_tree(tree, child, &mut child_tree);
                            parent_tree.push(child_tree);
                        }
                    }
                    Entry::Example(index) => {
                        if let Some(example) = node.examples.get(index) {
                            let label = match example.mode {
                                ExampleMode::Normal => format!("it {}", example.description),
                                ExampleMode::Ignored => {
                                    format!("it {} [ignored]", example.description)
                                }
                                ExampleMode::ExpectFailure => {
                                    format!("it {} [failing]", example.description)
                                }
                            };
                            parent_tree.push(Tree::new(label));
                        }
                    }
                }
            }
        }

        let mut root = Tree::new(format!("suite {}", self.block()));
        build_tree(self, self.root(), &mut root);
        root
    }
}
