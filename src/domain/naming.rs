//! Path and description assignment.
//!
//! A single depth-first walk in declaration order. Within a group, child
//! groups and examples share one 1-based counter, so identical descriptions
//! still get distinct paths.

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::domain::arena::{Entry, GroupId, SuiteTree};
use crate::domain::entities::TreePath;

/// Position of an example inside the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExampleRef {
    pub group: GroupId,
    /// Index into the group's `examples`
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedExample {
    pub example: ExampleRef,
    pub path: TreePath,
    pub description: String,
}

/// Paths of every group and paths plus descriptions of every example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTable {
    groups: HashMap<GroupId, TreePath>,
    /// Depth-first declaration order
    examples: Vec<NamedExample>,
}

impl NameTable {
    pub fn group_path(&self, group: GroupId) -> Option<&TreePath> {
        self.groups.get(&group)
    }

    pub fn examples(&self) -> &[NamedExample] {
        &self.examples
    }

    pub fn example(&self, example: ExampleRef) -> Option<&NamedExample> {
        self.examples.iter().find(|e| e.example == example)
    }
}

enum Visit {
    Group {
        id: GroupId,
        path: TreePath,
        prefix: Vec<String>,
    },
    Example {
        example: ExampleRef,
        path: TreePath,
        description: String,
    },
}

/// Assign paths and descriptions to every group and example of `tree`.
///
/// Descriptions join every non-root ancestor description and the example's
/// own with `separator`. Deterministic: an unmodified tree always yields an
/// equal table.
///
/// Child groups and examples of one group draw from the same counter, so a
/// group's example numbers skip the positions its child groups take
/// (`1_1_1`, `1_1_3` around a group at `1_1_2`). Contiguous example numbers
/// are given up so that no example path can equal a group path.
#[instrument(level = "debug", skip(tree))]
pub fn assign_names(tree: &SuiteTree, separator: &str) -> NameTable {
    let mut groups = HashMap::new();
    let mut examples = Vec::new();
    let mut stack = vec![Visit::Group {
        id: tree.root(),
        path: TreePath::root(tree.block()),
        prefix: Vec::new(),
    }];

    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Group { id, path, prefix } => {
                let Some(node) = tree.get(id) else { continue };
                // Reverse so entries pop in declaration order
                for (position, entry) in node.entries.iter().enumerate().rev() {
                    let entry_path = path.child(position as u32 + 1);
                    match *entry {
                        Entry::Group(child) => {
                            let mut child_prefix = prefix.clone();
                            if let Some(child_node) = tree.get(child) {
                                child_prefix.push(child_node.description.clone());
                            }
                            stack.push(Visit::Group {
                                id: child,
                                path: entry_path,
                                prefix: child_prefix,
                            });
                        }
                        Entry::Example(index) => {
                            let own = node
                                .examples
                                .get(index)
                                .map(|e| e.description.as_str())
                                .unwrap_or_default();
                            let description = prefix
                                .iter()
                                .map(String::as_str)
                                .chain(std::iter::once(own))
                                .collect::<Vec<_>>()
                                .join(separator);
                            stack.push(Visit::Example {
                                example: ExampleRef { group: id, index },
                                path: entry_path,
                                description,
                            });
                        }
                    }
                }
                groups.insert(id, path);
            }
            Visit::Example {
                example,
                path,
                description,
            } => examples.push(NamedExample {
                example,
                path,
                description,
            }),
        }
    }

    debug!(
        "assigned {} group paths, {} example paths",
        groups.len(),
        examples.len()
    );
    NameTable { groups, examples }
}
