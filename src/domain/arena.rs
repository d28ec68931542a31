//! Arena-backed example group tree.
//!
//! Groups live in a generational arena and point at their parent by index,
//! so inheritance lookups walk parent links instead of language-level
//! inheritance. The tree is mutable only until [`SuiteTree::freeze`].

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use generational_arena::{Arena, Index};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::bindings::BindingStore;
use crate::domain::entities::{Action, Bind, Example, ExampleMode, Failure, Producer};
use crate::domain::error::{DomainError, DomainResult};

static NEXT_TREE: AtomicU64 = AtomicU64::new(0);

/// Handle to a group inside a [`SuiteTree`]. Only valid for the tree that
/// issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId {
    tree: u64,
    index: Index,
}

/// A group's children and examples, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Group(GroupId),
    /// Index into the group's `examples`
    Example(usize),
}

/// What to do when a group defines the same bind name twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateBindPolicy {
    #[default]
    Reject,
    /// Later definition wins
    Replace,
}

/// Group node in the arena.
pub struct GroupNode {
    /// Own description (empty for the root)
    pub description: String,
    /// Parent group, None for the root
    pub parent: Option<GroupId>,
    /// Child groups in declaration order
    pub children: Vec<GroupId>,
    /// Examples owned by this group; never inherited
    pub examples: Vec<Example>,
    /// Interleaved declaration order of children and examples
    pub entries: Vec<Entry>,
    pub before: Vec<Action>,
    pub after: Vec<Action>,
    pub binds: Vec<Bind>,
}

impl GroupNode {
    fn new(description: String, parent: Option<GroupId>) -> Self {
        Self {
            description,
            parent,
            children: Vec::new(),
            examples: Vec::new(),
            entries: Vec::new(),
            before: Vec::new(),
            after: Vec::new(),
            binds: Vec::new(),
        }
    }

    pub fn bind(&self, name: &str) -> Option<&Bind> {
        self.binds.iter().find(|b| b.name == name)
    }
}

impl fmt::Debug for GroupNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupNode")
            .field("description", &self.description)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("examples", &self.examples)
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .field("binds", &self.binds)
            .finish()
    }
}

/// Tree of example groups for one top-level test-definition block.
pub struct SuiteTree {
    /// Stamped into every issued [`GroupId`]
    id: u64,
    arena: Arena<GroupNode>,
    root: GroupId,
    /// Path segment carried by the root
    block: u32,
    frozen: bool,
    duplicate_binds: DuplicateBindPolicy,
}

impl Default for SuiteTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SuiteTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteTree")
            .field("block", &self.block)
            .field("frozen", &self.frozen)
            .field("groups", &self.arena.len())
            .finish()
    }
}

impl SuiteTree {
    pub fn new() -> Self {
        Self::numbered(1)
    }

    /// Tree whose root carries path segment `block`, for suites made of
    /// several top-level blocks.
    pub fn numbered(block: u32) -> Self {
        let id = NEXT_TREE.fetch_add(1, Ordering::Relaxed);
        let mut arena = Arena::new();
        let root = GroupId {
            tree: id,
            index: arena.insert(GroupNode::new(String::new(), None)),
        };
        Self {
            id,
            arena,
            root,
            block,
            frozen: false,
            duplicate_binds: DuplicateBindPolicy::default(),
        }
    }

    pub fn with_duplicate_binds(mut self, policy: DuplicateBindPolicy) -> Self {
        self.duplicate_binds = policy;
        self
    }

    pub fn root(&self) -> GroupId {
        self.root
    }

    pub fn block(&self) -> u32 {
        self.block
    }

    /// Move the tree to path segment `block`. Only before expansion.
    pub(crate) fn renumber(&mut self, block: u32) {
        self.block = block;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// End the construction pass. Every later mutation fails with
    /// [`DomainError::FrozenTree`].
    #[instrument(level = "debug", skip(self))]
    pub fn freeze(&mut self) {
        if !self.frozen {
            debug!(
                "freezing tree: {} groups, {} examples",
                self.arena.len(),
                self.example_count()
            );
        }
        self.frozen = true;
    }

    #[instrument(level = "debug", skip(self))]
    pub fn add_child(&mut self, parent: GroupId, description: &str) -> DomainResult<GroupId> {
        self.ensure_open("add a child group")?;
        self.node(parent)?;
        let child = GroupId {
            tree: self.id,
            index: self
                .arena
                .insert(GroupNode::new(description.to_string(), Some(parent))),
        };
        let node = self.node_mut(parent)?;
        node.children.push(child);
        node.entries.push(Entry::Group(child));
        Ok(child)
    }

    pub fn add_example<F>(&mut self, group: GroupId, description: &str, body: F) -> DomainResult<()>
    where
        F: Fn(&mut BindingStore) -> Result<(), Failure> + Send + Sync + 'static,
    {
        self.add_example_with_mode(group, description, ExampleMode::Normal, body)
    }

    #[instrument(level = "debug", skip(self, body))]
    pub fn add_example_with_mode<F>(
        &mut self,
        group: GroupId,
        description: &str,
        mode: ExampleMode,
        body: F,
    ) -> DomainResult<()>
    where
        F: Fn(&mut BindingStore) -> Result<(), Failure> + Send + Sync + 'static,
    {
        self.ensure_open("add an example")?;
        let node = self.node_mut(group)?;
        node.examples.push(Example {
            description: description.to_string(),
            mode,
            body: Arc::new(body),
        });
        let position = node.examples.len() - 1;
        node.entries.push(Entry::Example(position));
        Ok(())
    }

    #[instrument(level = "trace", skip_all)]
    pub fn add_before_hook<F>(&mut self, group: GroupId, action: F) -> DomainResult<()>
    where
        F: Fn(&mut BindingStore) -> Result<(), Failure> + Send + Sync + 'static,
    {
        self.ensure_open("add a before hook")?;
        self.node_mut(group)?.before.push(Arc::new(action));
        Ok(())
    }

    #[instrument(level = "trace", skip_all)]
    pub fn add_after_hook<F>(&mut self, group: GroupId, action: F) -> DomainResult<()>
    where
        F: Fn(&mut BindingStore) -> Result<(), Failure> + Send + Sync + 'static,
    {
        self.ensure_open("add an after hook")?;
        self.node_mut(group)?.after.push(Arc::new(action));
        Ok(())
    }

    /// Define an infallible bind. Shadows any ancestor bind with the same name.
    pub fn define_bind<T, F>(&mut self, group: GroupId, name: &str, producer: F) -> DomainResult<()>
    where
        T: Any,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.insert_bind(
            group,
            name,
            Arc::new(move || -> Result<Box<dyn Any>, Failure> { Ok(Box::new(producer())) }),
        )
    }

    /// Define a bind whose producer may fail.
    pub fn try_define_bind<T, F>(&mut self, group: GroupId, name: &str, producer: F) -> DomainResult<()>
    where
        T: Any,
        F: Fn() -> Result<T, Failure> + Send + Sync + 'static,
    {
        self.insert_bind(
            group,
            name,
            Arc::new(move || -> Result<Box<dyn Any>, Failure> {
                producer().map(|v| Box::new(v) as Box<dyn Any>)
            }),
        )
    }

    #[instrument(level = "debug", skip(self, producer))]
    fn insert_bind(&mut self, group: GroupId, name: &str, producer: Producer) -> DomainResult<()> {
        self.ensure_open("define a bind")?;
        let policy = self.duplicate_binds;
        let node = self.node_mut(group)?;
        let bind = Bind::new(name, producer);
        match node.binds.iter().position(|b| b.name == name) {
            None => node.binds.push(bind),
            Some(existing) => match policy {
                DuplicateBindPolicy::Reject => {
                    return Err(DomainError::DuplicateBind {
                        name: name.to_string(),
                        group: node.description.clone(),
                    })
                }
                DuplicateBindPolicy::Replace => {
                    debug!("replacing bind `{}` in the same group", name);
                    node.binds[existing] = bind;
                }
            },
        }
        Ok(())
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get(&self, group: GroupId) -> Option<&GroupNode> {
        if group.tree != self.id {
            return None;
        }
        self.arena.get(group.index)
    }

    pub fn node(&self, group: GroupId) -> DomainResult<&GroupNode> {
        self.get(group).ok_or_else(|| unknown_group(group))
    }

    fn node_mut(&mut self, group: GroupId) -> DomainResult<&mut GroupNode> {
        if group.tree != self.id {
            return Err(unknown_group(group));
        }
        self.arena
            .get_mut(group.index)
            .ok_or_else(|| unknown_group(group))
    }

    fn ensure_open(&self, operation: &'static str) -> DomainResult<()> {
        if self.frozen {
            Err(DomainError::FrozenTree { operation })
        } else {
            Ok(())
        }
    }

    /// Ancestor chain from the root down to `group`, inclusive.
    #[instrument(level = "trace", skip(self))]
    pub fn ancestors(&self, group: GroupId) -> Vec<GroupId> {
        let mut chain = Vec::new();
        let mut current = Some(group);
        while let Some(id) = current {
            match self.get(id) {
                Some(node) => {
                    chain.push(id);
                    current = node.parent;
                }
                None => break,
            }
        }
        chain.reverse();
        chain
    }

    /// Nearest bind named `name`, walking from `group` up to the root.
    #[instrument(level = "trace", skip(self))]
    pub fn lookup_bind(&self, group: GroupId, name: &str) -> Option<&Bind> {
        let mut current = Some(group);
        while let Some(id) = current {
            let node = self.get(id)?;
            if let Some(bind) = node.bind(name) {
                return Some(bind);
            }
            current = node.parent;
        }
        None
    }

    /// Descriptions of every non-root ancestor down to `group`, joined.
    pub fn full_description(&self, group: GroupId, separator: &str) -> String {
        self.ancestors(group)
            .into_iter()
            .filter_map(|id| self.get(id))
            .filter(|node| node.parent.is_some())
            .map(|node| node.description.as_str())
            .join(separator)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> TreeIterator {
        TreeIterator::new(self)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.calculate_depth(self.root)
    }

    fn calculate_depth(&self, group: GroupId) -> usize {
        if let Some(node) = self.get(group) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    pub fn group_count(&self) -> usize {
        self.arena.len()
    }

    pub fn example_count(&self) -> usize {
        self.arena.iter().map(|(_, node)| node.examples.len()).sum()
    }
}

fn unknown_group(group: GroupId) -> DomainError {
    DomainError::UnknownGroup(format!("{:?} of tree {}", group.index, group.tree))
}

/// Depth-first, declaration-order walk over groups.
pub struct TreeIterator<'a> {
    tree: &'a SuiteTree,
    stack: Vec<GroupId>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a SuiteTree) -> Self {
        Self {
            tree,
            stack: vec![tree.root()],
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (GroupId, &'a GroupNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.tree.get(current) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current, node));
            }
        }
        None
    }
}
