//! Closure-nested construction over [`SuiteTree`].
//!
//! ```ignore
//! let mut tree = SuiteTree::new();
//! tree.describe(|cat| {
//!     cat.bind("tail_length", || 10u32)?;
//!     cat.before(|b| {
//!         *b.resolve::<u32>("tail_length")? += 1;
//!         Ok(())
//!     })?;
//!     cat.it("has a grown tail", |b| ensure_eq(b.get::<u32>("tail_length")?, 11))?;
//!     Ok(())
//! })?;
//! ```

use std::any::Any;

use crate::domain::arena::{GroupId, SuiteTree};
use crate::domain::bindings::BindingStore;
use crate::domain::entities::{ExampleMode, Failure};
use crate::domain::error::DomainResult;

/// Mutable view of one group during the construction pass.
pub struct GroupScope<'a> {
    tree: &'a mut SuiteTree,
    group: GroupId,
}

impl SuiteTree {
    /// Build the tree's top level through a [`GroupScope`] on the root.
    pub fn describe<F>(&mut self, build: F) -> DomainResult<()>
    where
        F: FnOnce(&mut GroupScope<'_>) -> DomainResult<()>,
    {
        let root = self.root();
        build(&mut self.scope(root))
    }

    pub fn scope(&mut self, group: GroupId) -> GroupScope<'_> {
        GroupScope { tree: self, group }
    }
}

impl GroupScope<'_> {
    pub fn id(&self) -> GroupId {
        self.group
    }

    /// Declare a nested group and build it.
    pub fn context<F>(&mut self, description: &str, build: F) -> DomainResult<GroupId>
    where
        F: FnOnce(&mut GroupScope<'_>) -> DomainResult<()>,
    {
        let child = self.tree.add_child(self.group, description)?;
        build(&mut self.tree.scope(child))?;
        Ok(child)
    }

    pub fn describe<F>(&mut self, description: &str, build: F) -> DomainResult<GroupId>
    where
        F: FnOnce(&mut GroupScope<'_>) -> DomainResult<()>,
    {
        self.context(description, build)
    }

    pub fn before<F>(&mut self, action: F) -> DomainResult<()>
    where
        F: Fn(&mut BindingStore) -> Result<(), Failure> + Send + Sync + 'static,
    {
        self.tree.add_before_hook(self.group, action)
    }

    pub fn after<F>(&mut self, action: F) -> DomainResult<()>
    where
        F: Fn(&mut BindingStore) -> Result<(), Failure> + Send + Sync + 'static,
    {
        self.tree.add_after_hook(self.group, action)
    }

    pub fn bind<T, F>(&mut self, name: &str, producer: F) -> DomainResult<()>
    where
        T: Any,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.tree.define_bind(self.group, name, producer)
    }

    pub fn try_bind<T, F>(&mut self, name: &str, producer: F) -> DomainResult<()>
    where
        T: Any,
        F: Fn() -> Result<T, Failure> + Send + Sync + 'static,
    {
        self.tree.try_define_bind(self.group, name, producer)
    }

    pub fn it<F>(&mut self, description: &str, body: F) -> DomainResult<()>
    where
        F: Fn(&mut BindingStore) -> Result<(), Failure> + Send + Sync + 'static,
    {
        self.tree
            .add_example_with_mode(self.group, description, ExampleMode::Normal, body)
    }

    /// Declare an example that is emitted but not run.
    pub fn ignore<F>(&mut self, description: &str, body: F) -> DomainResult<()>
    where
        F: Fn(&mut BindingStore) -> Result<(), Failure> + Send + Sync + 'static,
    {
        self.tree
            .add_example_with_mode(self.group, description, ExampleMode::Ignored, body)
    }

    /// Declare an example whose body must fail.
    pub fn failing<F>(&mut self, description: &str, body: F) -> DomainResult<()>
    where
        F: Fn(&mut BindingStore) -> Result<(), Failure> + Send + Sync + 'static,
    {
        self.tree
            .add_example_with_mode(self.group, description, ExampleMode::ExpectFailure, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::arena::Entry;
    use crate::domain::error::DomainError;

    #[test]
    fn given_nested_describe_when_building_then_mirrors_arena_calls() {
        let mut tree = SuiteTree::new();
        tree.describe(|root| {
            root.context("Cat", |cat| {
                cat.bind("legs", || 4u8)?;
                cat.before(|_| Ok(()))?;
                cat.it("walks", |_| Ok(()))?;
                cat.context("tail", |tail| {
                    tail.ignore("is fluffy", |_| Ok(()))?;
                    tail.failing("is absent", |_| Err(Failure::new("no")))
                })?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

        assert_eq!(tree.group_count(), 3);
        assert_eq!(tree.example_count(), 3);
        let (cat, node) = tree.iter().nth(1).unwrap();
        assert_eq!(node.description, "Cat");
        assert_eq!(node.before.len(), 1);
        assert!(tree.lookup_bind(cat, "legs").is_some());
        assert!(matches!(node.entries[1], Entry::Group(_)));
    }

    #[test]
    fn given_frozen_tree_when_describing_then_error_propagates() {
        let mut tree = SuiteTree::new();
        tree.freeze();

        let result = tree.describe(|root| root.it("late", |_| Ok(())));
        assert!(matches!(result, Err(DomainError::FrozenTree { .. })));
    }
}
