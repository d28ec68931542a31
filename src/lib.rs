//! Expand a tree of nested example groups into flat, runnable test units.
//!
//! Groups own examples, `before`/`after` hooks and lazily memoized binds.
//! Hooks accumulate down the tree (befores outermost first, afters innermost
//! first); binds are shadowed by the nearest redefinition. Every example
//! becomes one [`ExecutableUnit`] with a positional id, a joined description
//! and a fresh [`BindingStore`] per run.
//!
//! ```ignore
//! use nestcase::{ensure_eq, ExpansionEngine, Runner, SuiteTree};
//!
//! let mut tree = SuiteTree::new();
//! tree.describe(|root| {
//!     root.context("Counter", |g| {
//!         g.bind("count", || 0u32)?;
//!         g.before(|b| {
//!             *b.resolve::<u32>("count")? += 1;
//!             Ok(())
//!         })?;
//!         g.it("starts at one", |b| ensure_eq(b.get::<u32>("count")?, 1))?;
//!         Ok(())
//!     })?;
//!     Ok(())
//! })?;
//!
//! let units = ExpansionEngine::default().expand(tree);
//! assert!(Runner::default().run(&units).is_success());
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod tree_traits;
pub mod util;

pub use application::{
    ApplicationError, ApplicationResult, ExecutableUnit, ExecutionOrder, ExpansionEngine,
    RunReport, Runner, Site, Status, UnitError, UnitOutcome,
};
pub use config::Settings;
pub use domain::{
    ensure, ensure_eq, BindingStore, DomainError, DomainResult, DuplicateBindPolicy, ExampleMode,
    Failure, GroupId, GroupScope, HookId, HookKind, SuiteTree, TreePath,
};
pub use tree_traits::TreeRender;
