//! Domain layer: the example group tree and everything derived from it
//!
//! This layer is independent of external concerns (no config loading, no scheduling).

pub mod arena;
pub mod bindings;
pub mod builder;
pub mod entities;
pub mod error;
pub mod hooks;
pub mod naming;

pub use arena::{DuplicateBindPolicy, Entry, GroupId, GroupNode, SuiteTree};
pub use bindings::BindingStore;
pub use builder::GroupScope;
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use hooks::{resolve_chain, HookChain, ResolvedHook};
pub use naming::{assign_names, ExampleRef, NameTable, NamedExample};
