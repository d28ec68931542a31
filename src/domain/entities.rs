//! Domain entities: core data structures

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use thiserror::Error;

use crate::domain::bindings::BindingStore;

/// Hook or example body: runs against the per-example binding store.
pub type Action = Arc<dyn Fn(&mut BindingStore) -> Result<(), Failure> + Send + Sync>;

/// Zero-argument bind producer, type-erased.
pub type Producer = Arc<dyn Fn() -> Result<Box<dyn Any>, Failure> + Send + Sync>;

/// What a hook, body or bind producer reports when it does not succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    #[error("{0}")]
    Message(String),

    #[error("bind `{name}` could not be resolved: {reason}")]
    Bind { name: String, reason: String },

    #[error("panicked: {0}")]
    Panic(String),
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub fn bind(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Bind {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Name of the bind this failure originated from, if any.
    pub fn bind_name(&self) -> Option<&str> {
        match self {
            Self::Bind { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Fail with `message` unless `condition` holds.
pub fn ensure(condition: bool, message: impl Into<String>) -> Result<(), Failure> {
    if condition {
        Ok(())
    } else {
        Err(Failure::new(message))
    }
}

/// Fail unless `left == right`, reporting both sides.
pub fn ensure_eq<T: PartialEq + fmt::Debug>(left: T, right: T) -> Result<(), Failure> {
    if left == right {
        Ok(())
    } else {
        Err(Failure::new(format!(
            "expected `{:?}` to equal `{:?}`",
            left, right
        )))
    }
}

/// Positional identifier of a group or example.
///
/// One 1-based segment per ancestor group (root included), plus the
/// node's own position among its parent's children and examples.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreePath(Vec<u32>);

impl TreePath {
    pub fn root(block: u32) -> Self {
        Self(vec![block])
    }

    pub fn child(&self, segment: u32) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    pub fn segments(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as an identifier, e.g. `1_2_1` for separator `_`.
    pub fn join(&self, separator: &str) -> String {
        self.0.iter().join(separator)
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.join("."))
    }
}

impl From<Vec<u32>> for TreePath {
    fn from(segments: Vec<u32>) -> Self {
        Self(segments)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    Before,
    After,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookKind::Before => write!(f, "before"),
            HookKind::After => write!(f, "after"),
        }
    }
}

/// Identity of one hook: owning group, kind and 1-based declaration position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HookId {
    /// Full description of the owning group (empty for the root)
    pub group: String,
    pub kind: HookKind,
    pub position: usize,
}

impl fmt::Display for HookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let group = if self.group.is_empty() {
            "<root>"
        } else {
            self.group.as_str()
        };
        write!(f, "{} hook #{} of \"{}\"", self.kind, self.position, group)
    }
}

/// How an example's body outcome is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExampleMode {
    #[default]
    Normal,
    /// Declared but not run
    Ignored,
    /// Body is expected to fail
    ExpectFailure,
}

/// Named, lazily resolved value producer attached to a group.
#[derive(Clone)]
pub struct Bind {
    pub name: String,
    producer: Producer,
}

impl Bind {
    pub fn new(name: impl Into<String>, producer: Producer) -> Self {
        Self {
            name: name.into(),
            producer,
        }
    }

    pub fn produce(&self) -> Result<Box<dyn Any>, Failure> {
        (self.producer)()
    }
}

impl fmt::Debug for Bind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bind").field("name", &self.name).finish()
    }
}

/// Leaf test case owned by exactly one group.
#[derive(Clone)]
pub struct Example {
    pub description: String,
    pub mode: ExampleMode,
    pub body: Action,
}

impl fmt::Debug for Example {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Example")
            .field("description", &self.description)
            .field("mode", &self.mode)
            .finish()
    }
}
