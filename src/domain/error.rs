//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the tree construction contract.
/// They are programming errors in the front-end, not test outcomes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("tree is frozen: cannot {operation} after construction")]
    FrozenTree { operation: &'static str },

    #[error("unknown group handle: {0}")]
    UnknownGroup(String),

    #[error("bind `{name}` defined twice in group \"{group}\"")]
    DuplicateBind { name: String, group: String },
}

/// Result type for tree operations.
pub type DomainResult<T> = Result<T, DomainError>;
