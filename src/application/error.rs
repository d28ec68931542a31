//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::{DomainError, Failure, HookId};

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

/// Where inside a unit a failure originated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Site {
    Hook(HookId),
    Body,
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Site::Hook(id) => write!(f, "{}", id),
            Site::Body => write!(f, "example body"),
        }
    }
}

/// Failure of one executable unit, classified by kind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error("{hook} failed: {failure}")]
    HookFailure { hook: HookId, failure: Failure },

    #[error("example body failed: {failure}")]
    BodyFailure { failure: Failure },

    #[error("bind `{name}` failed in {site}: {reason}")]
    BindResolutionFailure {
        name: String,
        site: Site,
        reason: String,
    },
}

impl UnitError {
    /// Classify a failure reported at `site`. Bind failures win over the
    /// site's own kind.
    pub fn at(site: Site, failure: Failure) -> Self {
        match failure {
            Failure::Bind { name, reason } => Self::BindResolutionFailure { name, site, reason },
            failure => match site {
                Site::Hook(hook) => Self::HookFailure { hook, failure },
                Site::Body => Self::BodyFailure { failure },
            },
        }
    }

    pub fn site(&self) -> Site {
        match self {
            Self::HookFailure { hook, .. } => Site::Hook(hook.clone()),
            Self::BodyFailure { .. } => Site::Body,
            Self::BindResolutionFailure { site, .. } => site.clone(),
        }
    }
}
