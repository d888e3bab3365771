//! Reconciliation errors

use crate::{ElementId, Key};

/// Result type for renderer operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Renderer errors
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Internal bookkeeping is inconsistent; always a reconciler bug
    #[error("invariant violation: {0}")]
    InvariantViolation(#[from] InvariantViolation),

    /// The description handed to `sync` is malformed
    #[error("invalid description: {0}")]
    InvalidDescription(#[from] InvalidDescription),

    /// The host tree refused an operation
    #[error("host operation failed: {0}")]
    Host(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// `sync` was entered while another `sync` was running
    #[error("sync called while a sync is already in progress")]
    Reentrant,

    /// An earlier `sync` failed and left the tree half-updated
    #[error("renderer is poisoned by a failed sync; rebuild it")]
    Poisoned,
}

impl RenderError {
    pub(crate) fn host<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        RenderError::Host(Box::new(err))
    }
}

/// Internal consistency failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("element {0} does not exist")]
    MissingElement(ElementId),

    #[error("element {child} is not a child of {parent}")]
    NotAChild { parent: ElementId, child: ElementId },

    #[error("inserting {child} under {parent} would create a cycle")]
    Cycle { parent: ElementId, child: ElementId },
}

/// Malformed input, reported per offending node
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidDescription {
    #[error("key {key} appears more than once")]
    DuplicateKey { key: Key },

    #[error("root tag cannot change from <{expected}> to <{found}>")]
    RootTagMismatch { expected: String, found: String },

    #[error("node {key} has an empty tag")]
    EmptyTag { key: Key },

    #[error("node {key} is nested deeper than {limit} levels")]
    TooDeep { key: Key, limit: usize },

    #[error("node {key} uses invalid name {name:?}")]
    InvalidName { key: Key, name: String },
}
