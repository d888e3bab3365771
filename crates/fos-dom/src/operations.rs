//! DOM Node Operations
//!
//! Error type shared by the tree manipulation API: insertBefore,
//! removeChild, attribute writes and node release.

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found (never allocated, or already released)
    #[error("node {0} not found")]
    NotFound(NodeId),

    /// Hierarchy error (e.g., inserting an ancestor into its descendant)
    #[error("cannot insert {child} under {parent}: hierarchy request error")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    /// Operation needs an element but got the document node
    #[error("node {0} is not an element")]
    InvalidNodeType(NodeId),

    /// Node is not a child of the given parent
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    /// Tag or attribute name is empty or contains forbidden characters
    #[error("invalid name {0:?}")]
    InvalidName(String),
}

/// Check a tag or attribute name the way `createElement` does, loosely:
/// non-empty, no whitespace, no markup delimiters.
pub fn validate_name(name: &str) -> DomResult<()> {
    let forbidden = |c: char| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '\'' | '/' | '=');
    if name.is_empty() || name.contains(forbidden) {
        return Err(DomError::InvalidName(name.to_string()));
    }
    Ok(())
}
