//! fOS DOM - Document Object Model
//!
//! Arena-backed element tree used as the host for the virtual DOM
//! reconciler. Nodes are addressed by [`NodeId`] and linked through
//! parent/sibling ids, so moving a node never reallocates it.

mod node;
mod tree;
mod operations;
mod observer;

pub use node::{Node, NodeData, ElementData, Attribute};
pub use tree::{DomTree, Children};
pub use operations::{DomError, DomResult, validate_name};
pub use observer::{MutationLog, MutationRecord, MutationType};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check whether this id refers to a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// `Some(self)` unless this is the sentinel
    #[inline]
    pub(crate) fn valid(self) -> Option<NodeId> {
        self.is_valid().then_some(self)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            f.write_str("#none")
        }
    }
}
