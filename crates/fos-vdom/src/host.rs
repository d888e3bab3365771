//! Host element binding
//!
//! Everything the reconciler needs from the tree it drives. The renderer
//! never reads attributes back from the host; it trusts its own snapshot.

use std::fmt::Debug;
use std::hash::Hash;

use fos_dom::{DomError, DomTree, NodeId, validate_name};

/// Capability the renderer mutates
pub trait HostTree {
    /// Handle to one host element
    type Handle: Copy + Eq + Hash + Debug;
    /// Host failure
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create a detached element
    fn create_element(&mut self, tag: &str) -> Result<Self::Handle, Self::Error>;

    /// Read an attribute
    fn attribute(&self, element: Self::Handle, name: &str) -> Option<&str>;

    fn set_attribute(&mut self, element: Self::Handle, name: &str, value: &str) -> Result<(), Self::Error>;

    fn remove_attribute(&mut self, element: Self::Handle, name: &str) -> Result<(), Self::Error>;

    /// Insert `child` before `before`, or append when `before` is `None`.
    /// A child attached elsewhere must be moved, not recreated.
    fn insert_before(
        &mut self,
        parent: Self::Handle,
        child: Self::Handle,
        before: Option<Self::Handle>,
    ) -> Result<(), Self::Error>;

    fn remove_child(&mut self, parent: Self::Handle, child: Self::Handle) -> Result<(), Self::Error>;

    fn clear_children(&mut self, parent: Self::Handle) -> Result<(), Self::Error>;

    /// Whether `name` is acceptable as a tag or attribute name. Checked for
    /// every node before a sync touches the tree.
    fn accepts_name(&self, name: &str) -> bool {
        !name.is_empty()
    }

    /// Destroy a detached element the renderer no longer references
    fn release(&mut self, element: Self::Handle) -> Result<(), Self::Error> {
        let _ = element;
        Ok(())
    }
}

impl HostTree for DomTree {
    type Handle = NodeId;
    type Error = DomError;

    fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError> {
        DomTree::create_element(self, tag)
    }

    fn attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        self.get_attribute(element, name)
    }

    fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        DomTree::set_attribute(self, element, name, value)
    }

    fn remove_attribute(&mut self, element: NodeId, name: &str) -> Result<(), DomError> {
        DomTree::remove_attribute(self, element, name).map(drop)
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>) -> Result<(), DomError> {
        DomTree::insert_before(self, parent, child, before)
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        DomTree::remove_child(self, parent, child)
    }

    fn clear_children(&mut self, parent: NodeId) -> Result<(), DomError> {
        DomTree::clear_children(self, parent).map(drop)
    }

    fn accepts_name(&self, name: &str) -> bool {
        validate_name(name).is_ok()
    }

    fn release(&mut self, element: NodeId) -> Result<(), DomError> {
        DomTree::release(self, element)
    }
}
