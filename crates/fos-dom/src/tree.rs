//! DOM Tree (arena-based allocation)
//!
//! Slots freed by [`DomTree::release`] go on a free list and are reused by
//! later `create_element` calls.

use crate::node::AttrWrite;
use crate::operations::validate_name;
use crate::{Attribute, DomError, DomResult, MutationLog, MutationRecord, Node, NodeId};

/// Arena-based DOM tree for memory efficiency
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Option<Node>>,
    free_list: Vec<u32>,
    live: usize,
    log: MutationLog,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a new tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node::document())],
            free_list: Vec::new(),
            live: 1,
            log: MutationLog::new(),
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::NotFound(id))
    }

    /// Number of live nodes, document included
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if tree holds nothing but the document node
    pub fn is_empty(&self) -> bool {
        self.live <= 1
    }

    /// Check whether `id` refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> DomResult<NodeId> {
        validate_name(tag)?;
        let node = Node::element(tag);
        self.live += 1;
        if let Some(index) = self.free_list.pop() {
            self.nodes[index as usize] = Some(node);
            return Ok(NodeId(index));
        }
        let index = self.nodes.len() as u32;
        self.nodes.push(Some(node));
        Ok(NodeId(index))
    }

    /// Free a node's slot.
    ///
    /// The node is unlinked from its parent and its children are left
    /// detached; they stay alive until released themselves.
    pub fn release(&mut self, id: NodeId) -> DomResult<()> {
        if id == NodeId::ROOT {
            return Err(DomError::InvalidNodeType(id));
        }
        let parent = self.node(id)?.parent;
        if parent.is_valid() {
            self.remove_child(parent, id)?;
        }

        let mut child = self.node(id)?.first_child;
        while let Some(current) = child.valid() {
            let node = self.node_mut(current)?;
            child = node.next_sibling;
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }

        self.nodes[id.index()] = None;
        self.free_list.push(id.0);
        self.live -= 1;
        tracing::trace!("Released node {}", id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    /// Tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_element().map(|e| e.tag.as_str())
    }

    /// Get an attribute value
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)?.as_element()?.get_attr(name)
    }

    /// Iterate over an element's attributes in insertion order
    pub fn attributes(&self, id: NodeId) -> impl Iterator<Item = &Attribute> {
        self.get(id)
            .and_then(Node::as_element)
            .map(|e| e.attrs.as_slice())
            .unwrap_or_default()
            .iter()
    }

    /// Set an attribute. Writing the current value is a no-op.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        validate_name(name)?;
        let element = self.node_mut(id)?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType(id))?;
        let old_value = match element.set_attr(name, value) {
            AttrWrite::Unchanged => return Ok(()),
            AttrWrite::Added => None,
            AttrWrite::Replaced(old) => Some(old),
        };
        self.log.push_record(MutationRecord::attribute(id, name, old_value));
        Ok(())
    }

    /// Remove an attribute; returns whether it was present
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<bool> {
        let element = self.node_mut(id)?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType(id))?;
        match element.remove_attr(name) {
            Some(old) => {
                self.log.push_record(MutationRecord::attribute(id, name, Some(old)));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Parent of a node, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent.valid()
    }

    /// Iterate over children
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let next = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        Children { tree: self, next }
    }

    /// Child ids as a vector
    pub fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).map(|(child, _)| child).collect()
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        while current.is_valid() {
            if current == ancestor {
                return true;
            }
            current = self.get(current).map_or(NodeId::NONE, |n| n.parent);
        }
        false
    }

    /// Append a child node
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `ref_child`, or at the end when `ref_child` is
    /// `None`. A child that already has a parent is moved, not copied.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, ref_child: Option<NodeId>) -> DomResult<()> {
        self.node(parent)?;
        if !self.node(child)?.is_element() {
            return Err(DomError::InvalidNodeType(child));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        let mut reference = match ref_child {
            Some(r) if self.node(r)?.parent != parent => {
                return Err(DomError::NotAChild { parent, child: r });
            }
            Some(r) => r,
            None => NodeId::NONE,
        };
        if reference == child {
            reference = self.node(child)?.next_sibling;
        }

        let old_parent = self.node(child)?.parent;
        if old_parent.is_valid() {
            self.remove_child(old_parent, child)?;
        }
        self.link(parent, child, reference)?;
        self.log.push_record(MutationRecord::added(parent, child, reference.valid()));
        Ok(())
    }

    /// Remove a child node
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        if self.node(child)?.parent != parent {
            return Err(DomError::NotAChild { parent, child });
        }
        self.unlink(child)?;
        self.log.push_record(MutationRecord::removed(parent, vec![child]));
        Ok(())
    }

    /// Detach every child in one pass; returns how many were removed
    pub fn clear_children(&mut self, parent: NodeId) -> DomResult<usize> {
        let mut removed = Vec::new();
        let mut child = self.node(parent)?.first_child;
        while let Some(current) = child.valid() {
            let node = self.node_mut(current)?;
            child = node.next_sibling;
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
            removed.push(current);
        }
        if removed.is_empty() {
            return Ok(0);
        }

        let node = self.node_mut(parent)?;
        node.first_child = NodeId::NONE;
        node.last_child = NodeId::NONE;
        let count = removed.len();
        self.log.push_record(MutationRecord::removed(parent, removed));
        Ok(count)
    }

    fn link(&mut self, parent: NodeId, child: NodeId, before: NodeId) -> DomResult<()> {
        let prev = if before.is_valid() {
            self.node(before)?.prev_sibling
        } else {
            self.node(parent)?.last_child
        };

        {
            let node = self.node_mut(child)?;
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = before;
        }
        if prev.is_valid() {
            self.node_mut(prev)?.next_sibling = child;
        } else {
            self.node_mut(parent)?.first_child = child;
        }
        if before.is_valid() {
            self.node_mut(before)?.prev_sibling = child;
        } else {
            self.node_mut(parent)?.last_child = child;
        }
        Ok(())
    }

    fn unlink(&mut self, child: NodeId) -> DomResult<()> {
        let (parent, prev, next) = {
            let node = self.node_mut(child)?;
            let links = (node.parent, node.prev_sibling, node.next_sibling);
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
            links
        };
        if prev.is_valid() {
            self.node_mut(prev)?.next_sibling = next;
        } else if parent.is_valid() {
            self.node_mut(parent)?.first_child = next;
        }
        if next.is_valid() {
            self.node_mut(next)?.prev_sibling = prev;
        } else if parent.is_valid() {
            self.node_mut(parent)?.last_child = prev;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    /// Start or stop recording mutations
    pub fn observe(&mut self, enabled: bool) {
        self.log.observe(enabled);
    }

    /// Drain recorded mutations
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        self.log.take_records()
    }

    /// Access the mutation log
    pub fn mutation_log(&self) -> &MutationLog {
        &self.log
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    /// Serialize a node and its subtree as HTML.
    ///
    /// The document node serializes as the concatenation of its children.
    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get(id) else { return };
        let Some(element) = node.as_element() else {
            for (child, _) in self.children(id) {
                self.write_html(child, out);
            }
            return;
        };

        out.push('<');
        out.push_str(&element.tag);
        for attr in &element.attrs {
            out.push(' ');
            out.push_str(&attr.name);
            if !attr.value.is_empty() {
                out.push_str("=\"");
                escape_attribute(&attr.value, out);
                out.push('"');
            }
        }
        out.push('>');
        for (child, _) in self.children(id) {
            self.write_html(child, out);
        }
        out.push_str("</");
        out.push_str(&element.tag);
        out.push('>');
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

/// Iterator over a node's children
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.valid()?;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}
