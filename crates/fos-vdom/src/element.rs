//! Virtual Elements
//!
//! A [`VElement`] owns exactly one host element for its whole life and
//! mirrors that element's attributes and child order. [`ElementTree`] keeps
//! the two in lockstep: every structural change is applied to the virtual
//! child list and the host element in the same call.

use crate::renderer::SyncStats;
use crate::{
    AttrValue, Attributes, ElementArena, ElementId, HostTree, InvariantViolation, RenderError,
    RenderResult,
};

/// Live counterpart of a description
#[derive(Debug, Clone)]
pub struct VElement<Hd> {
    tag: String,
    attributes: Attributes,
    children: Vec<ElementId>,
    parent: Option<ElementId>,
    host: Hd,
}

impl<Hd: Copy> VElement<Hd> {
    fn new(tag: &str, host: Hd) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: Attributes::new(),
            children: Vec::new(),
            parent: None,
            host,
        }
    }

    /// Tag name, fixed at creation
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attributes currently applied to the host element
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Children, in host order
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// The bound host element
    pub fn host(&self) -> Hd {
        self.host
    }
}

/// Virtual elements bound to a host tree
#[derive(Debug)]
pub struct ElementTree<H: HostTree> {
    host: H,
    elements: ElementArena<VElement<H::Handle>>,
    pub(crate) stats: SyncStats,
}

impl<H: HostTree> ElementTree<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            elements: ElementArena::new(),
            stats: SyncStats::default(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access. Changing elements the tree owns behind its
    /// back breaks the snapshot invariants.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Number of live virtual elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: ElementId) -> Option<&VElement<H::Handle>> {
        self.elements.get(id)
    }

    fn element(&self, id: ElementId) -> RenderResult<&VElement<H::Handle>> {
        self.elements.get(id)
            .ok_or_else(|| InvariantViolation::MissingElement(id).into())
    }

    fn element_mut(&mut self, id: ElementId) -> RenderResult<&mut VElement<H::Handle>> {
        self.elements.get_mut(id)
            .ok_or_else(|| InvariantViolation::MissingElement(id).into())
    }

    /// Child currently at `index`
    pub fn child_at(&self, parent: ElementId, index: usize) -> Option<ElementId> {
        self.get(parent)?.children.get(index).copied()
    }

    /// Whether `ancestor` is a strict ancestor of `node`
    pub fn is_ancestor(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut current = self.get(node).and_then(VElement::parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(VElement::parent);
        }
        false
    }

    /// Allocate an element and its host element. Attributes and children
    /// are filled in later by reconciliation.
    pub fn create(&mut self, tag: &str) -> RenderResult<ElementId> {
        let handle = self.host.create_element(tag).map_err(RenderError::host)?;
        let id = self.elements.insert(VElement::new(tag, handle));
        self.stats.created += 1;
        tracing::trace!("Created <{}> as {}", tag, id);
        Ok(id)
    }

    /// Make the element's attributes match `desired`.
    ///
    /// The host is only touched when the rendered form of an attribute
    /// changes: `false` means absent, `true` means present and empty.
    pub fn apply_attributes(&mut self, id: ElementId, desired: &Attributes) -> RenderResult<()> {
        let Self { host, elements, stats } = self;
        let element = elements.get_mut(id).ok_or(InvariantViolation::MissingElement(id))?;
        let handle = element.host;

        let removed: Vec<String> = element.attributes.keys()
            .filter(|name| !desired.contains_key(*name))
            .cloned()
            .collect();
        for name in removed {
            let old = element.attributes.remove(&name);
            if old.as_ref().and_then(AttrValue::rendered).is_some() {
                host.remove_attribute(handle, &name).map_err(RenderError::host)?;
                stats.attributes_removed += 1;
            }
        }

        for (name, value) in desired {
            let previous = element.attributes.get(name);
            if previous == Some(value) {
                continue;
            }
            let before = previous.and_then(AttrValue::rendered);
            let after = value.rendered();
            if before != after {
                match after {
                    Some(text) => {
                        host.set_attribute(handle, name, &text).map_err(RenderError::host)?;
                        stats.attributes_set += 1;
                    }
                    None => {
                        host.remove_attribute(handle, name).map_err(RenderError::host)?;
                        stats.attributes_removed += 1;
                    }
                }
            }
            element.attributes.insert(name.clone(), value.clone());
        }
        Ok(())
    }

    /// Place `child` at `index` under `parent`, detaching it from wherever
    /// it currently is. The host element is moved, never recreated.
    /// Indices past the end append.
    pub fn insert_child(&mut self, parent: ElementId, child: ElementId, index: usize) -> RenderResult<()> {
        if child == parent || self.is_ancestor(child, parent) {
            return Err(InvariantViolation::Cycle { parent, child }.into());
        }

        let old_parent = self.element(child)?.parent;
        if let Some(old) = old_parent {
            self.unlink(old, child)?;
        }

        let parent_el = self.element(parent)?;
        let index = index.min(parent_el.children.len());
        let parent_handle = parent_el.host;
        let before = match parent_el.children.get(index) {
            Some(&sibling) => Some(self.element(sibling)?.host),
            None => None,
        };
        let child_handle = self.element(child)?.host;

        self.host.insert_before(parent_handle, child_handle, before).map_err(RenderError::host)?;
        self.element_mut(parent)?.children.insert(index, child);
        self.element_mut(child)?.parent = Some(parent);

        if old_parent.is_some() {
            self.stats.moved += 1;
            tracing::trace!("Moved {} to {}[{}]", child, parent, index);
        } else {
            self.stats.inserted += 1;
            tracing::trace!("Inserted {} at {}[{}]", child, parent, index);
        }
        Ok(())
    }

    /// Detach `child` from `parent`
    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> RenderResult<()> {
        self.unlink(parent, child)?;
        self.stats.removed += 1;
        tracing::trace!("Removed {} from {}", child, parent);
        Ok(())
    }

    fn unlink(&mut self, parent: ElementId, child: ElementId) -> RenderResult<()> {
        let parent_el = self.element(parent)?;
        let position = parent_el.children.iter()
            .position(|&c| c == child)
            .ok_or(InvariantViolation::NotAChild { parent, child })?;
        let parent_handle = parent_el.host;
        let child_handle = self.element(child)?.host;

        self.host.remove_child(parent_handle, child_handle).map_err(RenderError::host)?;
        self.element_mut(parent)?.children.remove(position);
        self.element_mut(child)?.parent = None;
        Ok(())
    }

    /// Detach every child of `parent` in one host operation
    pub fn clear_children(&mut self, parent: ElementId) -> RenderResult<()> {
        let parent_el = self.element_mut(parent)?;
        if parent_el.children.is_empty() {
            return Ok(());
        }
        let children = std::mem::take(&mut parent_el.children);
        let parent_handle = parent_el.host;

        self.host.clear_children(parent_handle).map_err(RenderError::host)?;
        for &child in &children {
            self.element_mut(child)?.parent = None;
        }
        self.stats.removed += children.len();
        tracing::trace!("Cleared {} children of {}", children.len(), parent);
        Ok(())
    }

    /// Remove trailing children until `parent` has at most `len`
    pub fn truncate_children(&mut self, parent: ElementId, len: usize) -> RenderResult<()> {
        loop {
            let children = &self.element(parent)?.children;
            if children.len() <= len {
                return Ok(());
            }
            let last = children[children.len() - 1];
            self.remove_child(parent, last)?;
        }
    }

    /// Free an element and release its host element.
    ///
    /// Surviving relatives only lose their links to it; nothing else is
    /// detached on the host side beyond what `release` does.
    pub fn destroy(&mut self, id: ElementId) -> RenderResult<()> {
        let element = self.elements.remove(id).ok_or(InvariantViolation::MissingElement(id))?;
        if let Some(parent) = element.parent.and_then(|p| self.elements.get_mut(p)) {
            parent.children.retain(|&c| c != id);
        }
        for child in &element.children {
            if let Some(child_el) = self.elements.get_mut(*child) {
                if child_el.parent == Some(id) {
                    child_el.parent = None;
                }
            }
        }
        self.host.release(element.host).map_err(RenderError::host)?;
        tracing::trace!("Destroyed {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_dom::DomTree;

    fn tree_with_children(n: usize) -> (ElementTree<DomTree>, ElementId, Vec<ElementId>) {
        let mut tree = ElementTree::new(DomTree::new());
        let parent = tree.create("ul").unwrap();
        let children = (0..n)
            .map(|i| {
                let child = tree.create("li").unwrap();
                tree.insert_child(parent, child, i).unwrap();
                child
            })
            .collect();
        (tree, parent, children)
    }

    fn host_children(tree: &ElementTree<DomTree>, parent: ElementId) -> Vec<fos_dom::NodeId> {
        tree.host().child_ids(tree.get(parent).unwrap().host())
    }

    fn handles(tree: &ElementTree<DomTree>, ids: &[ElementId]) -> Vec<fos_dom::NodeId> {
        ids.iter().map(|&id| tree.get(id).unwrap().host()).collect()
    }

    #[test]
    fn test_apply_attributes_boolean_presence() {
        let mut tree = ElementTree::new(DomTree::new());
        let el = tree.create("input").unwrap();
        let handle = tree.get(el).unwrap().host();

        let mut attrs = Attributes::new();
        attrs.insert("a".into(), AttrValue::from(1));
        attrs.insert("b".into(), AttrValue::from(true));
        attrs.insert("c".into(), AttrValue::from("x"));
        tree.apply_attributes(el, &attrs).unwrap();

        assert_eq!(tree.host().get_attribute(handle, "a"), Some("1"));
        assert_eq!(tree.host().get_attribute(handle, "b"), Some(""));
        assert_eq!(tree.host().get_attribute(handle, "c"), Some("x"));

        attrs.insert("b".into(), AttrValue::from(false));
        attrs.remove("c");
        tree.apply_attributes(el, &attrs).unwrap();

        assert_eq!(tree.host().get_attribute(handle, "b"), None);
        assert_eq!(tree.host().get_attribute(handle, "c"), None);
        assert_eq!(tree.get(el).unwrap().attributes().len(), 2);
    }

    #[test]
    fn test_apply_attributes_skips_equivalent_values() {
        let mut tree = ElementTree::new(DomTree::new());
        let el = tree.create("div").unwrap();

        let mut attrs = Attributes::new();
        attrs.insert("n".into(), AttrValue::from(1));
        attrs.insert("off".into(), AttrValue::from(false));
        tree.apply_attributes(el, &attrs).unwrap();
        assert_eq!(tree.stats.attributes_set, 1);
        assert_eq!(tree.stats.attributes_removed, 0);

        tree.host_mut().observe(true);
        attrs.insert("n".into(), AttrValue::from("1"));
        tree.apply_attributes(el, &attrs).unwrap();
        attrs.remove("off");
        tree.apply_attributes(el, &attrs).unwrap();

        assert!(tree.host_mut().take_records().is_empty());
        assert_eq!(tree.get(el).unwrap().attributes()["n"], AttrValue::from("1"));
    }

    #[test]
    fn test_insert_child_relocates_without_recreating() {
        let (mut tree, ul, ids) = tree_with_children(3);
        let handle = tree.get(ids[2]).unwrap().host();

        tree.insert_child(ul, ids[2], 0).unwrap();

        assert_eq!(tree.get(ul).unwrap().children(), &[ids[2], ids[0], ids[1]]);
        assert_eq!(tree.get(ids[2]).unwrap().host(), handle);
        assert_eq!(host_children(&tree, ul), handles(&tree, &[ids[2], ids[0], ids[1]]));
        assert_eq!(tree.stats.moved, 1);
    }

    #[test]
    fn test_insert_child_across_parents() {
        let (mut tree, ul, ids) = tree_with_children(2);
        let other = tree.create("ol").unwrap();

        tree.insert_child(other, ids[0], 5).unwrap();

        assert_eq!(tree.get(ul).unwrap().children(), &[ids[1]]);
        assert_eq!(tree.get(other).unwrap().children(), &[ids[0]]);
        assert_eq!(tree.get(ids[0]).unwrap().parent(), Some(other));
        assert_eq!(host_children(&tree, other), handles(&tree, &[ids[0]]));
    }

    #[test]
    fn test_insert_child_rejects_cycle() {
        let (mut tree, ul, ids) = tree_with_children(1);
        let err = tree.insert_child(ids[0], ul, 0).unwrap_err();
        assert!(matches!(
            err,
            RenderError::InvariantViolation(InvariantViolation::Cycle { .. })
        ));
    }

    #[test]
    fn test_remove_non_member_is_invariant_violation() {
        let (mut tree, ul, _) = tree_with_children(1);
        let stray = tree.create("li").unwrap();

        let err = tree.remove_child(ul, stray).unwrap_err();
        assert!(matches!(
            err,
            RenderError::InvariantViolation(InvariantViolation::NotAChild { parent, child })
                if parent == ul && child == stray
        ));
    }

    #[test]
    fn test_truncate_and_clear() {
        let (mut tree, ul, ids) = tree_with_children(4);

        tree.truncate_children(ul, 2).unwrap();
        assert_eq!(tree.get(ul).unwrap().children(), &ids[..2]);
        assert_eq!(tree.get(ids[3]).unwrap().parent(), None);

        tree.clear_children(ul).unwrap();
        assert!(tree.get(ul).unwrap().children().is_empty());
        assert!(host_children(&tree, ul).is_empty());
        assert_eq!(tree.stats.removed, 4);
    }

    #[test]
    fn test_destroy_releases_host_element() {
        let (mut tree, ul, ids) = tree_with_children(1);
        let handle = tree.get(ids[0]).unwrap().host();

        tree.remove_child(ul, ids[0]).unwrap();
        tree.destroy(ids[0]).unwrap();

        assert!(tree.get(ids[0]).is_none());
        assert!(!tree.host().contains(handle));
        assert!(tree.destroy(ids[0]).is_err());
    }
}
