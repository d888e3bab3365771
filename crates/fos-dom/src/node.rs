//! DOM Node
//!
//! Nodes link to their relatives by [`NodeId`] rather than by pointer:
//! - O(1) append and insert-before through `last_child` / `prev_sibling`
//! - O(1) unlink, which is what keeps moves cheap

use crate::NodeId;

/// DOM Node - Core structure
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node (NONE if detached or root)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    /// Create a new element node
    pub fn element(tag: impl Into<String>) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(tag)))
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this node has any children
    #[inline]
    pub fn has_children(&self) -> bool {
        self.first_child.is_valid()
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            NodeData::Document => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            NodeData::Document => None,
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Tag name
    pub tag: String,
    /// Attributes in insertion order
    pub attrs: Vec<Attribute>,
}

impl ElementData {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute
    pub(crate) fn set_attr(&mut self, name: &str, value: &str) -> AttrWrite {
        for attr in self.attrs.iter_mut() {
            if attr.name == name {
                if attr.value == value {
                    return AttrWrite::Unchanged;
                }
                return AttrWrite::Replaced(std::mem::replace(&mut attr.value, value.to_string()));
            }
        }
        self.attrs.push(Attribute {
            name: name.to_string(),
            value: value.to_string(),
        });
        AttrWrite::Added
    }

    /// Remove an attribute, returning its old value
    pub(crate) fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attrs.iter().position(|a| a.name == name)?;
        Some(self.attrs.remove(index).value)
    }
}

/// Outcome of [`ElementData::set_attr`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AttrWrite {
    /// The attribute did not exist
    Added,
    /// The value changed; carries the old value
    Replaced(String),
    /// Same value already present, nothing written
    Unchanged,
}

/// Attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}
