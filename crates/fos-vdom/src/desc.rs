//! Node Descriptions
//!
//! The caller-side input format. A description is read-only to the
//! renderer; every node carries a required key that identifies it across
//! syncs.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Attribute name → value
pub type Attributes = BTreeMap<String, AttrValue>;

/// Stable identity of a description across syncs.
///
/// Keys are global to a renderer, not scoped to a parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(n) => write!(f, "{n}"),
            Key::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

impl From<i32> for Key {
    fn from(n: i32) -> Self {
        Key::Int(n.into())
    }
}

impl From<u32> for Key {
    fn from(n: u32) -> Self {
        Key::Int(n.into())
    }
}

/// Attribute value.
///
/// Booleans use presence semantics, everything else is written as its
/// string form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl AttrValue {
    /// The string the host element should carry, or `None` if the
    /// attribute must be absent.
    pub fn rendered(&self) -> Option<String> {
        match self {
            AttrValue::Bool(true) => Some(String::new()),
            AttrValue::Bool(false) => None,
            AttrValue::Number(n) => Some(format_number(*n)),
            AttrValue::Text(s) => Some(s.clone()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        // -0 prints as 0
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // Exponent form with an explicit sign: 1e+21, 1.5e-7
        let exp = format!("{n:e}");
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
            _ => exp,
        }
    } else {
        format!("{n}")
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Number(n)
    }
}

impl From<i32> for AttrValue {
    fn from(n: i32) -> Self {
        AttrValue::Number(n.into())
    }
}

impl From<u32> for AttrValue {
    fn from(n: u32) -> Self {
        AttrValue::Number(n.into())
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

/// Declarative description of one node and its subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDesc {
    pub key: Key,
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDesc>,
}

impl NodeDesc {
    pub fn new(key: impl Into<Key>, tag: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            tag: tag.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Append a child
    pub fn child(mut self, child: NodeDesc) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children
    pub fn children(mut self, children: impl IntoIterator<Item = NodeDesc>) -> Self {
        self.children.extend(children);
        self
    }

    /// Number of nodes in this subtree, self included
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(NodeDesc::node_count).sum::<usize>()
    }
}
