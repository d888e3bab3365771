//! DOM Mutation Log
//!
//! A synchronous stand-in for MutationObserver: the tree appends one
//! record per effective mutation while observation is on. Writes that
//! change nothing are never recorded.

use crate::NodeId;

/// Mutation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    Attributes,
    ChildList,
}

impl MutationRecord {
    pub(crate) fn attribute(target: NodeId, name: &str, old_value: Option<String>) -> Self {
        Self {
            mutation_type: MutationType::Attributes,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            next_sibling: None,
            attribute_name: Some(name.to_string()),
            old_value,
        }
    }

    pub(crate) fn added(target: NodeId, node: NodeId, next_sibling: Option<NodeId>) -> Self {
        Self {
            mutation_type: MutationType::ChildList,
            target,
            added_nodes: vec![node],
            removed_nodes: Vec::new(),
            next_sibling,
            attribute_name: None,
            old_value: None,
        }
    }

    pub(crate) fn removed(target: NodeId, nodes: Vec<NodeId>) -> Self {
        Self {
            mutation_type: MutationType::ChildList,
            target,
            added_nodes: Vec::new(),
            removed_nodes: nodes,
            next_sibling: None,
            attribute_name: None,
            old_value: None,
        }
    }
}

/// Mutation log owned by a [`DomTree`](crate::DomTree)
#[derive(Debug, Default)]
pub struct MutationLog {
    enabled: bool,
    records: Vec<MutationRecord>,
}

impl MutationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start or stop recording. Stopping keeps pending records.
    pub fn observe(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_observing(&self) -> bool {
        self.enabled
    }

    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn records(&self) -> &[MutationRecord] {
        &self.records
    }

    pub(crate) fn push_record(&mut self, record: MutationRecord) {
        if self.enabled {
            self.records.push(record);
        }
    }
}
