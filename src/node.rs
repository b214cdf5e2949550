//! Nodes, their gates and slots, and the node registry interface.
//!
//! A node is addressed only through its identity. Where it lives (partition)
//! and what it is (node type) are answered by a [`NodeRegistry`].

use serde::{Deserialize, Serialize};

use crate::error::LinkResult;
use crate::types::{ElementIndex, NodeUid, PartitionId, SymbolicType};

/// Registry facts about one node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identity
    pub uid: NodeUid,
    /// Name of the node type
    pub nodetype: String,
    /// Owning partition
    pub partition: PartitionId,
    /// Optional human-readable name
    #[serde(default)]
    pub name: Option<String>,
}

impl Node {
    /// Creates a node record.
    pub fn new(
        uid: impl Into<NodeUid>,
        nodetype: impl Into<String>,
        partition: impl Into<PartitionId>,
    ) -> Self {
        Self {
            uid: uid.into(),
            nodetype: nodetype.into(),
            partition: partition.into(),
            name: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A resolved output channel of a node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gate {
    pub node_uid: NodeUid,
    pub gate_type: SymbolicType,
    /// Numerical gate index within the node type
    pub index: usize,
    /// Absolute element in the owning partition
    pub element: ElementIndex,
}

/// A resolved input channel of a node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub node_uid: NodeUid,
    pub slot_type: SymbolicType,
    /// Numerical slot index within the node type
    pub index: usize,
    /// Absolute element in the owning partition
    pub element: ElementIndex,
}

/// Network-wide node lookups.
pub trait NodeRegistry {
    /// Returns the node record for `uid`.
    fn node(&self, uid: &str) -> LinkResult<&Node>;

    /// Partition the node is currently assigned to.
    fn owning_partition(&self, uid: &str) -> LinkResult<&PartitionId> {
        self.node(uid).map(|n| &n.partition)
    }

    /// Current type of the node.
    fn node_type(&self, uid: &str) -> LinkResult<&str> {
        self.node(uid).map(|n| n.nodetype.as_str())
    }

    /// Resolves gate `symbol` of node `uid`.
    fn gate(&self, uid: &str, symbol: &str) -> LinkResult<Gate>;

    /// Resolves slot `symbol` of node `uid`.
    fn slot(&self, uid: &str, symbol: &str) -> LinkResult<Slot>;
}
