//! Error types for weight resolution and partition bookkeeping.
//!
//! Every failure here is structural: a bad identity, a bad topology or bad
//! storage. None of them is retried or defaulted; they surface to the caller
//! so that a wrong weight never flows silently into the simulation.

use thiserror::Error;

use crate::types::{ElementIndex, NodeUid, PartitionId};

/// Errors raised while addressing or reading link weights.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinkError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeUid),

    #[error("partition not found: {0}")]
    PartitionNotFound(PartitionId),

    #[error("node {node} is not assigned to partition {partition}")]
    NodeNotInPartition { node: NodeUid, partition: PartitionId },

    #[error("unknown node type: {0}")]
    UnknownNodetype(String),

    #[error("gate type {gate} is not defined for node type {nodetype}")]
    UnresolvedGate { nodetype: String, gate: String },

    #[error("slot type {slot} is not defined for node type {nodetype}")]
    UnresolvedSlot { nodetype: String, slot: String },

    #[error(
        "no edge from element {source_element} in partition {source_partition} \
         to element {target_element} in partition {target_partition}"
    )]
    MissingEdge {
        source_partition: PartitionId,
        source_element: ElementIndex,
        target_partition: PartitionId,
        target_element: ElementIndex,
    },

    #[error("inconsistent edge list in partition {target_partition} for source {source_partition}: {detail}")]
    InconsistentEdgeList {
        source_partition: PartitionId,
        target_partition: PartitionId,
        detail: String,
    },

    #[error("element ({row}, {col}) out of range for {dim}x{dim} matrix")]
    ElementOutOfRange {
        row: ElementIndex,
        col: ElementIndex,
        dim: usize,
    },

    #[error("offset conflict in partition {partition}: {detail}")]
    OffsetConflict { partition: PartitionId, detail: String },

    #[error("duplicate edge {from} -> {to}")]
    DuplicateEdge { from: ElementIndex, to: ElementIndex },

    #[error("duplicate node: {0}")]
    DuplicateNode(NodeUid),

    #[error("duplicate partition: {0}")]
    DuplicatePartition(PartitionId),
}

/// Coarse classification of a [`LinkError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// An endpoint node or its partition no longer exists.
    UnresolvedEndpoint,
    /// A gate/slot symbol (or the node type itself) is not valid.
    UnresolvedSymbol,
    /// Both nodes exist, but the edge does not.
    MissingEdge,
    /// Cross-partition storage is corrupted or stale.
    Inconsistent,
    /// Out-of-range access or a violated storage invariant.
    Storage,
}

impl LinkError {
    /// Returns the taxonomy class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LinkError::NodeNotFound(_)
            | LinkError::PartitionNotFound(_)
            | LinkError::NodeNotInPartition { .. } => ErrorKind::UnresolvedEndpoint,
            LinkError::UnknownNodetype(_)
            | LinkError::UnresolvedGate { .. }
            | LinkError::UnresolvedSlot { .. } => ErrorKind::UnresolvedSymbol,
            LinkError::MissingEdge { .. } => ErrorKind::MissingEdge,
            LinkError::InconsistentEdgeList { .. } => ErrorKind::Inconsistent,
            LinkError::ElementOutOfRange { .. }
            | LinkError::OffsetConflict { .. }
            | LinkError::DuplicateEdge { .. }
            | LinkError::DuplicateNode(_)
            | LinkError::DuplicatePartition(_) => ErrorKind::Storage,
        }
    }

    /// Returns true if this is a missing-edge condition.
    pub fn is_missing_edge(&self) -> bool {
        self.kind() == ErrorKind::MissingEdge
    }

    /// Returns true if this signals corrupted edge storage.
    pub fn is_inconsistent(&self) -> bool {
        self.kind() == ErrorKind::Inconsistent
    }
}

/// Result type for link-store operations.
pub type LinkResult<T> = Result<T, LinkError>;
