//! Core type definitions for the link-weight store.
//!
//! Identities are opaque tokens. Partition and type membership of a node is
//! only ever resolved through the registries, never by parsing an identity.

/// Globally unique identity of a node in the node net.
///
/// Stable for the lifetime of the node and used as the key into every
/// per-partition offset index.
pub type NodeUid = String;

/// Identity of a partition (e.g. `"001"`).
pub type PartitionId = String;

/// Symbolic gate or slot type (e.g. `"gen"`, `"por"`).
///
/// Only meaningful relative to the type of the node it belongs to.
pub type SymbolicType = String;

/// Position of one gate or slot of one node inside a partition's matrix.
pub type ElementIndex = usize;

/// Stored weight value.
pub type Weight = f32;
