//! Link handles: lazily evaluated views over logical edges.
//!
//! A link is not stored anywhere. It is named by the 4-tuple
//! `(source node, source gate, target node, target slot)` and every attribute
//! is derived from the network on access, so a handle always reflects live
//! partition state. The only materialized value is [`LinkData`].
//!
//! # Example
//!
//! ```
//! use nodenet::{Node, Nodenet, Partition};
//! use nodenet::registry::create_default_registry;
//!
//! let mut net = Nodenet::with_nodetypes(create_default_registry());
//! net.add_partition(Partition::sparse("001", 16)).unwrap();
//! net.add_node(Node::new("a", "Pipe", "001"), 0).unwrap();
//! net.add_node(Node::new("b", "Pipe", "001"), 7).unwrap();
//! net.set_weight("a", "sub", "b", "sur", 1.0).unwrap();
//!
//! let link = net.link("a", "sub", "b", "sur");
//! assert_eq!(link.identity(), "a:sub:b:sur");
//! assert_eq!(link.weight().unwrap(), 1.0);
//! assert_eq!(link.certainty(), 1.0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LinkResult;
use crate::network::NetContext;
use crate::node::{Gate, Node, Slot};
use crate::resolver::{resolve_weight, WeightResolver};
use crate::types::{NodeUid, SymbolicType};

/// Certainty reported for every link.
pub const LINK_CERTAINTY: f64 = 1.0;

/// The identifying 4-tuple of a logical edge.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkKey {
    pub source_node_uid: NodeUid,
    pub source_gate_type: SymbolicType,
    pub target_node_uid: NodeUid,
    pub target_slot_type: SymbolicType,
}

impl LinkKey {
    /// Creates a key from its four parts.
    pub fn new(
        source_node_uid: impl Into<NodeUid>,
        source_gate_type: impl Into<SymbolicType>,
        target_node_uid: impl Into<NodeUid>,
        target_slot_type: impl Into<SymbolicType>,
    ) -> Self {
        Self {
            source_node_uid: source_node_uid.into(),
            source_gate_type: source_gate_type.into(),
            target_node_uid: target_node_uid.into(),
            target_slot_type: target_slot_type.into(),
        }
    }

    /// Canonical identity: `source_node:source_gate:target_node:target_slot`.
    pub fn identity(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.source_node_uid, self.source_gate_type, self.target_node_uid, self.target_slot_type
        )
    }
}

/// Flat record of a link, for serialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkData {
    pub identity: String,
    pub weight: f64,
    pub certainty: f64,
    pub source_gate_name: String,
    pub source_node_uid: NodeUid,
    pub target_slot_name: String,
    pub target_node_uid: NodeUid,
}

impl LinkData {
    /// Serializes the record to JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Borrowed view over one logical edge.
///
/// The network is borrowed, never owned; dropping a handle has no effect
/// on the network.
pub struct Link<'net, C: NetContext + ?Sized> {
    net: &'net C,
    key: LinkKey,
}

impl<'net, C: NetContext + ?Sized> Link<'net, C> {
    /// Creates a handle for `key` over `net`.
    pub fn new(net: &'net C, key: LinkKey) -> Self {
        Self { net, key }
    }

    /// The identifying 4-tuple.
    pub fn key(&self) -> &LinkKey {
        &self.key
    }

    /// Canonical identity string.
    pub fn identity(&self) -> String {
        self.key.identity()
    }

    /// Current weight, read from the network on every call.
    pub fn weight(&self) -> LinkResult<f64> {
        resolve_weight(
            self.net,
            &self.key.source_node_uid,
            &self.key.source_gate_type,
            &self.key.target_node_uid,
            &self.key.target_slot_type,
        )
    }

    /// Current weight under an explicit resolver policy.
    pub fn weight_with(&self, resolver: &WeightResolver) -> LinkResult<f64> {
        resolver.resolve(self.net, &self.key)
    }

    pub fn certainty(&self) -> f64 {
        LINK_CERTAINTY
    }

    pub fn source_node(&self) -> LinkResult<&'net Node> {
        self.net.node(&self.key.source_node_uid)
    }

    pub fn target_node(&self) -> LinkResult<&'net Node> {
        self.net.node(&self.key.target_node_uid)
    }

    pub fn source_gate(&self) -> LinkResult<Gate> {
        self.net
            .gate(&self.key.source_node_uid, &self.key.source_gate_type)
    }

    pub fn target_slot(&self) -> LinkResult<Slot> {
        self.net
            .slot(&self.key.target_node_uid, &self.key.target_slot_type)
    }

    /// Materializes the link into a [`LinkData`] record.
    pub fn snapshot(&self) -> LinkResult<LinkData> {
        Ok(self.record(self.weight()?))
    }

    /// Like [`snapshot`](Self::snapshot), reading the weight under `resolver`.
    pub fn snapshot_with(&self, resolver: &WeightResolver) -> LinkResult<LinkData> {
        Ok(self.record(self.weight_with(resolver)?))
    }

    fn record(&self, weight: f64) -> LinkData {
        LinkData {
            identity: self.identity(),
            weight,
            certainty: self.certainty(),
            source_gate_name: self.key.source_gate_type.clone(),
            source_node_uid: self.key.source_node_uid.clone(),
            target_slot_name: self.key.target_slot_type.clone(),
            target_node_uid: self.key.target_node_uid.clone(),
        }
    }
}

impl<C: NetContext + ?Sized> Clone for Link<'_, C> {
    fn clone(&self) -> Self {
        Self {
            net: self.net,
            key: self.key.clone(),
        }
    }
}

impl<C: NetContext + ?Sized> fmt::Debug for Link<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link").field("key", &self.key).finish()
    }
}

impl<C: NetContext + ?Sized> PartialEq for Link<'_, C> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}
