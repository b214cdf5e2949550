//! Weight resolution for logical edges.
//!
//! A logical edge is `(source node, source gate, target node, target slot)`.
//! Resolution locates the partitions of both endpoints, turns the symbolic
//! gate and slot into numerical indices, and then reads either:
//!
//! - the shared partition's matrix at `(target element, source element)`
//!   when both nodes live in the same partition, or
//! - the target partition's cross-partition edge list for the source
//!   partition otherwise.
//!
//! Rows are always target elements and columns are always source elements.
//!
//! # Example
//!
//! ```
//! use nodenet::{Node, Nodenet, Partition, resolve_weight};
//! use nodenet::registry::create_default_registry;
//!
//! let mut net = Nodenet::with_nodetypes(create_default_registry());
//! net.add_partition(Partition::dense("A", 4)).unwrap();
//! net.add_node(Node::new("n1", "Register", "A"), 0).unwrap();
//! net.add_node(Node::new("n2", "Register", "A"), 1).unwrap();
//! net.set_weight("n1", "gen", "n2", "gen", 0.5).unwrap();
//!
//! assert_eq!(resolve_weight(&net, "n1", "gen", "n2", "gen").unwrap(), 0.5);
//! assert_eq!(resolve_weight(&net, "n2", "gen", "n1", "gen").unwrap(), 0.0);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};

use crate::error::{LinkError, LinkResult};
use crate::link::LinkKey;
use crate::network::NetContext;
use crate::partition::EdgeLookup;

/// What to report when a cross-partition edge does not exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingEdgePolicy {
    /// Fail with `MissingEdge` (default).
    #[default]
    Error,
    /// Report a weight of `0.0`. Inconsistent storage still fails.
    Zero,
}

/// Resolves link weights against live partition state.
///
/// Holds no state besides its policy; every call reads the network afresh.
#[derive(Clone, Debug, Default)]
pub struct WeightResolver {
    missing_edge_policy: MissingEdgePolicy,
}

impl WeightResolver {
    /// Creates a resolver with the strict default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the missing-edge policy.
    pub fn with_missing_edge_policy(mut self, policy: MissingEdgePolicy) -> Self {
        self.missing_edge_policy = policy;
        self
    }

    /// Returns the missing-edge policy.
    pub fn missing_edge_policy(&self) -> MissingEdgePolicy {
        self.missing_edge_policy
    }

    /// Resolves the weight of the edge named by `key`.
    pub fn resolve<C>(&self, net: &C, key: &LinkKey) -> LinkResult<f64>
    where
        C: NetContext + ?Sized,
    {
        self.resolve_weight(
            net,
            &key.source_node_uid,
            &key.source_gate_type,
            &key.target_node_uid,
            &key.target_slot_type,
        )
    }

    /// Resolves the weight of `source_node.source_gate -> target_node.target_slot`.
    pub fn resolve_weight<C>(
        &self,
        net: &C,
        source_node: &str,
        source_gate: &str,
        target_node: &str,
        target_slot: &str,
    ) -> LinkResult<f64>
    where
        C: NetContext + ?Sized,
    {
        match read_weight(net, source_node, source_gate, target_node, target_slot) {
            Err(err) if err.is_missing_edge() && self.missing_edge_policy == MissingEdgePolicy::Zero => {
                warn!(%err, "missing edge reported as zero weight");
                Ok(0.0)
            }
            result => result,
        }
    }
}

/// Resolves a weight with the strict default policy.
pub fn resolve_weight<C>(
    net: &C,
    source_node: &str,
    source_gate: &str,
    target_node: &str,
    target_slot: &str,
) -> LinkResult<f64>
where
    C: NetContext + ?Sized,
{
    read_weight(net, source_node, source_gate, target_node, target_slot)
}

fn read_weight<C>(
    net: &C,
    source_node: &str,
    source_gate: &str,
    target_node: &str,
    target_slot: &str,
) -> LinkResult<f64>
where
    C: NetContext + ?Sized,
{
    let source_partition_id = net.owning_partition(source_node)?;
    let target_partition_id = net.owning_partition(target_node)?;

    let gate_index = net.numerical_gate_index(net.node_type(source_node)?, source_gate)?;
    let slot_index = net.numerical_slot_index(net.node_type(target_node)?, target_slot)?;

    let source_partition = net.partition(source_partition_id)?;
    let target_partition = net.partition(target_partition_id)?;

    let target_element = target_partition.base_offset(target_node)? + slot_index;
    let source_element = source_partition.base_offset(source_node)? + gate_index;
    trace!(source_element, target_element, "resolved element offsets");

    if source_partition_id == target_partition_id {
        debug!(
            partition = %source_partition_id,
            row = target_element,
            col = source_element,
            sparse = source_partition.is_sparse(),
            "same-partition weight read"
        );
        let weight = source_partition.read(target_element, source_element)?;
        return Ok(f64::from(weight));
    }

    debug!(
        source_partition = %source_partition_id,
        target_partition = %target_partition_id,
        source_element,
        target_element,
        "cross-partition weight read"
    );

    let missing = || LinkError::MissingEdge {
        source_partition: source_partition_id.clone(),
        source_element,
        target_partition: target_partition_id.clone(),
        target_element,
    };
    let inconsistent = |detail: String| {
        error!(
            source_partition = %source_partition_id,
            target_partition = %target_partition_id,
            %detail,
            "inconsistent cross-partition edge list"
        );
        LinkError::InconsistentEdgeList {
            source_partition: source_partition_id.clone(),
            target_partition: target_partition_id.clone(),
            detail,
        }
    };

    let edges = target_partition
        .cross_partition_edges(source_partition_id)
        .ok_or_else(missing)?;

    if !edges.is_aligned() {
        return Err(inconsistent(format!(
            "sequence lengths differ: from={}, to={}, weights={}",
            edges.from.len(),
            edges.to.len(),
            edges.weights.len()
        )));
    }

    match edges.lookup(source_element, target_element) {
        EdgeLookup::Found { weight, .. } => Ok(f64::from(weight)),
        EdgeLookup::Missing => Err(missing()),
        EdgeLookup::Ambiguous { first, second } => Err(inconsistent(format!(
            "edge {} -> {} stored at positions {} and {}",
            source_element, target_element, first, second
        ))),
    }
}
