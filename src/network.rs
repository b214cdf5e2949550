//! The node net: partitions, nodes and node types in one context.
//!
//! The resolver and link handles are written against [`NetContext`], the
//! union of the node registry, type registry and partition lookups. A
//! [`Nodenet`] is the in-memory implementation of that context.

use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::{LinkError, LinkResult};
use crate::link::{Link, LinkKey};
use crate::node::{Gate, Node, NodeRegistry, Slot};
use crate::partition::Partition;
use crate::registry::{NodetypeRegistry, TypeRegistry};
use crate::types::{ElementIndex, NodeUid, PartitionId, Weight};

/// Lookup of partitions by id.
pub trait PartitionLookup {
    fn partition(&self, id: &str) -> LinkResult<&Partition>;
}

/// Everything weight resolution needs to know about a network.
pub trait NetContext: NodeRegistry + TypeRegistry + PartitionLookup {}

impl<T: NodeRegistry + TypeRegistry + PartitionLookup + ?Sized> NetContext for T {}

/// A partitioned node net.
///
/// Structural mutation (`add_*`, `remove_node`, `set_weight`) takes `&mut
/// self`; reads take `&self`. Holding a shared borrow for the duration of a
/// batch of reads is what keeps them consistent.
#[derive(Clone, Debug, Default)]
pub struct Nodenet {
    /// Partitions indexed by their id
    partitions: HashMap<PartitionId, Partition>,
    /// Node records indexed by uid
    nodes: HashMap<NodeUid, Node>,
    /// Node type definitions
    nodetypes: NodetypeRegistry,
}

impl Nodenet {
    /// Creates an empty net with no node types.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty net using the given node types.
    pub fn with_nodetypes(nodetypes: NodetypeRegistry) -> Self {
        Self {
            nodetypes,
            ..Self::default()
        }
    }

    /// The node type registry.
    pub fn nodetypes(&self) -> &NodetypeRegistry {
        &self.nodetypes
    }

    /// Mutable access to the node type registry.
    pub fn nodetypes_mut(&mut self) -> &mut NodetypeRegistry {
        &mut self.nodetypes
    }

    /// Adds a partition.
    pub fn add_partition(&mut self, partition: Partition) -> LinkResult<()> {
        if self.partitions.contains_key(partition.id()) {
            return Err(LinkError::DuplicatePartition(partition.id().clone()));
        }
        debug!(
            partition = %partition.id(),
            elements = partition.elements(),
            sparse = partition.is_sparse(),
            "partition added"
        );
        self.partitions.insert(partition.id().clone(), partition);
        Ok(())
    }

    /// Adds a node, placing its element range at `base_offset` in its partition.
    ///
    /// The range width is the node type's element width.
    pub fn add_node(&mut self, node: Node, base_offset: ElementIndex) -> LinkResult<()> {
        if self.nodes.contains_key(&node.uid) {
            return Err(LinkError::DuplicateNode(node.uid.clone()));
        }
        let width = self.nodetypes.get(&node.nodetype)?.element_width();
        let partition = self
            .partitions
            .get_mut(&node.partition)
            .ok_or_else(|| LinkError::PartitionNotFound(node.partition.clone()))?;
        partition.assign_node(node.uid.clone(), base_offset, width)?;

        debug!(node = %node.uid, partition = %node.partition, base_offset, width, "node added");
        self.nodes.insert(node.uid.clone(), node);
        Ok(())
    }

    /// Removes a node and frees its element range.
    ///
    /// Every weight touching its elements goes with it: matrix rows and
    /// columns in its own partition and cross-partition edges in either
    /// direction.
    pub fn remove_node(&mut self, uid: &str) -> Option<Node> {
        let node = self.nodes.remove(uid)?;
        let range = self
            .partitions
            .get_mut(&node.partition)
            .and_then(|partition| partition.release_node(uid));

        if let Some(range) = range {
            for partition in self.partitions.values_mut() {
                partition.prune_inlinks_from(&node.partition, range);
            }
            debug!(node = %uid, partition = %node.partition, base_offset = range.base, "node removed");
        }
        Some(node)
    }

    /// Returns a partition by id.
    pub fn get_partition(&self, id: &str) -> Option<&Partition> {
        self.partitions.get(id)
    }

    /// Returns a mutable partition by id.
    pub fn get_partition_mut(&mut self, id: &str) -> Option<&mut Partition> {
        self.partitions.get_mut(id)
    }

    /// Returns a node record by uid.
    pub fn get_node(&self, uid: &str) -> Option<&Node> {
        self.nodes.get(uid)
    }

    /// Iterates over all partitions.
    pub fn partitions(&self) -> impl Iterator<Item = &Partition> {
        self.partitions.values()
    }

    /// Iterates over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Stores the weight of `source.gate -> target.slot`.
    ///
    /// Same-partition weights go into the partition matrix; otherwise the
    /// edge is written into the target partition's list for the source
    /// partition.
    pub fn set_weight(
        &mut self,
        source_node: &str,
        source_gate: &str,
        target_node: &str,
        target_slot: &str,
        weight: Weight,
    ) -> LinkResult<()> {
        let source = self.gate(source_node, source_gate)?;
        let target = self.slot(target_node, target_slot)?;
        let source_partition = self.owning_partition(source_node)?.clone();
        let target_partition = self.owning_partition(target_node)?.clone();

        let partition = self
            .partitions
            .get_mut(&target_partition)
            .ok_or_else(|| LinkError::PartitionNotFound(target_partition.clone()))?;

        if source_partition == target_partition {
            partition.write(target.element, source.element, weight)
        } else {
            partition
                .cross_partition_edges_mut(source_partition)
                .upsert(source.element, target.element, weight);
            Ok(())
        }
    }

    /// Returns a link handle over this net.
    pub fn link(
        &self,
        source_node: &str,
        source_gate: &str,
        target_node: &str,
        target_slot: &str,
    ) -> Link<'_, Self> {
        Link::new(
            self,
            LinkKey::new(source_node, source_gate, target_node, target_slot),
        )
    }

    /// Keys of all stored edges leaving `uid`, sorted by identity.
    pub fn outgoing_links(&self, uid: &str) -> LinkResult<Vec<LinkKey>> {
        let node = self.node(uid)?;
        let nodetype = self.nodetypes.get(&node.nodetype)?;
        let home = self.partition(&node.partition)?;
        let base = home.base_offset(uid)?;
        let gates = base..base + nodetype.gatetypes.len();

        let mut keys = Vec::new();
        for (row, col, _) in home.matrix().entries() {
            if gates.contains(&col) {
                if let Some(key) = self.key_for(home, uid, col - base, row) {
                    keys.push(key);
                }
            }
        }
        for partition in self.partitions.values() {
            if let Some(edges) = partition.cross_partition_edges(&node.partition) {
                for (from, to, _) in edges.iter() {
                    if gates.contains(&from) {
                        if let Some(key) = self.key_for(partition, uid, from - base, to) {
                            keys.push(key);
                        }
                    }
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Keys of all stored edges entering `uid`, sorted by identity.
    pub fn incoming_links(&self, uid: &str) -> LinkResult<Vec<LinkKey>> {
        let node = self.node(uid)?;
        let nodetype = self.nodetypes.get(&node.nodetype)?;
        let home = self.partition(&node.partition)?;
        let base = home.base_offset(uid)?;
        let slots = base..base + nodetype.slottypes.len();

        let mut keys = Vec::new();
        for (row, col, _) in home.matrix().entries() {
            if slots.contains(&row) {
                if let Some(key) = self.key_from(home, col, uid, row - base) {
                    keys.push(key);
                }
            }
        }
        for (source_id, edges) in home.inlinks() {
            let Some(source) = self.partitions.get(source_id) else {
                debug!(partition = %source_id, "edge list for unknown source partition");
                continue;
            };
            for (from, to, _) in edges.iter() {
                if slots.contains(&to) {
                    if let Some(key) = self.key_from(source, from, uid, to - base) {
                        keys.push(key);
                    }
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Key for an edge from gate `gate_index` of `source` to `target_element`
    /// of `partition`.
    fn key_for(
        &self,
        partition: &Partition,
        source: &str,
        gate_index: usize,
        target_element: ElementIndex,
    ) -> Option<LinkKey> {
        let (target, slot_index) = partition.offsets().owner_of(target_element)?;
        let gate = self.gate_name(self.node_type(source).ok()?, gate_index)?;
        let slot = self.slot_name(self.node_type(target).ok()?, slot_index)?;
        Some(LinkKey::new(source, gate, target.as_str(), slot))
    }

    /// Key for an edge from `source_element` of `partition` to slot
    /// `slot_index` of `target`.
    fn key_from(
        &self,
        partition: &Partition,
        source_element: ElementIndex,
        target: &str,
        slot_index: usize,
    ) -> Option<LinkKey> {
        let (source, gate_index) = partition.offsets().owner_of(source_element)?;
        let gate = self.gate_name(self.node_type(source).ok()?, gate_index)?;
        let slot = self.slot_name(self.node_type(target).ok()?, slot_index)?;
        Some(LinkKey::new(source.as_str(), gate, target, slot))
    }

    /// Checks every partition's cross-partition storage.
    pub fn validate(&self) -> LinkResult<()> {
        for partition in self.partitions.values() {
            partition.validate()?;
        }
        info!(
            partitions = self.partitions.len(),
            nodes = self.nodes.len(),
            "node net validated"
        );
        Ok(())
    }
}

impl NodeRegistry for Nodenet {
    fn node(&self, uid: &str) -> LinkResult<&Node> {
        self.nodes
            .get(uid)
            .ok_or_else(|| LinkError::NodeNotFound(uid.to_string()))
    }

    fn gate(&self, uid: &str, symbol: &str) -> LinkResult<Gate> {
        let node = self.node(uid)?;
        let index = self.numerical_gate_index(&node.nodetype, symbol)?;
        let base = self.partition(&node.partition)?.base_offset(uid)?;
        Ok(Gate {
            node_uid: node.uid.clone(),
            gate_type: symbol.to_string(),
            index,
            element: base + index,
        })
    }

    fn slot(&self, uid: &str, symbol: &str) -> LinkResult<Slot> {
        let node = self.node(uid)?;
        let index = self.numerical_slot_index(&node.nodetype, symbol)?;
        let base = self.partition(&node.partition)?.base_offset(uid)?;
        Ok(Slot {
            node_uid: node.uid.clone(),
            slot_type: symbol.to_string(),
            index,
            element: base + index,
        })
    }
}

impl TypeRegistry for Nodenet {
    fn numerical_gate_index(&self, nodetype: &str, symbol: &str) -> LinkResult<usize> {
        self.nodetypes.numerical_gate_index(nodetype, symbol)
    }

    fn numerical_slot_index(&self, nodetype: &str, symbol: &str) -> LinkResult<usize> {
        self.nodetypes.numerical_slot_index(nodetype, symbol)
    }

    fn gate_name(&self, nodetype: &str, index: usize) -> Option<&str> {
        self.nodetypes.gate_name(nodetype, index)
    }

    fn slot_name(&self, nodetype: &str, index: usize) -> Option<&str> {
        self.nodetypes.slot_name(nodetype, index)
    }
}

impl PartitionLookup for Nodenet {
    fn partition(&self, id: &str) -> LinkResult<&Partition> {
        self.partitions
            .get(id)
            .ok_or_else(|| LinkError::PartitionNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::create_default_registry;

    fn net() -> Nodenet {
        let mut net = Nodenet::with_nodetypes(create_default_registry());
        net.add_partition(Partition::dense("001", 16)).unwrap();
        net.add_partition(Partition::sparse("002", 16)).unwrap();
        net.add_node(Node::new("p1", "Pipe", "001"), 0).unwrap();
        net.add_node(Node::new("r1", "Register", "001"), 7).unwrap();
        net.add_node(Node::new("p2", "Pipe", "002"), 2).unwrap();
        net
    }

    #[test]
    fn test_add_node_checks() {
        let mut net = net();
        assert_eq!(
            net.add_node(Node::new("p1", "Pipe", "001"), 9),
            Err(LinkError::DuplicateNode("p1".into()))
        );
        assert_eq!(
            net.add_node(Node::new("x", "Script", "001"), 9),
            Err(LinkError::UnknownNodetype("Script".into()))
        );
        assert_eq!(
            net.add_node(Node::new("x", "Register", "999"), 9),
            Err(LinkError::PartitionNotFound("999".into()))
        );
        assert!(matches!(
            net.add_node(Node::new("x", "Pipe", "001"), 5),
            Err(LinkError::OffsetConflict { .. })
        ));
        assert_eq!(net.node_count(), 3);
        assert_eq!(
            net.add_partition(Partition::dense("001", 4)),
            Err(LinkError::DuplicatePartition("001".into()))
        );
    }

    #[test]
    fn test_gate_and_slot_elements() {
        let net = net();
        let gate = net.gate("p2", "sub").unwrap();
        assert_eq!(gate.index, 3);
        assert_eq!(gate.element, 5);

        let slot = net.slot("r1", "gen").unwrap();
        assert_eq!(slot.element, 7);
        assert!(net.slot("r1", "por").is_err());
    }

    #[test]
    fn test_set_weight_same_and_cross() {
        let mut net = net();
        net.set_weight("p1", "por", "r1", "gen", 0.5).unwrap();
        net.set_weight("p1", "sub", "p2", "sur", -0.25).unwrap();

        assert_eq!(net.get_partition("001").unwrap().read(7, 1).unwrap(), 0.5);
        let edges = net
            .get_partition("002")
            .unwrap()
            .cross_partition_edges("001")
            .unwrap();
        assert_eq!(edges.from, vec![3]);
        assert_eq!(edges.to, vec![6]);
        assert_eq!(edges.weights, vec![-0.25]);

        net.set_weight("p1", "sub", "p2", "sur", 0.5).unwrap();
        assert_eq!(
            net.get_partition("002")
                .unwrap()
                .cross_partition_edges("001")
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_link_enumeration() {
        let mut net = net();
        net.set_weight("p1", "por", "r1", "gen", 0.5).unwrap();
        net.set_weight("p1", "sub", "p2", "sur", -0.25).unwrap();
        net.set_weight("p2", "gen", "p1", "gen", 1.0).unwrap();

        let out = net.outgoing_links("p1").unwrap();
        assert_eq!(
            out,
            vec![
                LinkKey::new("p1", "por", "r1", "gen"),
                LinkKey::new("p1", "sub", "p2", "sur"),
            ]
        );

        let incoming = net.incoming_links("p1").unwrap();
        assert_eq!(incoming, vec![LinkKey::new("p2", "gen", "p1", "gen")]);

        let into_p2 = net.incoming_links("p2").unwrap();
        assert_eq!(into_p2, vec![LinkKey::new("p1", "sub", "p2", "sur")]);
    }

    #[test]
    fn test_remove_node() {
        let mut net = net();
        let removed = net.remove_node("r1").unwrap();
        assert_eq!(removed.uid, "r1");
        assert!(net.get_node("r1").is_none());
        assert_eq!(
            net.get_partition("001").unwrap().offsets().base_offset("r1"),
            None
        );
        assert!(net.remove_node("r1").is_none());
        // The freed range can be reused
        net.add_node(Node::new("r2", "Register", "001"), 7).unwrap();
    }

    #[test]
    fn test_removed_node_leaves_no_weights() {
        let mut net = net();
        net.set_weight("p1", "por", "r1", "gen", 0.5).unwrap();
        net.set_weight("r1", "gen", "p1", "gen", 0.25).unwrap();
        net.set_weight("r1", "gen", "p2", "sub", -1.0).unwrap();
        net.set_weight("p2", "por", "r1", "gen", 0.75).unwrap();

        net.remove_node("r1").unwrap();
        net.add_node(Node::new("r2", "Register", "001"), 7).unwrap();

        let partition = net.get_partition("001").unwrap();
        assert!(partition.matrix().entries().is_empty());
        assert!(partition.cross_partition_edges("002").unwrap().is_empty());
        assert!(net
            .get_partition("002")
            .unwrap()
            .cross_partition_edges("001")
            .unwrap()
            .is_empty());
        assert!(net.outgoing_links("r2").unwrap().is_empty());
        assert!(net.incoming_links("r2").unwrap().is_empty());
    }
}
