//! Partitions: independently allocated weight regions.
//!
//! A partition owns the matrix for the nodes assigned to it, the offset
//! index that places those nodes inside the matrix, and, for every other
//! partition that feeds into it, an explicit list of cross-partition edges.
//! Cross-partition edges are always held by the *target* partition, keyed by
//! the source partition's id.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{LinkError, LinkResult};
use crate::matrix::{MatrixFormat, WeightMatrix, WeightStorage};
use crate::offsets::{AssignError, ElementRange, NodeOffsetIndex};
use crate::types::{ElementIndex, NodeUid, PartitionId, Weight};

/// Edges entering this partition from one other partition.
///
/// Three aligned sequences: entry `i` is the edge from source element
/// `from[i]` to target element `to[i]` with weight `weights[i]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossPartitionEdges {
    pub from: Vec<ElementIndex>,
    pub to: Vec<ElementIndex>,
    pub weights: Vec<Weight>,
}

/// Result of looking up one element pair in a [`CrossPartitionEdges`] list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EdgeLookup {
    /// Exactly one index holds this pair.
    Found { index: usize, weight: Weight },
    /// No index holds this pair.
    Missing,
    /// The pair is stored more than once.
    Ambiguous { first: usize, second: usize },
}

impl CrossPartitionEdges {
    /// Creates an empty edge list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from raw sequences without checking them.
    ///
    /// Use [`validate`](Self::validate) before trusting the result.
    pub fn from_raw(from: Vec<ElementIndex>, to: Vec<ElementIndex>, weights: Vec<Weight>) -> Self {
        Self { from, to, weights }
    }

    /// Appends an edge, rejecting a duplicate `(from, to)` pair.
    pub fn push(&mut self, from: ElementIndex, to: ElementIndex, weight: Weight) -> LinkResult<()> {
        if self.position(from, to).is_some() {
            return Err(LinkError::DuplicateEdge { from, to });
        }
        self.from.push(from);
        self.to.push(to);
        self.weights.push(weight);
        Ok(())
    }

    /// Overwrites the weight of an existing edge, or appends it.
    pub fn upsert(&mut self, from: ElementIndex, to: ElementIndex, weight: Weight) {
        match self.position(from, to) {
            Some(i) => self.weights[i] = weight,
            None => {
                self.from.push(from);
                self.to.push(to);
                self.weights.push(weight);
            }
        }
    }

    /// Index of the edge `from -> to`, if present.
    fn position(&self, from: ElementIndex, to: ElementIndex) -> Option<usize> {
        self.from
            .iter()
            .zip(&self.to)
            .position(|(&f, &t)| f == from && t == to)
    }

    /// Returns true if the three sequences have the same length.
    pub fn is_aligned(&self) -> bool {
        self.from.len() == self.to.len() && self.to.len() == self.weights.len()
    }

    /// Locates the edge `source_element -> target_element`.
    ///
    /// The `from` and `to` sequences are searched by value independently and
    /// the edge is the index both searches share. The caller must check
    /// [`is_aligned`](Self::is_aligned) first.
    pub fn lookup(&self, source_element: ElementIndex, target_element: ElementIndex) -> EdgeLookup {
        let from_hits = positions(&self.from, source_element);
        let to_hits = positions(&self.to, target_element);
        let mut common = from_hits.iter().filter(|i| to_hits.contains(i));

        match (common.next(), common.next()) {
            (None, _) => EdgeLookup::Missing,
            (Some(&index), None) => EdgeLookup::Found {
                index,
                weight: self.weights[index],
            },
            (Some(&first), Some(&second)) => EdgeLookup::Ambiguous { first, second },
        }
    }

    /// Checks the aligned-length and unique-pair invariants.
    pub fn validate(&self) -> Result<(), String> {
        if !self.is_aligned() {
            return Err(format!(
                "sequence lengths differ: from={}, to={}, weights={}",
                self.from.len(),
                self.to.len(),
                self.weights.len()
            ));
        }
        let mut seen = HashSet::new();
        for (f, t) in self.from.iter().zip(&self.to) {
            if !seen.insert((*f, *t)) {
                return Err(format!("duplicate edge {} -> {}", f, t));
            }
        }
        Ok(())
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Returns true if the list holds no edges.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Keeps only the edges for which `keep(from, to)` returns true.
    ///
    /// Lists with unequal sequence lengths are left untouched.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(ElementIndex, ElementIndex) -> bool,
    {
        if !self.is_aligned() {
            return;
        }
        let kept: Vec<_> = self.iter().filter(|&(f, t, _)| keep(f, t)).collect();
        self.from = kept.iter().map(|&(f, _, _)| f).collect();
        self.to = kept.iter().map(|&(_, t, _)| t).collect();
        self.weights = kept.iter().map(|&(_, _, w)| w).collect();
    }

    /// Iterates over `(from, to, weight)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (ElementIndex, ElementIndex, Weight)> + '_ {
        self.from
            .iter()
            .zip(&self.to)
            .zip(&self.weights)
            .map(|((&f, &t), &w)| (f, t, w))
    }
}

fn positions(values: &[ElementIndex], needle: ElementIndex) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v == needle)
        .map(|(i, _)| i)
        .collect()
}

/// One contiguous weight region and the nodes allocated in it.
#[derive(Clone, Debug)]
pub struct Partition {
    id: PartitionId,
    storage: WeightStorage,
    offsets: NodeOffsetIndex,
    inlinks: HashMap<PartitionId, CrossPartitionEdges>,
}

impl Partition {
    /// Creates an empty partition over `elements` elements.
    pub fn new(id: impl Into<PartitionId>, format: MatrixFormat, elements: usize) -> Self {
        Self {
            id: id.into(),
            storage: WeightStorage::new(format, elements),
            offsets: NodeOffsetIndex::new(elements),
            inlinks: HashMap::new(),
        }
    }

    /// Creates an empty dense partition.
    pub fn dense(id: impl Into<PartitionId>, elements: usize) -> Self {
        Self::new(id, MatrixFormat::Dense, elements)
    }

    /// Creates an empty sparse partition.
    pub fn sparse(id: impl Into<PartitionId>, elements: usize) -> Self {
        Self::new(id, MatrixFormat::Sparse, elements)
    }

    /// Partition identity.
    pub fn id(&self) -> &PartitionId {
        &self.id
    }

    /// Returns true if the matrix uses sparse storage.
    pub fn is_sparse(&self) -> bool {
        self.storage.format() == MatrixFormat::Sparse
    }

    /// Storage format of the matrix.
    pub fn format(&self) -> MatrixFormat {
        self.storage.format()
    }

    /// Number of elements (matrix dimension).
    pub fn elements(&self) -> usize {
        self.storage.as_matrix().dim()
    }

    /// Read access to the matrix, whichever format backs it.
    pub fn matrix(&self) -> &dyn WeightMatrix {
        self.storage.as_matrix()
    }

    /// Reads the in-partition weight at `(row, col)`.
    pub fn read(&self, row: ElementIndex, col: ElementIndex) -> LinkResult<Weight> {
        self.storage.as_matrix().read(row, col)
    }

    /// Writes the in-partition weight at `(row, col)`.
    pub fn write(&mut self, row: ElementIndex, col: ElementIndex, weight: Weight) -> LinkResult<()> {
        self.storage.as_matrix_mut().write(row, col, weight)
    }

    /// Base offset of a node assigned to this partition.
    pub fn base_offset(&self, uid: &str) -> LinkResult<ElementIndex> {
        self.offsets
            .base_offset(uid)
            .ok_or_else(|| LinkError::NodeNotInPartition {
                node: uid.to_string(),
                partition: self.id.clone(),
            })
    }

    /// The node offset index.
    pub fn offsets(&self) -> &NodeOffsetIndex {
        &self.offsets
    }

    /// Places a node at `[base, base + width)`.
    pub fn assign_node(&mut self, uid: impl Into<NodeUid>, base: ElementIndex, width: usize) -> LinkResult<()> {
        let uid = uid.into();
        self.offsets
            .assign(uid.clone(), base, width)
            .map_err(|e| LinkError::OffsetConflict {
                partition: self.id.clone(),
                detail: match e {
                    AssignError::AlreadyAssigned => format!("{} already assigned", uid),
                    AssignError::ExceedsCapacity { end, capacity } => format!(
                        "{} would end at element {} but partition holds {}",
                        uid, end, capacity
                    ),
                    AssignError::Overlaps(other) => {
                        format!("{} at {}..{} overlaps {}", uid, base, base + width, other)
                    }
                },
            })
    }

    /// Removes a node from the offset index and clears its elements.
    ///
    /// Matrix rows and columns of the freed elements are zeroed and edges
    /// entering those elements from other partitions are dropped, so a node
    /// later placed on the same range starts without weights.
    pub fn release_node(&mut self, uid: &str) -> Option<ElementRange> {
        let range = self.offsets.release(uid)?;
        let matrix = self.storage.as_matrix_mut();
        for element in range.base..range.end() {
            matrix.clear_element(element);
        }
        for edges in self.inlinks.values_mut() {
            edges.retain(|_, to| !range.contains(to));
        }
        Some(range)
    }

    /// Drops edges leaving `range` of partition `source`.
    pub fn prune_inlinks_from(&mut self, source: &str, range: ElementRange) {
        if let Some(edges) = self.inlinks.get_mut(source) {
            edges.retain(|from, _| !range.contains(from));
        }
    }

    /// Edges entering this partition from `source`.
    pub fn cross_partition_edges(&self, source: &str) -> Option<&CrossPartitionEdges> {
        self.inlinks.get(source)
    }

    /// Mutable edge list for `source`, created empty on first use.
    pub fn cross_partition_edges_mut(&mut self, source: impl Into<PartitionId>) -> &mut CrossPartitionEdges {
        self.inlinks.entry(source.into()).or_default()
    }

    /// Replaces the whole edge list for `source`.
    pub fn set_cross_partition_edges(&mut self, source: impl Into<PartitionId>, edges: CrossPartitionEdges) {
        self.inlinks.insert(source.into(), edges);
    }

    /// Iterates over `(source partition, edges)` pairs.
    pub fn inlinks(&self) -> impl Iterator<Item = (&PartitionId, &CrossPartitionEdges)> {
        self.inlinks.iter()
    }

    /// Returns a copy of this partition with its matrix in `format`.
    pub fn with_format(&self, format: MatrixFormat) -> Self {
        Self {
            storage: self.storage.converted(format),
            ..self.clone()
        }
    }

    /// Checks every cross-partition list for aligned, duplicate-free storage.
    pub fn validate(&self) -> LinkResult<()> {
        for (source, edges) in &self.inlinks {
            edges
                .validate()
                .map_err(|detail| LinkError::InconsistentEdgeList {
                    source_partition: source.clone(),
                    target_partition: self.id.clone(),
                    detail,
                })?;
        }
        Ok(())
    }
}
