//! Per-partition node offset index.
//!
//! Maps a node identity to the base offset of its element range inside the
//! partition's matrix. Element `base + i` is gate/slot `i` of that node.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{ElementIndex, NodeUid};

/// Element range `[base, base + width)` owned by one node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRange {
    pub base: ElementIndex,
    pub width: usize,
}

impl ElementRange {
    /// One past the last element.
    pub fn end(&self) -> ElementIndex {
        self.base + self.width
    }

    /// Returns true if `element` falls inside this range.
    pub fn contains(&self, element: ElementIndex) -> bool {
        element >= self.base && element < self.end()
    }

    /// Returns true if the two ranges share an element.
    pub fn overlaps(&self, other: &ElementRange) -> bool {
        self.base < other.end() && other.base < self.end()
    }
}

/// Why an assignment was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssignError {
    /// The node already has a range in this index.
    AlreadyAssigned,
    /// The range would run past the matrix dimension.
    ExceedsCapacity { end: ElementIndex, capacity: usize },
    /// The range overlaps the range of another node.
    Overlaps(NodeUid),
}

/// Node identity to element range, for one partition.
#[derive(Clone, Debug, Default)]
pub struct NodeOffsetIndex {
    capacity: usize,
    ranges: HashMap<NodeUid, ElementRange>,
}

impl NodeOffsetIndex {
    /// Creates an empty index over `capacity` elements.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ranges: HashMap::new(),
        }
    }

    /// Base offset of `uid`, or `None` if the node is not in this partition.
    pub fn base_offset(&self, uid: &str) -> Option<ElementIndex> {
        self.ranges.get(uid).map(|r| r.base)
    }

    /// Full element range of `uid`.
    pub fn range(&self, uid: &str) -> Option<ElementRange> {
        self.ranges.get(uid).copied()
    }

    /// Assigns `uid` the range `[base, base + width)`.
    pub fn assign(
        &mut self,
        uid: impl Into<NodeUid>,
        base: ElementIndex,
        width: usize,
    ) -> Result<(), AssignError> {
        let uid = uid.into();
        if self.ranges.contains_key(&uid) {
            return Err(AssignError::AlreadyAssigned);
        }

        let range = ElementRange { base, width };
        if range.end() > self.capacity {
            return Err(AssignError::ExceedsCapacity {
                end: range.end(),
                capacity: self.capacity,
            });
        }
        if let Some((other, _)) = self.ranges.iter().find(|(_, r)| r.overlaps(&range)) {
            return Err(AssignError::Overlaps(other.clone()));
        }

        self.ranges.insert(uid, range);
        Ok(())
    }

    /// Removes `uid`, returning its former range.
    pub fn release(&mut self, uid: &str) -> Option<ElementRange> {
        self.ranges.remove(uid)
    }

    /// Maps an element back to its owning node and the gate/slot index
    /// within that node.
    pub fn owner_of(&self, element: ElementIndex) -> Option<(&NodeUid, usize)> {
        self.ranges
            .iter()
            .find(|(_, r)| r.contains(element))
            .map(|(uid, r)| (uid, element - r.base))
    }

    /// Number of elements the index covers.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of assigned nodes.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns true if no node is assigned.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Iterates over assigned node identities.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeUid> {
        self.ranges.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_offset() {
        let mut index = NodeOffsetIndex::new(8);
        index.assign("n1", 0, 2).unwrap();
        index.assign("n2", 2, 3).unwrap();

        assert_eq!(index.base_offset("n1"), Some(0));
        assert_eq!(index.base_offset("n2"), Some(2));
        assert_eq!(index.base_offset("n3"), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_overlap_rejected() {
        let mut index = NodeOffsetIndex::new(8);
        index.assign("n1", 2, 3).unwrap();

        assert_eq!(
            index.assign("n2", 4, 2),
            Err(AssignError::Overlaps("n1".to_string()))
        );
        assert_eq!(index.assign("n1", 6, 1), Err(AssignError::AlreadyAssigned));
        // Touching ranges do not overlap
        index.assign("n3", 5, 3).unwrap();
        index.assign("n4", 0, 2).unwrap();
    }

    #[test]
    fn test_capacity_enforced() {
        let mut index = NodeOffsetIndex::new(4);
        assert_eq!(
            index.assign("n1", 3, 2),
            Err(AssignError::ExceedsCapacity { end: 5, capacity: 4 })
        );
        assert!(index.is_empty());
    }

    #[test]
    fn test_owner_of() {
        let mut index = NodeOffsetIndex::new(8);
        index.assign("n1", 0, 2).unwrap();
        index.assign("n2", 4, 3).unwrap();

        assert_eq!(index.owner_of(1), Some((&"n1".to_string(), 1)));
        assert_eq!(index.owner_of(6), Some((&"n2".to_string(), 2)));
        assert_eq!(index.owner_of(3), None);
    }

    #[test]
    fn test_release() {
        let mut index = NodeOffsetIndex::new(4);
        index.assign("n1", 0, 4).unwrap();
        assert_eq!(index.release("n1"), Some(ElementRange { base: 0, width: 4 }));
        assert_eq!(index.base_offset("n1"), None);
        index.assign("n2", 0, 4).unwrap();
    }
}
