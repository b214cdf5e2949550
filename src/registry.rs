//! Node type registry.
//!
//! Resolves a symbolic gate or slot type to its numerical index, scoped to
//! a node type. The numerical index is the element offset of that gate/slot
//! relative to the node's base offset.
//!
//! # Example
//!
//! ```
//! use nodenet::registry::{Nodetype, NodetypeRegistry, TypeRegistry};
//!
//! let mut registry = NodetypeRegistry::new();
//! registry.register(Nodetype::new("Pipe")
//!     .with_gatetypes(["gen", "por", "ret"])
//!     .with_slottypes(["gen", "por", "ret"]));
//!
//! assert_eq!(registry.numerical_gate_index("Pipe", "por").unwrap(), 1);
//! assert!(registry.numerical_slot_index("Pipe", "sub").is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{LinkError, LinkResult};

/// Resolution of symbolic gate/slot types to numerical indices.
pub trait TypeRegistry {
    /// Numerical index of gate `symbol` on nodes of type `nodetype`.
    fn numerical_gate_index(&self, nodetype: &str, symbol: &str) -> LinkResult<usize>;

    /// Numerical index of slot `symbol` on nodes of type `nodetype`.
    fn numerical_slot_index(&self, nodetype: &str, symbol: &str) -> LinkResult<usize>;

    /// Symbolic gate type at `index`, the inverse of `numerical_gate_index`.
    fn gate_name(&self, nodetype: &str, index: usize) -> Option<&str>;

    /// Symbolic slot type at `index`, the inverse of `numerical_slot_index`.
    fn slot_name(&self, nodetype: &str, index: usize) -> Option<&str>;
}

/// Definition of one node type: its gates and slots, in index order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nodetype {
    pub name: String,
    #[serde(default)]
    pub gatetypes: Vec<String>,
    #[serde(default)]
    pub slottypes: Vec<String>,
}

impl Nodetype {
    /// Creates a node type without gates or slots.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gatetypes: Vec::new(),
            slottypes: Vec::new(),
        }
    }

    /// Sets the gate types.
    pub fn with_gatetypes<I, S>(mut self, gates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.gatetypes = gates.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the slot types.
    pub fn with_slottypes<I, S>(mut self, slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.slottypes = slots.into_iter().map(Into::into).collect();
        self
    }

    /// Elements one node of this type occupies in a partition.
    ///
    /// Gates and slots share the node's element range, so the width is the
    /// larger of the two counts.
    pub fn element_width(&self) -> usize {
        self.gatetypes.len().max(self.slottypes.len())
    }

    pub fn gate_index(&self, symbol: &str) -> Option<usize> {
        self.gatetypes.iter().position(|g| g == symbol)
    }

    pub fn slot_index(&self, symbol: &str) -> Option<usize> {
        self.slottypes.iter().position(|s| s == symbol)
    }
}

/// In-memory registry of node types, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct NodetypeRegistry {
    types: HashMap<String, Nodetype>,
}

impl NodetypeRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node type, replacing any previous one with the same name.
    pub fn register(&mut self, nodetype: Nodetype) {
        self.types.insert(nodetype.name.clone(), nodetype);
    }

    /// Looks up a node type by name.
    pub fn get(&self, name: &str) -> LinkResult<&Nodetype> {
        self.types
            .get(name)
            .ok_or_else(|| LinkError::UnknownNodetype(name.to_string()))
    }

    /// Returns true if a type is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Returns the number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns an iterator over registered type names.
    pub fn type_names(&self) -> impl Iterator<Item = &String> {
        self.types.keys()
    }

    /// Unregisters a node type.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.types.remove(name).is_some()
    }
}

impl TypeRegistry for NodetypeRegistry {
    fn numerical_gate_index(&self, nodetype: &str, symbol: &str) -> LinkResult<usize> {
        self.get(nodetype)?
            .gate_index(symbol)
            .ok_or_else(|| LinkError::UnresolvedGate {
                nodetype: nodetype.to_string(),
                gate: symbol.to_string(),
            })
    }

    fn numerical_slot_index(&self, nodetype: &str, symbol: &str) -> LinkResult<usize> {
        self.get(nodetype)?
            .slot_index(symbol)
            .ok_or_else(|| LinkError::UnresolvedSlot {
                nodetype: nodetype.to_string(),
                slot: symbol.to_string(),
            })
    }

    fn gate_name(&self, nodetype: &str, index: usize) -> Option<&str> {
        self.types
            .get(nodetype)
            .and_then(|t| t.gatetypes.get(index))
            .map(String::as_str)
    }

    fn slot_name(&self, nodetype: &str, index: usize) -> Option<&str> {
        self.types
            .get(nodetype)
            .and_then(|t| t.slottypes.get(index))
            .map(String::as_str)
    }
}

/// Gate and slot types of a pipe node, in index order.
pub const PIPE_GATES: [&str; 7] = ["gen", "por", "ret", "sub", "sur", "cat", "exp"];

/// Creates a registry with the standard node types.
///
/// Includes:
/// - `Register` - one `gen` gate, one `gen` slot
/// - `Sensor` - one `gen` gate, no slots
/// - `Actuator` - one `gen` gate, one `gen` slot
/// - `Activator` - one `gen` slot
/// - `Pipe` - gates and slots `gen por ret sub sur cat exp`
pub fn create_default_registry() -> NodetypeRegistry {
    let mut registry = NodetypeRegistry::new();

    registry.register(
        Nodetype::new("Register")
            .with_gatetypes(["gen"])
            .with_slottypes(["gen"]),
    );
    registry.register(Nodetype::new("Sensor").with_gatetypes(["gen"]));
    registry.register(
        Nodetype::new("Actuator")
            .with_gatetypes(["gen"])
            .with_slottypes(["gen"]),
    );
    registry.register(Nodetype::new("Activator").with_slottypes(["gen"]));
    registry.register(
        Nodetype::new("Pipe")
            .with_gatetypes(PIPE_GATES)
            .with_slottypes(PIPE_GATES),
    );

    registry
}
