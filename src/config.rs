//! Configuration system for node nets.
//!
//! This module provides YAML/JSON support for describing a node net
//! declaratively: node types, partitions with their storage format, nodes at
//! explicit offsets, and link weights. Offsets are never chosen here; every
//! node states where it lives.
//!
//! # Configuration File Structure
//!
//! ```yaml
//! params:
//!   name: two-partition demo
//!   log_level: info
//!   missing_edge_policy: error
//!
//! nodetypes:
//!   - name: Unit
//!     gatetypes: [gate0, gate1, gate2]
//!     slottypes: [slot0, slot1, slot2]
//!
//! partitions:
//!   - id: A
//!     format: dense
//!     elements: 4
//!   - id: B
//!     format: sparse
//!     elements: 4
//!
//! nodes:
//!   - uid: n1
//!     type: Unit
//!     partition: A
//!     offset: 0
//!
//! links:
//!   - source: n1
//!     gate: gate1
//!     target: n2
//!     slot: slot2
//!     weight: 0.75
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::error::LinkError;
use crate::matrix::MatrixFormat;
use crate::network::Nodenet;
use crate::node::Node;
use crate::partition::Partition;
use crate::registry::{create_default_registry, Nodetype};
use crate::resolver::{MissingEdgePolicy, WeightResolver};
use crate::types::{ElementIndex, NodeUid, PartitionId, Weight};

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),

    #[error("Node net error: {0}")]
    Link(#[from] LinkError),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Global parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodenetParams {
    /// Node net name
    #[serde(default)]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// What a read of a non-existent cross-partition edge reports
    #[serde(default)]
    pub missing_edge_policy: MissingEdgePolicy,

    /// Register the standard node types before `nodetypes`
    #[serde(default = "default_true")]
    pub default_nodetypes: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for NodenetParams {
    fn default() -> Self {
        Self {
            name: String::new(),
            log_level: default_log_level(),
            missing_edge_policy: MissingEdgePolicy::default(),
            default_nodetypes: true,
        }
    }
}

/// Configuration for a single partition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// Unique partition identifier
    pub id: PartitionId,

    /// Matrix storage format
    #[serde(default)]
    pub format: MatrixFormat,

    /// Number of elements (matrix dimension)
    pub elements: usize,
}

/// Configuration for a node.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Unique node identifier
    pub uid: NodeUid,

    /// Node type name
    #[serde(rename = "type")]
    pub nodetype: String,

    /// Owning partition
    pub partition: PartitionId,

    /// Base offset of the node's elements
    pub offset: ElementIndex,

    /// Optional display name
    #[serde(default)]
    pub name: Option<String>,
}

/// Configuration for one link weight.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinkConfig {
    pub source: NodeUid,
    pub gate: String,
    pub target: NodeUid,
    pub slot: String,
    pub weight: Weight,
}

/// Complete node net configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NodenetConfig {
    /// Global parameters
    #[serde(default)]
    pub params: NodenetParams,

    /// Node type definitions
    #[serde(default)]
    pub nodetypes: Vec<Nodetype>,

    /// Partition definitions
    #[serde(default)]
    pub partitions: Vec<PartitionConfig>,

    /// Node definitions
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,

    /// Link weights
    #[serde(default)]
    pub links: Vec<LinkConfig>,
}

impl NodenetConfig {
    /// Creates a new empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: NodenetConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Loads configuration from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: NodenetConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file, auto-detecting format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            _ => Err(ConfigError::UnknownFormat(ext.to_string())),
        }
    }

    /// Validates identifiers and cross-references.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut nodetypes: HashSet<String> = if self.params.default_nodetypes {
            create_default_registry().type_names().cloned().collect()
        } else {
            HashSet::new()
        };
        for nt in &self.nodetypes {
            if nt.gatetypes.is_empty() && nt.slottypes.is_empty() {
                tracing::warn!("Node type {} has neither gates nor slots", nt.name);
            }
            nodetypes.insert(nt.name.clone());
        }

        let mut partition_ids = HashSet::new();
        for p in &self.partitions {
            if !partition_ids.insert(p.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Duplicate partition ID: {}",
                    p.id
                )));
            }
            if p.elements == 0 {
                tracing::warn!("Partition {} has no elements", p.id);
            }
        }

        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(node.uid.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Duplicate node ID: {}",
                    node.uid
                )));
            }
            if !partition_ids.contains(node.partition.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Node {} references non-existent partition: {}",
                    node.uid, node.partition
                )));
            }
            if !nodetypes.contains(&node.nodetype) {
                return Err(ConfigError::Validation(format!(
                    "Node {} references unknown node type: {}",
                    node.uid, node.nodetype
                )));
            }
        }

        for link in &self.links {
            for uid in [&link.source, &link.target] {
                if !node_ids.contains(uid.as_str()) {
                    return Err(ConfigError::Validation(format!(
                        "Link references non-existent node: {}",
                        uid
                    )));
                }
            }
        }

        Ok(())
    }

    /// Builds the node net described by this configuration.
    pub fn build(&self) -> ConfigResult<Nodenet> {
        let mut registry = if self.params.default_nodetypes {
            create_default_registry()
        } else {
            Default::default()
        };
        for nt in &self.nodetypes {
            registry.register(nt.clone());
        }

        let mut net = Nodenet::with_nodetypes(registry);
        for p in &self.partitions {
            net.add_partition(Partition::new(p.id.clone(), p.format, p.elements))?;
        }
        for n in &self.nodes {
            let mut node = Node::new(n.uid.clone(), n.nodetype.clone(), n.partition.clone());
            node.name = n.name.clone();
            net.add_node(node, n.offset)?;
        }
        for l in &self.links {
            net.set_weight(&l.source, &l.gate, &l.target, &l.slot, l.weight)?;
        }

        tracing::info!(
            name = %self.params.name,
            partitions = net.partition_count(),
            nodes = net.node_count(),
            links = self.links.len(),
            "node net built from configuration"
        );
        Ok(net)
    }

    /// Returns a resolver carrying the configured policy.
    pub fn resolver(&self) -> WeightResolver {
        WeightResolver::new().with_missing_edge_policy(self.params.missing_edge_policy)
    }

    /// Saves configuration to a YAML file.
    pub fn to_yaml_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Saves configuration to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Converts to YAML string.
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Converts to JSON string.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Finds a partition configuration by ID.
    pub fn find_partition(&self, id: &str) -> Option<&PartitionConfig> {
        self.partitions.iter().find(|p| p.id == id)
    }

    /// Finds a node configuration by uid.
    pub fn find_node(&self, uid: &str) -> Option<&NodeConfig> {
        self.nodes.iter().find(|n| n.uid == uid)
    }
}

/// Builder for creating NodenetConfig programmatically.
#[derive(Default)]
pub struct NodenetConfigBuilder {
    config: NodenetConfig,
}

impl NodenetConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the node net name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.params.name = name.into();
        self
    }

    /// Sets the log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.params.log_level = level.into();
        self
    }

    /// Sets the missing-edge policy.
    pub fn missing_edge_policy(mut self, policy: MissingEdgePolicy) -> Self {
        self.config.params.missing_edge_policy = policy;
        self
    }

    /// Adds a node type definition.
    pub fn add_nodetype(mut self, nodetype: Nodetype) -> Self {
        self.config.nodetypes.push(nodetype);
        self
    }

    /// Adds a dense partition.
    pub fn add_dense_partition(self, id: impl Into<PartitionId>, elements: usize) -> Self {
        self.add_partition(id, MatrixFormat::Dense, elements)
    }

    /// Adds a sparse partition.
    pub fn add_sparse_partition(self, id: impl Into<PartitionId>, elements: usize) -> Self {
        self.add_partition(id, MatrixFormat::Sparse, elements)
    }

    fn add_partition(mut self, id: impl Into<PartitionId>, format: MatrixFormat, elements: usize) -> Self {
        self.config.partitions.push(PartitionConfig {
            id: id.into(),
            format,
            elements,
        });
        self
    }

    /// Adds a node at an explicit offset.
    pub fn add_node(
        mut self,
        uid: impl Into<NodeUid>,
        nodetype: impl Into<String>,
        partition: impl Into<PartitionId>,
        offset: ElementIndex,
    ) -> Self {
        self.config.nodes.push(NodeConfig {
            uid: uid.into(),
            nodetype: nodetype.into(),
            partition: partition.into(),
            offset,
            name: None,
        });
        self
    }

    /// Adds a link weight.
    pub fn add_link(
        mut self,
        source: impl Into<NodeUid>,
        gate: impl Into<String>,
        target: impl Into<NodeUid>,
        slot: impl Into<String>,
        weight: Weight,
    ) -> Self {
        self.config.links.push(LinkConfig {
            source: source.into(),
            gate: gate.into(),
            target: target.into(),
            slot: slot.into(),
            weight,
        });
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> ConfigResult<NodenetConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
