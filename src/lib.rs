//! # Nodenet link-weight store
//!
//! Addressing and weight retrieval for directed, weighted links in a
//! partitioned spreading-activation node net.
//!
//! ## Design Principles
//!
//! - **Stable link identity**: a link is named by
//!   `source_node:source_gate:target_node:target_slot`, independent of where
//!   its weight is physically stored.
//! - **Partitions**: nodes are spread over independently allocated
//!   partitions. Each partition stores in-partition weights in a dense or a
//!   sparse square matrix, and edges arriving from other partitions in
//!   explicit `(from, to, weight)` lists keyed by the source partition.
//! - **Target-major addressing**: a weight lives at row
//!   `base(target) + slot index`, column `base(source) + gate index`, in
//!   every storage form.
//! - **Live views**: [`Link`] handles borrow the network and recompute every
//!   attribute on access; nothing is cached.
//!
//! ## Features
//!
//! - `parallel` - Resolve batches of links on the rayon thread pool
//!
//! ## Quick Start
//!
//! ```rust
//! use nodenet::{Node, Nodenet, Partition};
//! use nodenet::registry::create_default_registry;
//!
//! let mut net = Nodenet::with_nodetypes(create_default_registry());
//! net.add_partition(Partition::dense("001", 8)).unwrap();
//! net.add_partition(Partition::sparse("002", 8)).unwrap();
//! net.add_node(Node::new("sensor", "Sensor", "001"), 0).unwrap();
//! net.add_node(Node::new("reg", "Register", "002"), 4).unwrap();
//! net.set_weight("sensor", "gen", "reg", "gen", 0.8).unwrap();
//!
//! let link = net.link("sensor", "gen", "reg", "gen");
//! assert_eq!(link.identity(), "sensor:gen:reg:gen");
//! assert!((link.weight().unwrap() - 0.8).abs() < 1e-6);
//!
//! let data = link.snapshot().unwrap();
//! println!("{}", data.to_json().unwrap());
//! ```
//!
//! ## Configuration-Driven Setup
//!
//! ```rust,ignore
//! use nodenet::config::NodenetConfig;
//!
//! let config = NodenetConfig::from_yaml_file("nodenet.yaml")?;
//! let net = config.build()?;
//! let resolver = config.resolver();
//! ```

pub mod types;
pub mod error;
pub mod matrix;
pub mod offsets;
pub mod partition;
pub mod registry;
pub mod node;
pub mod network;
pub mod resolver;
pub mod link;
pub mod config;
pub mod stats;
pub mod parallel;

// Re-export commonly used types
pub use types::{ElementIndex, NodeUid, PartitionId, SymbolicType, Weight};
pub use error::{ErrorKind, LinkError, LinkResult};
pub use matrix::{DenseMatrix, MatrixFormat, SparseMatrix, WeightMatrix, WeightStorage};
pub use offsets::NodeOffsetIndex;
pub use partition::{CrossPartitionEdges, Partition};
pub use registry::{create_default_registry, Nodetype, NodetypeRegistry, TypeRegistry};
pub use node::{Gate, Node, NodeRegistry, Slot};
pub use network::{NetContext, Nodenet, PartitionLookup};
pub use resolver::{resolve_weight, MissingEdgePolicy, WeightResolver};
pub use link::{Link, LinkData, LinkKey, LINK_CERTAINTY};
pub use config::{ConfigError, NodenetConfig, NodenetConfigBuilder};
pub use stats::NetworkStats;
pub use parallel::SharedNodenet;

/// Initialize the tracing subscriber for logging.
///
/// Call this at the start of your program to enable logging.
///
/// # Example
///
/// ```rust,ignore
/// nodenet::init_logging("info");
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
