//! Storage statistics and export for a node net.
//!
//! Summarizes how weights are laid out across partitions, with JSON and
//! CSV export for inspection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use crate::matrix::MatrixFormat;
use crate::network::Nodenet;
use crate::types::PartitionId;

/// Statistics for a whole node net.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NetworkStats {
    /// Number of partitions
    pub partition_count: usize,
    /// Number of nodes
    pub node_count: usize,
    /// Partitions using dense storage
    pub dense_partitions: usize,
    /// Partitions using sparse storage
    pub sparse_partitions: usize,
    /// Non-zero in-partition matrix entries
    pub matrix_entries: usize,
    /// Entries across all cross-partition edge lists
    pub cross_partition_edges: usize,
    /// Per-partition statistics, ordered by id
    pub partitions: BTreeMap<PartitionId, PartitionStats>,
}

/// Statistics for a single partition.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PartitionStats {
    /// Storage format ("dense" or "sparse")
    pub format: String,
    /// Matrix dimension
    pub elements: usize,
    /// Nodes assigned
    pub node_count: usize,
    /// Non-zero matrix entries
    pub matrix_entries: usize,
    /// Source partitions with an edge list into this one
    pub inlink_sources: usize,
    /// Edges entering from other partitions
    pub inlink_edges: usize,
}

impl NetworkStats {
    /// Collects statistics from a node net.
    pub fn collect(net: &Nodenet) -> Self {
        let mut stats = NetworkStats {
            partition_count: net.partition_count(),
            node_count: net.node_count(),
            ..Default::default()
        };

        for partition in net.partitions() {
            let entries = partition.matrix().entries().len();
            let (sources, edges) = partition
                .inlinks()
                .fold((0, 0), |(s, e), (_, list)| (s + 1, e + list.len()));

            match partition.format() {
                MatrixFormat::Dense => stats.dense_partitions += 1,
                MatrixFormat::Sparse => stats.sparse_partitions += 1,
            }
            stats.matrix_entries += entries;
            stats.cross_partition_edges += edges;

            stats.partitions.insert(
                partition.id().clone(),
                PartitionStats {
                    format: if partition.is_sparse() { "sparse" } else { "dense" }.to_string(),
                    elements: partition.elements(),
                    node_count: partition.offsets().len(),
                    matrix_entries: entries,
                    inlink_sources: sources,
                    inlink_edges: edges,
                },
            );
        }

        stats
    }

    /// Exports statistics to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Exports statistics to JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = self.to_json().map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e)
        })?;
        std::fs::write(path, json)
    }

    /// Exports per-partition statistics to CSV.
    pub fn partitions_to_csv(&self) -> String {
        let mut csv = String::new();

        csv.push_str("partition_id,format,elements,node_count,matrix_entries,inlink_sources,inlink_edges\n");

        for (id, p) in &self.partitions {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                id, p.format, p.elements, p.node_count, p.matrix_entries, p.inlink_sources, p.inlink_edges,
            ));
        }

        csv
    }

    /// Exports per-partition statistics to CSV file.
    pub fn partitions_to_csv_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        std::fs::write(path, self.partitions_to_csv())
    }

    /// Writes a human-readable summary to a writer.
    pub fn write_summary<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        writeln!(w, "=== Node Net Storage ===")?;
        writeln!(w, "Partitions: {} ({} dense, {} sparse)", self.partition_count, self.dense_partitions, self.sparse_partitions)?;
        writeln!(w, "Nodes: {}", self.node_count)?;
        writeln!(w, "Matrix entries: {}", self.matrix_entries)?;
        writeln!(w, "Cross-partition edges: {}", self.cross_partition_edges)?;
        Ok(())
    }
}
