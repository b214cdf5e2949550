//! Integration tests for weight resolution across partitions.
//!
//! These tests verify:
//! - Cross-partition reads through the target partition's edge lists
//! - Same-partition reads in dense and sparse storage
//! - Target-major / source-minor addressing
//! - Failure modes: missing edges, inconsistent edge lists, vanished nodes

use nodenet::{
    resolve_weight, CrossPartitionEdges, ErrorKind, LinkError, MatrixFormat, Node, Nodenet,
    Nodetype, NodetypeRegistry, Partition,
};

// ============================================================================
// Fixtures
// ============================================================================

/// A node type whose gate/slot names match their numerical index.
fn unit_types() -> NodetypeRegistry {
    let mut registry = NodetypeRegistry::new();
    registry.register(
        Nodetype::new("Unit")
            .with_gatetypes(["gate0", "gate1", "gate2"])
            .with_slottypes(["slot0", "slot1", "slot2"]),
    );
    registry.register(
        Nodetype::new("Single")
            .with_gatetypes(["gen"])
            .with_slottypes(["gen"]),
    );
    registry
}

/// Partition A (dense, 4 elements) holding n1, partition B (sparse,
/// 4 elements) holding n2, and one edge n1.gate1 -> n2.slot2 stored in B.
fn scenario() -> Nodenet {
    let mut net = Nodenet::with_nodetypes(unit_types());
    net.add_partition(Partition::dense("A", 4)).unwrap();
    net.add_partition(Partition::sparse("B", 4)).unwrap();
    net.add_node(Node::new("n1", "Unit", "A"), 0).unwrap();
    net.add_node(Node::new("n2", "Unit", "B"), 0).unwrap();
    net.get_partition_mut("B").unwrap().set_cross_partition_edges(
        "A",
        CrossPartitionEdges::from_raw(vec![1], vec![2], vec![0.75]),
    );
    net
}

/// One partition of `format` with four single-element nodes at 0..4.
fn single_partition(format: MatrixFormat) -> Nodenet {
    let mut net = Nodenet::with_nodetypes(unit_types());
    net.add_partition(Partition::new("P", format, 4)).unwrap();
    for (i, uid) in ["a", "b", "c", "d"].iter().enumerate() {
        net.add_node(Node::new(*uid, "Single", "P"), i).unwrap();
    }
    net
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}

// ============================================================================
// Cross-partition
// ============================================================================

#[test]
fn test_cross_partition_scenario() {
    let net = scenario();
    assert_close(resolve_weight(&net, "n1", "gate1", "n2", "slot2").unwrap(), 0.75);
}

#[test]
fn test_cross_partition_reverse_direction_is_missing_edge() {
    let net = scenario();
    let err = resolve_weight(&net, "n2", "gate1", "n1", "slot2").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingEdge);
}

#[test]
fn test_cross_partition_unlisted_pair_is_missing_edge() {
    let net = scenario();
    // Both nodes exist and B has a list for A, but not this element pair.
    let err = resolve_weight(&net, "n1", "gate0", "n2", "slot2").unwrap_err();
    assert_eq!(
        err,
        LinkError::MissingEdge {
            source_partition: "A".into(),
            source_element: 0,
            target_partition: "B".into(),
            target_element: 2,
        }
    );
}

#[test]
fn test_cross_partition_fan_out_from_one_element() {
    let mut net = scenario();
    net.add_node(Node::new("n3", "Single", "B"), 3).unwrap();
    net.set_weight("n1", "gate1", "n3", "gen", -0.5).unwrap();

    // from = [1, 1], to = [2, 3]: both searches still agree per edge
    assert_close(resolve_weight(&net, "n1", "gate1", "n2", "slot2").unwrap(), 0.75);
    assert_close(resolve_weight(&net, "n1", "gate1", "n3", "gen").unwrap(), -0.5);
}

#[test]
fn test_duplicate_pair_is_detected() {
    let mut net = scenario();
    net.get_partition_mut("B").unwrap().set_cross_partition_edges(
        "A",
        CrossPartitionEdges::from_raw(vec![1, 1], vec![2, 2], vec![0.75, -0.9]),
    );

    let err = resolve_weight(&net, "n1", "gate1", "n2", "slot2").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Inconsistent);
    assert!(net.validate().unwrap_err().is_inconsistent());
}

#[test]
fn test_elements_listed_in_other_edges_are_missing_edge() {
    let mut net = scenario();
    // from = [1, 0], to = [0, 2]: elements 1 and 2 both occur, never as one edge
    net.get_partition_mut("B").unwrap().set_cross_partition_edges(
        "A",
        CrossPartitionEdges::from_raw(vec![1, 0], vec![0, 2], vec![0.75, 0.1]),
    );

    assert!(net.validate().is_ok());
    let err = resolve_weight(&net, "n1", "gate1", "n2", "slot2").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingEdge);
    assert_close(resolve_weight(&net, "n1", "gate1", "n2", "slot0").unwrap(), 0.75);
    assert_close(resolve_weight(&net, "n1", "gate0", "n2", "slot2").unwrap(), 0.1);
}

#[test]
fn test_unequal_sequence_lengths_are_detected() {
    let mut net = scenario();
    net.get_partition_mut("B").unwrap().set_cross_partition_edges(
        "A",
        CrossPartitionEdges::from_raw(vec![1, 0], vec![2], vec![0.75]),
    );

    assert!(resolve_weight(&net, "n1", "gate1", "n2", "slot2")
        .unwrap_err()
        .is_inconsistent());
    assert!(net.validate().unwrap_err().is_inconsistent());
}

// ============================================================================
// Same partition
// ============================================================================

#[test]
fn test_dense_exact_cell() {
    let mut net = single_partition(MatrixFormat::Dense);
    net.get_partition_mut("P").unwrap().write(3, 1, -0.42).unwrap();

    // row 3 is d.gen (target slot), column 1 is b.gen (source gate)
    assert_close(resolve_weight(&net, "b", "gen", "d", "gen").unwrap(), -0.42);
}

#[test]
fn test_swapping_endpoints_reads_transposed_cell() {
    let mut net = single_partition(MatrixFormat::Dense);
    net.set_weight("b", "gen", "d", "gen", -0.42).unwrap();
    net.set_weight("d", "gen", "b", "gen", 0.9).unwrap();

    let forward = resolve_weight(&net, "b", "gen", "d", "gen").unwrap();
    let backward = resolve_weight(&net, "d", "gen", "b", "gen").unwrap();
    assert_close(forward, -0.42);
    assert_close(backward, 0.9);
    assert_ne!(forward, backward);
}

#[test]
fn test_dense_sparse_equivalence() {
    let mut dense = single_partition(MatrixFormat::Dense);
    let weights = [
        ("a", "b", 0.5),
        ("b", "a", -0.25),
        ("c", "d", 1.0),
        ("d", "d", 0.125),
        ("a", "d", -0.42),
    ];
    for (source, target, weight) in weights {
        dense.set_weight(source, "gen", target, "gen", weight).unwrap();
    }

    let mut sparse = dense.clone();
    let converted = sparse
        .get_partition("P")
        .unwrap()
        .with_format(MatrixFormat::Sparse);
    *sparse.get_partition_mut("P").unwrap() = converted;
    assert!(sparse.get_partition("P").unwrap().is_sparse());

    for source in ["a", "b", "c", "d"] {
        for target in ["a", "b", "c", "d"] {
            let d = resolve_weight(&dense, source, "gen", target, "gen").unwrap();
            let s = resolve_weight(&sparse, source, "gen", target, "gen").unwrap();
            assert_close(s, d);
        }
    }
}

#[test]
fn test_multi_element_nodes_use_base_plus_index() {
    let mut net = Nodenet::with_nodetypes(unit_types());
    net.add_partition(Partition::sparse("P", 8)).unwrap();
    net.add_node(Node::new("x", "Unit", "P"), 0).unwrap();
    net.add_node(Node::new("y", "Unit", "P"), 4).unwrap();

    // y.slot2 -> row 6, x.gate1 -> column 1
    net.get_partition_mut("P").unwrap().write(6, 1, 0.33).unwrap();
    assert_close(resolve_weight(&net, "x", "gate1", "y", "slot2").unwrap(), 0.33);
    assert_eq!(resolve_weight(&net, "x", "gate2", "y", "slot1").unwrap(), 0.0);
}

// ============================================================================
// Endpoint and symbol failures
// ============================================================================

#[test]
fn test_nonexistent_node_fails_instead_of_zero() {
    let net = single_partition(MatrixFormat::Dense);
    let err = resolve_weight(&net, "a", "gen", "zz", "gen").unwrap_err();
    assert_eq!(err, LinkError::NodeNotFound("zz".into()));
    assert_eq!(err.kind(), ErrorKind::UnresolvedEndpoint);
}

#[test]
fn test_removed_node_fails() {
    let mut net = scenario();
    net.remove_node("n2");
    assert_eq!(
        resolve_weight(&net, "n1", "gate1", "n2", "slot2").unwrap_err().kind(),
        ErrorKind::UnresolvedEndpoint
    );
}

#[test]
fn test_invalid_symbol_for_type() {
    let net = scenario();
    let err = resolve_weight(&net, "n1", "gen", "n2", "slot2").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnresolvedSymbol);
}
