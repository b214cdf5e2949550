//! Integration tests for link handles.
//!
//! Link handles are views: identity is derived from the 4-tuple, and every
//! other attribute is read from the network at the moment of access.

use nodenet::registry::create_default_registry;
use nodenet::{
    ErrorKind, Link, LinkKey, MissingEdgePolicy, Node, Nodenet, Partition, WeightResolver,
    LINK_CERTAINTY,
};

fn net() -> Nodenet {
    let mut net = Nodenet::with_nodetypes(create_default_registry());
    net.add_partition(Partition::dense("001", 16)).unwrap();
    net.add_partition(Partition::sparse("002", 16)).unwrap();
    net.add_node(Node::new("pipe", "Pipe", "001"), 0).unwrap();
    net.add_node(Node::new("sensor", "Sensor", "001"), 7).unwrap();
    net.add_node(Node::new("actor", "Actuator", "002"), 9).unwrap();
    net.set_weight("sensor", "gen", "pipe", "sur", 0.5).unwrap();
    net.set_weight("pipe", "sub", "actor", "gen", 1.0).unwrap();
    net
}

#[test]
fn test_identity_is_deterministic() {
    let net = net();
    let first = net.link("pipe", "sub", "actor", "gen");
    let second = net.link("pipe", "sub", "actor", "gen");

    assert_eq!(first.identity(), "pipe:sub:actor:gen");
    assert_eq!(first.identity(), first.identity());
    assert_eq!(first.identity(), second.identity());
    assert_eq!(first, second);
    assert_ne!(
        first.identity(),
        net.link("actor", "gen", "pipe", "sub").identity()
    );
}

#[test]
fn test_identity_does_not_need_live_nodes() {
    let net = Nodenet::new();
    let link = net.link("ghost", "gen", "other", "gen");
    assert_eq!(link.identity(), "ghost:gen:other:gen");
    assert_eq!(link.weight().unwrap_err().kind(), ErrorKind::UnresolvedEndpoint);
}

#[test]
fn test_weight_is_live() {
    let mut net = net();
    let key = LinkKey::new("sensor", "gen", "pipe", "sur");
    assert_eq!(Link::new(&net, key.clone()).weight().unwrap(), 0.5);

    net.set_weight("sensor", "gen", "pipe", "sur", -0.25).unwrap();
    assert_eq!(Link::new(&net, key).weight().unwrap(), -0.25);
}

#[test]
fn test_certainty_is_constant() {
    let net = net();
    let link = net.link("sensor", "gen", "pipe", "sur");
    assert_eq!(link.certainty(), 1.0);
    assert_eq!(link.certainty(), LINK_CERTAINTY);
}

#[test]
fn test_endpoint_accessors() {
    let net = net();
    let link = net.link("pipe", "sub", "actor", "gen");

    assert_eq!(link.source_node().unwrap().nodetype, "Pipe");
    assert_eq!(link.target_node().unwrap().partition, "002");

    let gate = link.source_gate().unwrap();
    assert_eq!(gate.gate_type, "sub");
    assert_eq!(gate.index, 3);
    assert_eq!(gate.element, 3);

    let slot = link.target_slot().unwrap();
    assert_eq!(slot.slot_type, "gen");
    assert_eq!(slot.element, 9);
}

#[test]
fn test_accessor_errors() {
    let net = net();
    // Sensors have no slots
    let link = net.link("pipe", "gen", "sensor", "gen");
    assert_eq!(link.target_slot().unwrap_err().kind(), ErrorKind::UnresolvedSymbol);
    assert_eq!(link.weight().unwrap_err().kind(), ErrorKind::UnresolvedSymbol);
    assert!(link.source_gate().is_ok());
}

#[test]
fn test_snapshot() {
    let net = net();
    let data = net.link("pipe", "sub", "actor", "gen").snapshot().unwrap();

    let value = serde_json::to_value(&data).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "identity": "pipe:sub:actor:gen",
            "weight": 1.0,
            "certainty": 1.0,
            "source_gate_name": "sub",
            "source_node_uid": "pipe",
            "target_slot_name": "gen",
            "target_node_uid": "actor",
        })
    );
}

#[test]
fn test_snapshot_propagates_missing_edge() {
    let net = net();
    let link = net.link("actor", "gen", "pipe", "gen");
    assert!(link.snapshot().unwrap_err().is_missing_edge());

    let lenient = WeightResolver::new().with_missing_edge_policy(MissingEdgePolicy::Zero);
    assert_eq!(link.weight_with(&lenient).unwrap(), 0.0);
}

#[test]
fn test_enumerated_links_resolve() {
    let net = net();
    let keys = net.outgoing_links("pipe").unwrap();
    assert_eq!(keys, vec![LinkKey::new("pipe", "sub", "actor", "gen")]);

    let incoming = net.incoming_links("pipe").unwrap();
    assert_eq!(incoming, vec![LinkKey::new("sensor", "gen", "pipe", "sur")]);

    for key in keys.into_iter().chain(incoming) {
        assert!(Link::new(&net, key).weight().is_ok());
    }
}
