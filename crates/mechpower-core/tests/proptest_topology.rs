//! Property-based tests for the network topology graph.
//!
//! Random mutation sequences run on a small box so that nodes collide,
//! merge and split often. After every step the graph must agree with a
//! brute-force flood fill of its node table.

use std::collections::BTreeSet;

use mechpower_core::NetworkError;
use mechpower_core::position::{BlockPos, SideMask};
use mechpower_core::test_utils::*;
use mechpower_core::topology::NetworkGraph;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

fn arb_pos() -> impl Strategy<Value = BlockPos> {
    (0..4i32, 0..3i32, 0..2i32).prop_map(|(x, y, z)| pos(x, y, z))
}

fn arb_mask() -> impl Strategy<Value = SideMask> {
    // Bias towards fully connecting masks so large networks form.
    prop_oneof![
        1 => Just(SideMask::ALL),
        3 => (0u8..64).prop_map(|bits| SideMask::from_bits(bits).unwrap()),
    ]
}

#[derive(Debug, Clone)]
enum TopoOp {
    Add(BlockPos, SideMask),
    Remove(BlockPos),
    Update(BlockPos, SideMask),
}

fn arb_ops(max_ops: usize) -> impl Strategy<Value = Vec<TopoOp>> {
    proptest::collection::vec(
        prop_oneof![
            3 => (arb_pos(), arb_mask()).prop_map(|(p, m)| TopoOp::Add(p, m)),
            1 => arb_pos().prop_map(TopoOp::Remove),
            1 => (arb_pos(), arb_mask()).prop_map(|(p, m)| TopoOp::Update(p, m)),
        ],
        1..=max_ops,
    )
}

fn arb_positions() -> impl Strategy<Value = BTreeSet<BlockPos>> {
    proptest::collection::btree_set(arb_pos(), 1..20)
}

// ===========================================================================
// Helpers
// ===========================================================================

/// The member sets of every network, independent of ids.
fn partition(graph: &NetworkGraph) -> BTreeSet<BTreeSet<BlockPos>> {
    graph
        .all_networks()
        .into_iter()
        .map(|network| graph.member_positions(network).collect())
        .collect()
}

fn apply(graph: &mut NetworkGraph, op: &TopoOp) {
    match *op {
        TopoOp::Add(p, mask) => {
            let occupied = graph.contains(p);
            let result = graph.add_node(p, mask);
            if occupied {
                assert_eq!(result, Err(NetworkError::DuplicateNode(p)));
            } else {
                assert_eq!(result.unwrap(), graph.network_of(p).unwrap());
            }
        }
        TopoOp::Remove(p) => {
            let present = graph.contains(p);
            let result = graph.remove_node(p);
            assert_eq!(result.is_ok(), present);
            assert!(!graph.contains(p));
        }
        TopoOp::Update(p, mask) => {
            let present = graph.contains(p);
            let result = graph.update_node(p, mask);
            if present {
                assert_eq!(result.unwrap(), graph.network_of(p).unwrap());
                assert_eq!(graph.node(p).unwrap().sides, mask);
            } else {
                assert_eq!(result, Err(NetworkError::UnknownNode(p)));
            }
        }
    }
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every node sits in exactly one network, and networks are exactly the
    /// connected components, after every single operation.
    #[test]
    fn mutations_preserve_components(ops in arb_ops(60)) {
        let mut graph = NetworkGraph::new();
        for op in &ops {
            apply(&mut graph, op);
            assert_consistent(&graph);
        }
    }

    /// A rejected add leaves the graph exactly as it was.
    #[test]
    fn duplicate_add_changes_nothing(ops in arb_ops(30), mask in arb_mask()) {
        let mut graph = NetworkGraph::new();
        for op in &ops {
            apply(&mut graph, op);
        }
        let Some(taken) = graph.table().iter().map(|n| n.position).min() else {
            return Ok(());
        };
        let before = partition(&graph);
        let ids = graph.all_networks();
        graph.drain_events();

        prop_assert!(graph.add_node(taken, mask).is_err());
        prop_assert_eq!(partition(&graph), before);
        prop_assert_eq!(graph.all_networks(), ids);
        prop_assert!(graph.drain_events().is_empty());
    }

    /// Removing a node and putting it back restores the partition.
    #[test]
    fn remove_then_readd_restores_partition(ops in arb_ops(40), pick in any::<prop::sample::Index>()) {
        let mut graph = NetworkGraph::new();
        for op in &ops {
            apply(&mut graph, op);
        }
        let mut nodes: Vec<_> = graph.table().iter().collect();
        if nodes.is_empty() {
            return Ok(());
        }
        nodes.sort_by_key(|n| n.position);
        let node = nodes[pick.index(nodes.len())];
        let (p, mask) = (node.position, node.sides);
        let before = partition(&graph);

        graph.remove_node(p).unwrap();
        assert_consistent(&graph);
        graph.add_node(p, mask).unwrap();
        assert_consistent(&graph);
        prop_assert_eq!(partition(&graph), before);
    }

    /// Bulk add and bulk remove partition the world like one-at-a-time calls.
    #[test]
    fn bulk_matches_single(
        placed in arb_positions(),
        mask in arb_mask(),
        removed in arb_positions(),
    ) {
        let placed: Vec<_> = placed.into_iter().collect();
        let removed: Vec<_> = removed.into_iter().filter(|p| placed.contains(p)).collect();

        let mut bulk = NetworkGraph::new();
        bulk.add_nodes(&placed, mask).unwrap();
        let mut single = NetworkGraph::new();
        for &p in &placed {
            single.add_node(p, mask).unwrap();
        }
        assert_consistent(&bulk);
        prop_assert_eq!(partition(&bulk), partition(&single));

        bulk.remove_nodes(&removed).unwrap();
        for &p in &removed {
            single.remove_node(p).unwrap();
        }
        assert_consistent(&bulk);
        prop_assert_eq!(partition(&bulk), partition(&single));
    }

    /// A bad batch is rejected before anything is touched.
    #[test]
    fn invalid_batch_is_atomic(placed in arb_positions(), extra in arb_pos()) {
        let placed: Vec<_> = placed.into_iter().collect();
        let mut graph = NetworkGraph::new();
        graph.add_nodes(&placed, SideMask::ALL).unwrap();
        let before = partition(&graph);

        let mut batch = vec![extra];
        batch.push(placed[0]);
        prop_assert!(graph.add_nodes(&batch, SideMask::ALL).is_err());
        prop_assert_eq!(partition(&graph), before.clone());

        let mut gone = placed.clone();
        gone.push(pos(100, 100, 100));
        prop_assert!(graph.remove_nodes(&gone).is_err());
        prop_assert_eq!(partition(&graph), before);
    }
}
