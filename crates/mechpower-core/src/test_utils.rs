//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::fixed::{Fixed64, f64_to_fixed64};
use crate::position::{BlockPos, Side, SideMask};
use crate::topology::NetworkGraph;
use crate::validation::check_topology;

// ===========================================================================
// Value helpers
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    f64_to_fixed64(v)
}

pub fn pos(x: i32, y: i32, z: i32) -> BlockPos {
    BlockPos::new(x, y, z)
}

// ===========================================================================
// Masks
// ===========================================================================

/// Axle running along x.
pub fn x_axle() -> SideMask {
    SideMask::axis(Side::Right)
}

/// Axle running along y.
pub fn y_axle() -> SideMask {
    SideMask::axis(Side::Top)
}

// ===========================================================================
// Layouts
// ===========================================================================

/// Positions `(x0..x0+len, y, z)`.
pub fn row(x0: i32, y: i32, z: i32, len: i32) -> Vec<BlockPos> {
    (x0..x0 + len).map(|x| pos(x, y, z)).collect()
}

/// A graph holding one x-axis line of `len` nodes starting at the origin.
pub fn line_graph(len: i32) -> NetworkGraph {
    let mut graph = NetworkGraph::new();
    for p in row(0, 0, 0, len) {
        graph.add_node(p, x_axle()).unwrap();
    }
    graph
}

/// Two x-axis lines joined by a single vertical bridge column.
///
/// Returns the graph and the bridge position whose removal splits it.
pub fn dumbbell_graph(arm: i32) -> (NetworkGraph, BlockPos) {
    let mut graph = NetworkGraph::new();
    for p in row(0, 0, 0, arm).into_iter().chain(row(0, 2, 0, arm)) {
        graph.add_node(p, SideMask::ALL).unwrap();
    }
    let bridge = pos(0, 1, 0);
    graph.add_node(bridge, y_axle()).unwrap();
    (graph, bridge)
}

// ===========================================================================
// Assertions
// ===========================================================================

/// Panic with the violation list if `graph` disagrees with a flood fill.
pub fn assert_consistent(graph: &NetworkGraph) {
    let violations = check_topology(graph);
    assert!(violations.is_empty(), "topology violations: {violations:?}");
}
