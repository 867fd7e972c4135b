//! Consistency checks for the topology graph.
//!
//! [`check_topology`] compares the incremental labelling against a
//! brute-force flood fill of the node table. It walks every node, so it is
//! meant for tests, debug assertions and offline tooling rather than the
//! simulation loop.

use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::id::NetworkId;
use crate::position::BlockPos;
use crate::table::NodeTable;
use crate::topology::NetworkGraph;

/// A disagreement between the graph's labels and true connectivity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyViolation {
    /// A placed node has no network.
    Unlabelled(BlockPos),
    /// A node's network does not list it as a member.
    MissingMember { position: BlockPos, network: NetworkId },
    /// A live network has no members.
    EmptyNetwork(NetworkId),
    /// Member counts across networks do not add up to the node count.
    CountMismatch { nodes: usize, members: usize },
    /// One connected component carries more than one id.
    OverSplit { component: BTreeSet<BlockPos> },
    /// One id spans more than one connected component.
    OverMerged { network: NetworkId },
}

/// Connected components of `table` by flood fill, each sorted, in order of
/// their smallest position.
pub fn flood_fill_components(table: &NodeTable) -> Vec<BTreeSet<BlockPos>> {
    let mut starts: Vec<BlockPos> = table.iter().map(|n| n.position).collect();
    starts.sort();

    let mut seen = HashSet::new();
    let mut components = Vec::new();
    for start in starts {
        if !seen.insert(start) {
            continue;
        }
        let mut component = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            for neighbor in table.connected_neighbors(node) {
                if seen.insert(neighbor) {
                    component.insert(neighbor);
                    queue.push_back(neighbor);
                }
            }
        }
        components.push(component);
    }
    components
}

/// Every violation found in `graph`. Empty means consistent.
pub fn check_topology(graph: &NetworkGraph) -> Vec<TopologyViolation> {
    let mut violations = Vec::new();

    for node in graph.table().iter() {
        match graph.network_of(node.position) {
            Ok(network) => {
                if !graph.member_positions(network).any(|p| p == node.position) {
                    violations.push(TopologyViolation::MissingMember {
                        position: node.position,
                        network,
                    });
                }
            }
            Err(_) => violations.push(TopologyViolation::Unlabelled(node.position)),
        }
    }

    let mut members = 0;
    for network in graph.all_networks() {
        let size = graph.network_size(network);
        if size == 0 {
            violations.push(TopologyViolation::EmptyNetwork(network));
        }
        members += size;
    }
    if members != graph.node_count() {
        violations.push(TopologyViolation::CountMismatch {
            nodes: graph.node_count(),
            members,
        });
    }

    let mut claimed = HashSet::new();
    for component in flood_fill_components(graph.table()) {
        let ids: BTreeSet<NetworkId> = component
            .iter()
            .filter_map(|p| graph.network_of(*p).ok())
            .collect();
        if ids.len() > 1 {
            violations.push(TopologyViolation::OverSplit { component });
            continue;
        }
        if let Some(&network) = ids.first() {
            if !claimed.insert(network) {
                violations.push(TopologyViolation::OverMerged { network });
            }
        }
    }

    violations
}
