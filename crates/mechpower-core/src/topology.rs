//! Network topology graph.
//!
//! Maintains the connected components ("networks") of the node table under
//! the mutual-face adjacency rule. Components are labelled incrementally:
//!
//! - **Add** unions the new node with every linked neighbour's network. The
//!   smallest ordinal survives a merge.
//! - **Remove** of a node with two or more links may disconnect its
//!   neighbours. One breadth-first walk per neighbour runs in lockstep; walks
//!   that meet are fused, and a walk that runs dry has enumerated a split-off
//!   component. The last walk still running keeps the original id, so the
//!   work done is bounded by the size of the pieces that actually split off.
//! - **Update** rewrites the mask in place when no link is lost and falls
//!   back to remove + add otherwise.
//!
//! Identity changes are buffered as [`TopologyEvent`]s.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::error::NetworkError;
use crate::event::TopologyEvent;
use crate::id::NetworkId;
use crate::position::{BlockPos, NetworkNode, SideMask};
use crate::table::NodeTable;

/// Connected-component index over a [`NodeTable`].
#[derive(Debug, Clone, Default)]
pub struct NetworkGraph {
    table: NodeTable,
    /// Node -> owning network.
    membership: HashMap<BlockPos, NetworkId>,
    /// Network -> members. Every entry is non-empty.
    networks: BTreeMap<NetworkId, BTreeSet<BlockPos>>,
    next_network_id: u32,
    events: Vec<TopologyEvent>,
}

impl NetworkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Single-node mutations --

    /// Place a node and join it to every network it links with.
    ///
    /// Returns the network the node ends up in.
    pub fn add_node(&mut self, position: BlockPos, mask: SideMask) -> Result<NetworkId, NetworkError> {
        if self.table.contains(position) {
            return Err(NetworkError::DuplicateNode(position));
        }

        let linked: BTreeSet<NetworkId> = self
            .table
            .linked_neighbors(position, mask)
            .into_iter()
            .filter_map(|(_, neighbor)| self.membership.get(&neighbor).copied())
            .collect();

        self.table.put(position, mask);
        let network = self.join(linked);
        self.assign(position, network);
        Ok(network)
    }

    /// Remove a node, splitting its network if the node was a bridge.
    pub fn remove_node(&mut self, position: BlockPos) -> Result<(), NetworkError> {
        if !self.table.contains(position) {
            return Err(NetworkError::UnknownNode(position));
        }

        let seeds = self.table.connected_neighbors(position);
        let network = self.unassign(position)?;
        self.table.remove(position);

        if seeds.len() >= 2 {
            self.split(network, &seeds);
        }
        Ok(())
    }

    /// Change the connecting sides of an existing node.
    ///
    /// Returns the network the node ends up in.
    pub fn update_node(&mut self, position: BlockPos, mask: SideMask) -> Result<NetworkId, NetworkError> {
        let old_mask = self
            .table
            .get(position)
            .ok_or(NetworkError::UnknownNode(position))?;
        let current = self.network_of(position)?;
        if old_mask == mask {
            return Ok(current);
        }

        let old_links: BTreeSet<BlockPos> = self.table.connected_neighbors(position).into_iter().collect();
        let new_links: BTreeSet<BlockPos> = self
            .table
            .linked_neighbors(position, mask)
            .into_iter()
            .map(|(_, p)| p)
            .collect();

        if old_links == new_links {
            self.table.put(position, mask);
            return Ok(current);
        }

        if old_links.is_subset(&new_links) {
            // Links were only gained: nothing can split.
            self.table.put(position, mask);
            let linked: BTreeSet<NetworkId> = new_links
                .iter()
                .filter_map(|p| self.membership.get(p).copied())
                .chain(std::iter::once(current))
                .collect();
            return Ok(self.join(linked));
        }

        self.remove_node(position)?;
        self.add_node(position, mask)
    }

    // -- Bulk mutations --

    /// Place many nodes sharing one mask, as on chunk load.
    ///
    /// The whole batch is validated first; on error nothing is placed.
    /// Returns the distinct networks the new nodes ended up in.
    pub fn add_nodes(&mut self, positions: &[BlockPos], mask: SideMask) -> Result<Vec<NetworkId>, NetworkError> {
        let mut batch = HashSet::with_capacity(positions.len());
        for &position in positions {
            if self.table.contains(position) || !batch.insert(position) {
                return Err(NetworkError::DuplicateNode(position));
            }
        }

        for &position in positions {
            self.table.put(position, mask);
        }

        // Label the new nodes one linked group at a time.
        for &start in positions {
            if self.membership.contains_key(&start) {
                continue;
            }
            let mut group = vec![start];
            let mut touched = BTreeSet::new();
            let mut seen = HashSet::from([start]);
            let mut queue = VecDeque::from([start]);
            while let Some(node) = queue.pop_front() {
                for neighbor in self.table.connected_neighbors(node) {
                    if let Some(&existing) = self.membership.get(&neighbor) {
                        touched.insert(existing);
                    } else if seen.insert(neighbor) {
                        group.push(neighbor);
                        queue.push_back(neighbor);
                    }
                }
            }

            let network = self.join(touched);
            for node in group {
                self.assign(node, network);
            }
        }

        // Read back after labelling: later groups may absorb earlier ones.
        let landed: BTreeSet<NetworkId> = positions
            .iter()
            .filter_map(|p| self.membership.get(p).copied())
            .collect();
        Ok(landed.into_iter().collect())
    }

    /// Remove many nodes, as on chunk unload.
    ///
    /// Split detection is deferred until the whole batch is gone, then each
    /// affected network is re-derived once. The batch is validated first; on
    /// error nothing is removed.
    pub fn remove_nodes(&mut self, positions: &[BlockPos]) -> Result<(), NetworkError> {
        let mut batch = HashSet::with_capacity(positions.len());
        for &position in positions {
            if !self.table.contains(position) || !batch.insert(position) {
                return Err(NetworkError::UnknownNode(position));
            }
        }

        // Collect surviving neighbours before anything is removed.
        let mut seeds: BTreeMap<NetworkId, BTreeSet<BlockPos>> = BTreeMap::new();
        for &position in positions {
            let Some(&network) = self.membership.get(&position) else {
                continue;
            };
            for neighbor in self.table.connected_neighbors(position) {
                if !batch.contains(&neighbor) {
                    seeds.entry(network).or_default().insert(neighbor);
                }
            }
        }

        for &position in positions {
            self.unassign(position)?;
            self.table.remove(position);
        }

        for (network, seeds) in seeds {
            if seeds.len() >= 2 && self.networks.contains_key(&network) {
                let seeds: Vec<BlockPos> = seeds.into_iter().collect();
                self.split(network, &seeds);
            }
        }
        Ok(())
    }

    // -- Queries --

    /// The network the node at `position` belongs to.
    pub fn network_of(&self, position: BlockPos) -> Result<NetworkId, NetworkError> {
        self.membership
            .get(&position)
            .copied()
            .ok_or(NetworkError::UnknownNode(position))
    }

    /// All nodes of `network` in position order. Empty if the id is stale.
    pub fn members_of(&self, network: NetworkId) -> Vec<NetworkNode> {
        self.member_positions(network)
            .filter_map(|position| self.node(position))
            .collect()
    }

    /// Positions of the members of `network` in order. Empty if stale.
    pub fn member_positions(&self, network: NetworkId) -> impl Iterator<Item = BlockPos> + '_ {
        self.networks.get(&network).into_iter().flatten().copied()
    }

    /// Every live network, ascending.
    pub fn all_networks(&self) -> Vec<NetworkId> {
        self.networks.keys().copied().collect()
    }

    pub fn node(&self, position: BlockPos) -> Option<NetworkNode> {
        self.table.get(position).map(|sides| NetworkNode { position, sides })
    }

    pub fn contains(&self, position: BlockPos) -> bool {
        self.table.contains(position)
    }

    pub fn contains_network(&self, network: NetworkId) -> bool {
        self.networks.contains_key(&network)
    }

    pub fn network_size(&self, network: NetworkId) -> usize {
        self.networks.get(&network).map_or(0, BTreeSet::len)
    }

    pub fn node_count(&self) -> usize {
        self.table.len()
    }

    pub fn network_count(&self) -> usize {
        self.networks.len()
    }

    /// Read access to the underlying node table.
    pub fn table(&self) -> &NodeTable {
        &self.table
    }

    /// Take every event buffered since the last drain.
    pub fn drain_events(&mut self) -> Vec<TopologyEvent> {
        std::mem::take(&mut self.events)
    }

    // -- Internals --

    fn allocate_id(&mut self) -> NetworkId {
        let id = NetworkId(self.next_network_id);
        self.next_network_id += 1;
        id
    }

    /// Fold `linked` into its smallest id, or open a fresh network if empty.
    fn join(&mut self, linked: BTreeSet<NetworkId>) -> NetworkId {
        let mut linked = linked.into_iter();
        let Some(survivor) = linked.next() else {
            let id = self.allocate_id();
            self.networks.insert(id, BTreeSet::new());
            self.events.push(TopologyEvent::NetworkCreated { network: id });
            return id;
        };

        let absorbed: Vec<NetworkId> = linked.collect();
        if absorbed.is_empty() {
            return survivor;
        }

        let mut moved = Vec::new();
        for &id in &absorbed {
            if let Some(members) = self.networks.remove(&id) {
                moved.extend(members);
            }
        }
        for &position in &moved {
            self.membership.insert(position, survivor);
        }
        self.networks.entry(survivor).or_default().extend(moved);

        debug!(%survivor, ?absorbed, "networks merged");
        self.events.push(TopologyEvent::NetworksMerged { survivor, absorbed });
        survivor
    }

    fn assign(&mut self, position: BlockPos, network: NetworkId) {
        self.membership.insert(position, network);
        self.networks.entry(network).or_default().insert(position);
    }

    /// Drop `position` from its network, dissolving the network if emptied.
    fn unassign(&mut self, position: BlockPos) -> Result<NetworkId, NetworkError> {
        let network = self
            .membership
            .remove(&position)
            .ok_or(NetworkError::UnknownNode(position))?;
        let emptied = match self.networks.get_mut(&network) {
            Some(members) => {
                members.remove(&position);
                members.is_empty()
            }
            None => false,
        };
        if emptied {
            self.networks.remove(&network);
            debug!(%network, "network dissolved");
            self.events.push(TopologyEvent::NetworkDissolved { network });
        }
        Ok(network)
    }

    /// Re-derive connectivity inside `network` starting from `seeds`.
    ///
    /// Every remaining component of the network must contain a seed.
    fn split(&mut self, network: NetworkId, seeds: &[BlockPos]) {
        let walk_count = seeds.len();
        let mut owner: HashMap<BlockPos, usize> = HashMap::new();
        let mut frontiers: Vec<VecDeque<BlockPos>> = Vec::with_capacity(walk_count);
        let mut parent: Vec<usize> = (0..walk_count).collect();
        let mut exhausted = vec![false; walk_count];

        for (walk, &seed) in seeds.iter().enumerate() {
            match owner.get(&seed) {
                // Duplicate seed: fold into the first walk that owns it.
                Some(&first) => {
                    parent[walk] = first;
                    frontiers.push(VecDeque::new());
                }
                None => {
                    owner.insert(seed, walk);
                    frontiers.push(VecDeque::from([seed]));
                }
            }
        }

        let mut open = (0..walk_count).filter(|&w| parent[w] == w).count();
        while open > 1 {
            for walk in 0..walk_count {
                if open <= 1 {
                    break;
                }
                if parent[walk] != walk || exhausted[walk] {
                    continue;
                }
                let Some(node) = frontiers[walk].pop_front() else {
                    exhausted[walk] = true;
                    open -= 1;
                    continue;
                };
                for neighbor in self.table.connected_neighbors(node) {
                    match owner.get(&neighbor) {
                        None => {
                            owner.insert(neighbor, walk);
                            frontiers[walk].push_back(neighbor);
                        }
                        Some(&other) => {
                            let other_root = find_root(&mut parent, other);
                            if other_root != walk {
                                parent[other_root] = walk;
                                let absorbed = std::mem::take(&mut frontiers[other_root]);
                                frontiers[walk].extend(absorbed);
                                open -= 1;
                            }
                        }
                    }
                }
            }
        }

        // Every exhausted walk enumerated a complete, separate component.
        let mut pieces: BTreeMap<usize, Vec<BlockPos>> = BTreeMap::new();
        for (&position, &walk) in &owner {
            let root = find_root(&mut parent, walk);
            if exhausted[root] {
                pieces.entry(root).or_default().push(position);
            }
        }
        if pieces.is_empty() {
            return;
        }

        let mut split_off = Vec::with_capacity(pieces.len());
        for (_, members) in pieces {
            let id = self.allocate_id();
            if let Some(remaining) = self.networks.get_mut(&network) {
                for position in &members {
                    remaining.remove(position);
                }
            }
            for &position in &members {
                self.membership.insert(position, id);
            }
            self.networks.insert(id, members.into_iter().collect());
            split_off.push(id);
        }

        if self.networks.get(&network).is_some_and(BTreeSet::is_empty) {
            // Only reachable if no walk stayed open.
            self.networks.remove(&network);
        }

        debug!(%network, ?split_off, "network split");
        self.events.push(TopologyEvent::NetworkSplit {
            original: network,
            split_off,
        });
    }
}

/// Union-find root lookup with path halving.
fn find_root(parent: &mut [usize], mut walk: usize) -> usize {
    while parent[walk] != walk {
        parent[walk] = parent[parent[walk]];
        walk = parent[walk];
    }
    walk
}
