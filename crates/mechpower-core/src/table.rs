//! Spatial node table: position -> connection mask.

use std::collections::HashMap;

use crate::position::{BlockPos, NetworkNode, Side, SideMask, links};

/// Maps each occupied position to the sides its node connects on.
///
/// Keys are unique and `put` overwrites. Enumeration order is unspecified.
#[derive(Debug, Clone, Default)]
pub struct NodeTable {
    nodes: HashMap<BlockPos, SideMask>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the node at `position`. Returns the previous mask.
    pub fn put(&mut self, position: BlockPos, mask: SideMask) -> Option<SideMask> {
        self.nodes.insert(position, mask)
    }

    /// Remove the node at `position`. Returns its mask if one was present.
    pub fn remove(&mut self, position: BlockPos) -> Option<SideMask> {
        self.nodes.remove(&position)
    }

    pub fn get(&self, position: BlockPos) -> Option<SideMask> {
        self.nodes.get(&position).copied()
    }

    pub fn contains(&self, position: BlockPos) -> bool {
        self.nodes.contains_key(&position)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NetworkNode> + '_ {
        self.nodes.iter().map(|(&position, &sides)| NetworkNode { position, sides })
    }

    // -- Adjacency --

    /// Neighbours a node with `mask` at `position` would link to, in side
    /// order. The node at `position` itself (if any) is not consulted.
    pub fn linked_neighbors(&self, position: BlockPos, mask: SideMask) -> Vec<(Side, BlockPos)> {
        mask.sides()
            .filter_map(|side| {
                let neighbor = position.offset(side)?;
                let neighbor_mask = self.get(neighbor)?;
                links(mask, side, neighbor_mask).then_some((side, neighbor))
            })
            .collect()
    }

    /// Neighbours that mutually connect with the node stored at `position`.
    /// Empty if the position is vacant.
    pub fn connected_neighbors(&self, position: BlockPos) -> Vec<BlockPos> {
        match self.get(position) {
            Some(mask) => self
                .linked_neighbors(position, mask)
                .into_iter()
                .map(|(_, p)| p)
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32, z: i32) -> BlockPos {
        BlockPos::new(x, y, z)
    }

    #[test]
    fn put_get_remove() {
        let mut table = NodeTable::new();
        assert!(table.is_empty());
        assert_eq!(table.put(p(0, 0, 0), SideMask::ALL), None);
        assert_eq!(table.get(p(0, 0, 0)), Some(SideMask::ALL));
        assert!(table.contains(p(0, 0, 0)));
        assert_eq!(table.len(), 1);

        assert_eq!(table.remove(p(0, 0, 0)), Some(SideMask::ALL));
        assert_eq!(table.remove(p(0, 0, 0)), None);
        assert!(table.get(p(0, 0, 0)).is_none());
    }

    #[test]
    fn put_is_last_write_wins() {
        let mut table = NodeTable::new();
        table.put(p(1, 2, 3), SideMask::ALL);
        let prev = table.put(p(1, 2, 3), SideMask::axis(Side::Top));
        assert_eq!(prev, Some(SideMask::ALL));
        assert_eq!(table.get(p(1, 2, 3)), Some(SideMask::axis(Side::Top)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn connected_neighbors_require_mutual_faces() {
        let mut table = NodeTable::new();
        table.put(p(0, 0, 0), SideMask::ALL);
        // Axle along x: links to the centre.
        table.put(p(1, 0, 0), SideMask::axis(Side::Right));
        // Axle along z sitting on the x axis: does not face the centre.
        table.put(p(-1, 0, 0), SideMask::axis(Side::Back));
        // Vertical axle above: links.
        table.put(p(0, 1, 0), SideMask::axis(Side::Top));

        let mut linked = table.connected_neighbors(p(0, 0, 0));
        linked.sort();
        assert_eq!(linked, vec![p(0, 1, 0), p(1, 0, 0)]);

        assert_eq!(table.connected_neighbors(p(-1, 0, 0)), Vec::new());
        assert_eq!(table.connected_neighbors(p(9, 9, 9)), Vec::new());
    }

    #[test]
    fn linked_neighbors_for_hypothetical_mask() {
        let mut table = NodeTable::new();
        table.put(p(0, 0, 0), SideMask::NONE);
        table.put(p(1, 0, 0), SideMask::ALL);
        table.put(p(0, 0, 1), SideMask::ALL);

        let would_link = table.linked_neighbors(p(0, 0, 0), SideMask::from_sides([Side::Right]));
        assert_eq!(would_link, vec![(Side::Right, p(1, 0, 0))]);
        assert!(table.connected_neighbors(p(0, 0, 0)).is_empty());
    }

    #[test]
    fn faces_past_the_coordinate_range_never_link() {
        let mut table = NodeTable::new();
        table.put(p(i32::MAX, 0, 0), SideMask::ALL);
        table.put(p(i32::MIN, 0, 0), SideMask::ALL);
        table.put(p(i32::MAX - 1, 0, 0), SideMask::ALL);

        assert_eq!(table.connected_neighbors(p(i32::MAX, 0, 0)), vec![p(i32::MAX - 1, 0, 0)]);
        assert!(table.connected_neighbors(p(i32::MIN, 0, 0)).is_empty());
    }
}
