//! Block positions, the six block sides, and connection masks.

use serde::{Deserialize, Serialize};

use crate::error::NetworkError;

// ---------------------------------------------------------------------------
// BlockPos
// ---------------------------------------------------------------------------

/// An integer position in the block world.
///
/// Ordered by `x`, then `y`, then `z`, so sets of positions enumerate
/// deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The position one step away through `side`, or `None` past the edge
    /// of the coordinate range.
    pub fn offset(self, side: Side) -> Option<Self> {
        let (dx, dy, dz) = side.offset();
        Some(Self::new(
            self.x.checked_add(dx)?,
            self.y.checked_add(dy)?,
            self.z.checked_add(dz)?,
        ))
    }
}

impl From<[i32; 3]> for BlockPos {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl std::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// One of the six axis-aligned faces of a block.
///
/// The declaration order is the bit order used by [`SideMask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// +y
    Top,
    /// -x
    Left,
    /// +x
    Right,
    /// -z
    Front,
    /// +z
    Back,
    /// -y
    Bottom,
}

impl Side {
    /// All six sides, in bit order.
    pub const fn all() -> [Side; 6] {
        [
            Side::Top,
            Side::Left,
            Side::Right,
            Side::Front,
            Side::Back,
            Side::Bottom,
        ]
    }

    /// Unit offset for this side.
    pub const fn offset(self) -> (i32, i32, i32) {
        match self {
            Side::Top => (0, 1, 0),
            Side::Left => (-1, 0, 0),
            Side::Right => (1, 0, 0),
            Side::Front => (0, 0, -1),
            Side::Back => (0, 0, 1),
            Side::Bottom => (0, -1, 0),
        }
    }

    /// The face pointing the other way.
    pub const fn opposite(self) -> Self {
        match self {
            Side::Top => Side::Bottom,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Front => Side::Back,
            Side::Back => Side::Front,
            Side::Bottom => Side::Top,
        }
    }

    /// The mask bit for this side.
    pub const fn bit(self) -> u8 {
        1 << self as u8
    }
}

// ---------------------------------------------------------------------------
// SideMask
// ---------------------------------------------------------------------------

/// Which of a block's six sides take part in connectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SideMask(u8);

impl SideMask {
    /// No connecting sides.
    pub const NONE: SideMask = SideMask(0);
    /// Connects on every side.
    pub const ALL: SideMask = SideMask(0b0011_1111);

    /// Build a mask from raw bits. Bits 6 and 7 do not name a side.
    pub fn from_bits(bits: u8) -> Result<Self, NetworkError> {
        if bits & !Self::ALL.0 != 0 {
            return Err(NetworkError::InvalidMask(bits));
        }
        Ok(Self(bits))
    }

    /// Build a mask that connects on exactly the given sides.
    pub fn from_sides(sides: impl IntoIterator<Item = Side>) -> Self {
        Self(sides.into_iter().fold(0, |acc, side| acc | side.bit()))
    }

    /// A mask connecting along one axis: `side` and its opposite.
    pub fn axis(side: Side) -> Self {
        Self::from_sides([side, side.opposite()])
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, side: Side) -> bool {
        self.0 & side.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the connecting sides in bit order.
    pub fn sides(self) -> impl Iterator<Item = Side> {
        Side::all().into_iter().filter(move |s| self.contains(*s))
    }
}

impl TryFrom<u8> for SideMask {
    type Error = NetworkError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::from_bits(bits)
    }
}

impl From<SideMask> for u8 {
    fn from(mask: SideMask) -> Self {
        mask.0
    }
}

/// Whether a node with `mask` at some position links to a node with
/// `neighbor_mask` lying on its `side`. Both faces must participate.
pub const fn links(mask: SideMask, side: Side, neighbor_mask: SideMask) -> bool {
    mask.contains(side) && neighbor_mask.contains(side.opposite())
}

// ---------------------------------------------------------------------------
// NetworkNode
// ---------------------------------------------------------------------------

/// A placed node: its position and the sides it connects on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkNode {
    pub position: BlockPos,
    pub sides: SideMask,
}
