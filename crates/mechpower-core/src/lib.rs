//! Mechpower Core -- block network topology for mechanical power.
//!
//! Tracks a mutable set of blocks at integer 3D positions, each connecting to
//! its neighbours on a subset of its six sides, and keeps the connected
//! components ("networks") of that graph up to date as blocks are placed,
//! removed, or reconfigured.
//!
//! # Adjacency
//!
//! Two nodes at face-adjacent positions are linked iff each exposes the face
//! pointing at the other. A node with no links is a network of its own.
//!
//! # Network identity
//!
//! Network ids are stable across merges: when a placed node bridges several
//! networks the smallest id absorbs the rest. Removing a bridge splits the
//! network; one part keeps the id and every other part receives a fresh one.
//!
//! ```rust
//! use mechpower_core::position::{BlockPos, Side, SideMask};
//! use mechpower_core::topology::NetworkGraph;
//!
//! let mut graph = NetworkGraph::new();
//! let axle = SideMask::axis(Side::Right);
//! let a = graph.add_node(BlockPos::new(0, 0, 0), axle).unwrap();
//! let b = graph.add_node(BlockPos::new(1, 0, 0), axle).unwrap();
//! assert_eq!(a, b);
//! ```
//!
//! # Key Types
//!
//! - [`position::BlockPos`], [`position::Side`], [`position::SideMask`] --
//!   spatial primitives.
//! - [`table::NodeTable`] -- position -> connection mask.
//! - [`topology::NetworkGraph`] -- incremental connected components.
//! - [`event::TopologyEvent`] -- buffered merge/split/dissolve notices.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point for power arithmetic.

pub mod error;
pub mod event;
pub mod fixed;
pub mod id;
pub mod position;
pub mod table;
pub mod topology;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::NetworkError;
