//! Mechpower Power -- power aggregation and rotating-part visuals.
//!
//! Sits on top of [`mechpower_core`]'s topology graph. Producers feed power
//! into their network, consumers share it, and every rotating part in the
//! network spins at the resulting drive speed.
//!
//! # Design
//!
//! - Power components live beside the graph, keyed by position
//!   ([`components::BlockStore`]), and are read through
//!   [`components::ComponentLookup`].
//! - Aggregation runs on demand per network ([`aggregate::aggregate`]);
//!   nothing is recomputed per tick.
//! - Visual state is a projection of power state. The renderer only ever
//!   sees the transitions ([`render::RotationRenderer`]).
//! - [`grid::PowerGrid`] bundles the pieces behind one synchronous facade
//!   for the host.
//!
//! ```rust
//! use mechpower_core::fixed::Fixed64;
//! use mechpower_core::position::{BlockPos, Side, SideMask};
//! use mechpower_power::grid::PowerGrid;
//! use mechpower_power::render::NullRenderer;
//!
//! let mut grid = PowerGrid::new(NullRenderer);
//! let axle = SideMask::axis(Side::Right);
//! grid.node_created(BlockPos::new(0, 0, 0), axle).unwrap();
//! grid.node_created(BlockPos::new(1, 0, 0), axle).unwrap();
//! grid.rotating_part_added(BlockPos::new(1, 0, 0), Side::Right).unwrap();
//!
//! grid.producer_state_changed(BlockPos::new(0, 0, 0), true, Fixed64::from_num(8))
//!     .unwrap();
//! assert_eq!(grid.drive_speed_at(BlockPos::new(1, 0, 0)), Fixed64::from_num(8));
//! ```

pub mod aggregate;
pub mod components;
pub mod error;
pub mod grid;
pub mod render;
pub mod visual;

pub use error::PowerError;
pub use grid::{GridConfig, PowerGrid};
