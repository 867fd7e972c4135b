//! Mechpower Data -- scene and config files for the power grid.
//!
//! Scenes describe a set of placed blocks with their connecting sides and
//! power components. They are read from RON, JSON or TOML (detected from the
//! file extension) and turned into a ready-to-run [`PowerGrid`].
//!
//! [`PowerGrid`]: mechpower_power::PowerGrid

pub mod loader;
pub mod scene;
pub mod schema;

pub use loader::{DataLoadError, Format};
pub use scene::{build_grid, load_config, load_scene};
