//! Serde structs for scene files.
//!
//! A scene lists placed blocks by position. Each block names the sides it
//! connects on and, optionally, the power components it carries.

use mechpower_core::position::Side;
use mechpower_power::GridConfig;
use serde::{Deserialize, Serialize};

/// A whole scene file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneData {
    #[serde(default)]
    pub config: GridConfig,
    #[serde(default)]
    pub blocks: Vec<BlockData>,
}

/// One placed block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockData {
    pub pos: [i32; 3],
    /// Connecting sides. Repeats are harmless.
    #[serde(default)]
    pub sides: Vec<Side>,
    #[serde(default)]
    pub producer: Option<ProducerData>,
    #[serde(default)]
    pub consumer: bool,
    /// Facing of the block's rotating part, if it has one.
    #[serde(default)]
    pub axle: Option<Side>,
}

/// A producer component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProducerData {
    #[serde(default = "default_true")]
    pub active: bool,
    pub power: f64,
}

fn default_true() -> bool {
    true
}
