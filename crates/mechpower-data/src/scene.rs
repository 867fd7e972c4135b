//! Scene loading and grid construction.

use std::collections::HashSet;
use std::path::Path;

use mechpower_core::fixed::Fixed64;
use mechpower_core::position::{BlockPos, SideMask};
use mechpower_power::render::RotationRenderer;
use mechpower_power::{GridConfig, PowerGrid};
use tracing::info;

use crate::loader::{DataLoadError, deserialize_file};
use crate::schema::{BlockData, SceneData};

/// Read a scene file (RON, JSON or TOML).
pub fn load_scene(path: &Path) -> Result<SceneData, DataLoadError> {
    let scene: SceneData = deserialize_file(path)?;
    info!(path = %path.display(), blocks = scene.blocks.len(), "scene loaded");
    Ok(scene)
}

/// Read a standalone grid config file.
pub fn load_config(path: &Path) -> Result<GridConfig, DataLoadError> {
    deserialize_file(path)
}

/// Build a running grid from `scene`.
///
/// Blocks are placed in bulk, one batch per distinct mask. Components are
/// attached afterwards and every network is aggregated once at the end.
pub fn build_grid<R: RotationRenderer>(scene: &SceneData, renderer: R) -> Result<PowerGrid<R>, DataLoadError> {
    let batches = group_by_mask(&scene.blocks)?;
    let producers = scene
        .blocks
        .iter()
        .filter_map(|block| Some((BlockPos::from(block.pos), block.producer?)))
        .map(|(position, producer)| {
            let power = Fixed64::checked_from_num(producer.power).ok_or_else(|| DataLoadError::InvalidScene {
                detail: format!("producer at {position} has unrepresentable power {}", producer.power),
            })?;
            Ok((position, producer.active, power))
        })
        .collect::<Result<Vec<_>, DataLoadError>>()?;

    let mut grid = PowerGrid::with_config(scene.config, renderer);
    for (mask, positions) in &batches {
        grid.nodes_created(positions, *mask)?;
    }

    for block in &scene.blocks {
        let position = BlockPos::from(block.pos);
        if block.consumer {
            grid.set_consumer(position, true)?;
        }
        if let Some(facing) = block.axle {
            grid.rotating_part_added(position, facing)?;
        }
    }
    for (position, active, power) in producers {
        grid.producer_state_changed(position, active, power)?;
    }
    grid.refresh_all()?;

    info!(
        blocks = scene.blocks.len(),
        networks = grid.all_networks().len(),
        rotating = grid.visual().len(),
        "scene built"
    );
    Ok(grid)
}

/// Positions grouped by mask, in order of first appearance.
fn group_by_mask(blocks: &[BlockData]) -> Result<Vec<(SideMask, Vec<BlockPos>)>, DataLoadError> {
    let mut seen = HashSet::with_capacity(blocks.len());
    let mut batches: Vec<(SideMask, Vec<BlockPos>)> = Vec::new();
    for block in blocks {
        let position = BlockPos::from(block.pos);
        if !seen.insert(position) {
            return Err(DataLoadError::InvalidScene {
                detail: format!("block {position} is listed twice"),
            });
        }
        let mask = SideMask::from_sides(block.sides.iter().copied());
        match batches.iter_mut().find(|(m, _)| *m == mask) {
            Some((_, positions)) => positions.push(position),
            None => batches.push((mask, vec![position])),
        }
    }
    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{Format, deserialize_str};
    use mechpower_core::position::Side;
    use mechpower_core::test_utils::{fixed, pos};
    use mechpower_power::render::{NullRenderer, RecordingRenderer};
    use mechpower_power::PowerError;

    fn block(x: i32, sides: &[Side]) -> BlockData {
        BlockData {
            pos: [x, 0, 0],
            sides: sides.to_vec(),
            producer: None,
            consumer: false,
            axle: None,
        }
    }

    const LINE_RON: &str = r#"(
        blocks: [
            (pos: (0, 0, 0), sides: [Left, Right], producer: Some((power: 9.0))),
            (pos: (1, 0, 0), sides: [Left, Right], consumer: true),
            (pos: (2, 0, 0), sides: [Left, Right], axle: Some(Right)),
        ],
    )"#;

    #[test]
    fn line_scene_spins_at_shared_speed() {
        let scene: SceneData = deserialize_str(LINE_RON, Format::Ron, Path::new("line.ron")).unwrap();
        let grid = build_grid(&scene, RecordingRenderer::new()).unwrap();

        assert_eq!(grid.all_networks().len(), 1);
        assert_eq!(grid.drive_speed_at(pos(2, 0, 0)), fixed(4.5));
    }

    #[test]
    fn mixed_masks_are_batched_separately() {
        let scene = SceneData {
            config: GridConfig::default(),
            blocks: vec![
                block(0, &[Side::Right]),
                block(1, &[Side::Left, Side::Right]),
                block(2, &[Side::Left]),
                block(4, &[Side::Left, Side::Right]),
            ],
        };
        let batches = group_by_mask(&scene.blocks).unwrap();
        assert_eq!(batches.len(), 3);

        let grid = build_grid(&scene, NullRenderer).unwrap();
        assert_eq!(grid.network_of(pos(0, 0, 0)).unwrap(), grid.network_of(pos(2, 0, 0)).unwrap());
        assert_ne!(grid.network_of(pos(0, 0, 0)).unwrap(), grid.network_of(pos(4, 0, 0)).unwrap());
    }

    #[test]
    fn duplicate_block_is_invalid() {
        let scene = SceneData {
            config: GridConfig::default(),
            blocks: vec![block(0, &[]), block(0, &[Side::Top])],
        };
        assert!(matches!(
            build_grid(&scene, NullRenderer),
            Err(DataLoadError::InvalidScene { .. })
        ));
    }

    #[test]
    fn negative_producer_power_is_rejected() {
        let mut producer = block(0, &[]);
        producer.producer = Some(crate::schema::ProducerData {
            active: true,
            power: -3.0,
        });
        let scene = SceneData {
            config: GridConfig::default(),
            blocks: vec![producer],
        };
        assert!(matches!(
            build_grid(&scene, NullRenderer),
            Err(DataLoadError::Grid(PowerError::NegativePower { .. }))
        ));
    }

    #[test]
    fn nan_producer_power_is_rejected() {
        let mut producer = block(0, &[]);
        producer.producer = Some(crate::schema::ProducerData {
            active: true,
            power: f64::NAN,
        });
        let scene = SceneData {
            config: GridConfig::default(),
            blocks: vec![producer],
        };
        assert!(matches!(
            build_grid(&scene, NullRenderer),
            Err(DataLoadError::InvalidScene { .. })
        ));
    }
}
