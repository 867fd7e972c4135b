//! Visual sync layer: keeps rotating-part proxies in step with drive speed.
//!
//! Each rotating node owns at most one proxy, created when its rotating part
//! is observed on a placed block and destroyed only when the block goes away.
//! The proxy's rest orientation is fixed at creation from the block's facing.
//! While the network drives it, the proxy carries a spin animation; stopping
//! removes the animation entirely.
//!
//! The node -> proxy link is a plain lookup by position. Destroying one side
//! never destroys the other.

use std::collections::HashMap;

use mechpower_core::fixed::Fixed64;
use mechpower_core::id::ProxyId;
use mechpower_core::position::{BlockPos, Side};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use tracing::trace;

use crate::error::{PowerError, ProxyViolation};
use crate::render::RotationRenderer;

// ---------------------------------------------------------------------------
// Orientation
// ---------------------------------------------------------------------------

/// A rotation about one axis in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuarterTurn {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl QuarterTurn {
    pub const fn degrees(self) -> u16 {
        match self {
            QuarterTurn::None => 0,
            QuarterTurn::Cw90 => 90,
            QuarterTurn::Cw180 => 180,
            QuarterTurn::Cw270 => 270,
        }
    }

    /// Rotate 90 degrees clockwise.
    pub const fn rotate_cw(self) -> Self {
        match self {
            QuarterTurn::None => QuarterTurn::Cw90,
            QuarterTurn::Cw90 => QuarterTurn::Cw180,
            QuarterTurn::Cw180 => QuarterTurn::Cw270,
            QuarterTurn::Cw270 => QuarterTurn::None,
        }
    }

    pub const fn is_turned(self) -> bool {
        !matches!(self, QuarterTurn::None)
    }
}

/// Pitch, yaw and roll of a rendered part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Orientation {
    pub pitch: QuarterTurn,
    pub yaw: QuarterTurn,
    pub roll: QuarterTurn,
}

impl Orientation {
    pub const IDENTITY: Orientation = Orientation::new(QuarterTurn::None, QuarterTurn::None);

    /// Pitch and yaw with no roll.
    pub const fn new(pitch: QuarterTurn, yaw: QuarterTurn) -> Self {
        Self {
            pitch,
            yaw,
            roll: QuarterTurn::None,
        }
    }
}

/// Rest orientation per facing, indexed by `Side as usize`.
///
/// Vertical and back facings pitch the part; sideways facings yaw it.
const FACING_ORIENTATIONS: [Orientation; 6] = [
    // Top
    Orientation::new(QuarterTurn::Cw90, QuarterTurn::None),
    // Left
    Orientation::new(QuarterTurn::None, QuarterTurn::Cw90),
    // Right
    Orientation::new(QuarterTurn::None, QuarterTurn::Cw270),
    // Front
    Orientation::IDENTITY,
    // Back
    Orientation::new(QuarterTurn::Cw180, QuarterTurn::None),
    // Bottom
    Orientation::new(QuarterTurn::Cw270, QuarterTurn::None),
];

/// The rest orientation of a rotating part attached facing `facing`.
pub const fn rest_orientation(facing: Side) -> Orientation {
    FACING_ORIENTATIONS[facing as usize]
}

/// Axis a spinning part turns around, relative to its rest orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpinAxis {
    Pitch,
    Yaw,
    Roll,
}

impl SpinAxis {
    /// A yawed part spins about pitch, a pitched part about yaw, and an
    /// unturned part about roll.
    pub const fn for_rest(rest: Orientation) -> Self {
        if rest.yaw.is_turned() {
            SpinAxis::Pitch
        } else if rest.pitch.is_turned() {
            SpinAxis::Yaw
        } else {
            SpinAxis::Roll
        }
    }
}

// ---------------------------------------------------------------------------
// Proxy state
// ---------------------------------------------------------------------------

/// Spin animation carried by a driven proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinAnimation {
    pub axis: SpinAxis,
    pub speed: Fixed64,
}

/// Visual record for one rotating node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotatingProxy {
    /// Owning node. A back-reference only.
    pub position: BlockPos,
    pub facing: Side,
    pub rest: Orientation,
    /// Present only while the network drives the part.
    pub animation: Option<SpinAnimation>,
}

impl RotatingProxy {
    pub fn speed(&self) -> Fixed64 {
        self.animation.map_or(Fixed64::ZERO, |a| a.speed)
    }
}

/// What the aggregator asks of a rotating node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drive {
    Running(Fixed64),
    Stopped,
}

/// What [`VisualSync::apply`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// A spin animation was created.
    Started,
    /// The existing animation's speed was overwritten.
    SpeedChanged,
    /// The animation was removed.
    Stopped,
    /// Nothing needed doing.
    Unchanged,
}

// ---------------------------------------------------------------------------
// VisualSync
// ---------------------------------------------------------------------------

/// All rotating proxies, keyed by their owning node.
#[derive(Debug, Default)]
pub struct VisualSync {
    proxies: SlotMap<ProxyId, RotatingProxy>,
    by_position: HashMap<BlockPos, ProxyId>,
}

impl VisualSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the proxy for a rotating part facing `facing` at `position`.
    pub fn attach(
        &mut self,
        position: BlockPos,
        facing: Side,
        renderer: &mut impl RotationRenderer,
    ) -> Result<ProxyId, PowerError> {
        if self.by_position.contains_key(&position) {
            return Err(violation(position, ProxyViolation::AlreadyAttached));
        }
        let rest = rest_orientation(facing);
        let proxy = self.proxies.insert(RotatingProxy {
            position,
            facing,
            rest,
            animation: None,
        });
        self.by_position.insert(position, proxy);
        renderer.create_proxy(proxy, position, rest);
        trace!(%position, ?facing, "proxy attached");
        Ok(proxy)
    }

    /// Destroy the proxy owned by `position`.
    pub fn detach(
        &mut self,
        position: BlockPos,
        renderer: &mut impl RotationRenderer,
    ) -> Result<RotatingProxy, PowerError> {
        let proxy = self
            .by_position
            .remove(&position)
            .ok_or(violation(position, ProxyViolation::NotAttached))?;
        let state = self
            .proxies
            .remove(proxy)
            .ok_or(violation(position, ProxyViolation::NotAttached))?;
        renderer.destroy_proxy(proxy);
        trace!(%position, "proxy detached");
        Ok(state)
    }

    /// Bring the proxy at `position` in line with `drive`.
    ///
    /// A zero-speed drive is treated as stopped.
    pub fn apply(
        &mut self,
        position: BlockPos,
        drive: Drive,
        renderer: &mut impl RotationRenderer,
    ) -> Result<SyncAction, PowerError> {
        let (proxy, state) = self.lookup_mut(position)?;
        let spinning = state.animation.is_some();
        let action = match drive {
            Drive::Running(speed) if speed != Fixed64::ZERO => {
                if spinning {
                    if self.set_speed(position, speed, renderer)? {
                        SyncAction::SpeedChanged
                    } else {
                        SyncAction::Unchanged
                    }
                } else {
                    let axis = SpinAxis::for_rest(state.rest);
                    state.animation = Some(SpinAnimation { axis, speed });
                    renderer.start_rotation(proxy, axis, speed);
                    SyncAction::Started
                }
            }
            _ if spinning => {
                self.stop(position, renderer)?;
                SyncAction::Stopped
            }
            _ => SyncAction::Unchanged,
        };
        if action != SyncAction::Unchanged {
            trace!(%position, ?action, speed = %self.speed_at(position), "proxy synced");
        }
        Ok(action)
    }

    /// Overwrite the speed of a spinning proxy. Returns whether it changed.
    pub(crate) fn set_speed(
        &mut self,
        position: BlockPos,
        speed: Fixed64,
        renderer: &mut impl RotationRenderer,
    ) -> Result<bool, PowerError> {
        let (proxy, state) = self.lookup_mut(position)?;
        let animation = state
            .animation
            .as_mut()
            .ok_or(violation(position, ProxyViolation::NotSpinning))?;
        if animation.speed == speed {
            return Ok(false);
        }
        animation.speed = speed;
        renderer.set_rotation_speed(proxy, speed);
        Ok(true)
    }

    /// Remove the spin animation of a spinning proxy.
    pub(crate) fn stop(&mut self, position: BlockPos, renderer: &mut impl RotationRenderer) -> Result<(), PowerError> {
        let (proxy, state) = self.lookup_mut(position)?;
        if state.animation.take().is_none() {
            return Err(violation(position, ProxyViolation::NotSpinning));
        }
        renderer.stop_rotation(proxy);
        Ok(())
    }

    // -- Queries --

    pub fn is_attached(&self, position: BlockPos) -> bool {
        self.by_position.contains_key(&position)
    }

    pub fn proxy_id(&self, position: BlockPos) -> Option<ProxyId> {
        self.by_position.get(&position).copied()
    }

    pub fn proxy(&self, position: BlockPos) -> Option<&RotatingProxy> {
        self.proxies.get(self.proxy_id(position)?)
    }

    /// Current spin speed at `position`; zero when idle or absent.
    pub fn speed_at(&self, position: BlockPos) -> Fixed64 {
        self.proxy(position).map_or(Fixed64::ZERO, RotatingProxy::speed)
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Number of proxies currently carrying a spin animation.
    pub fn spinning_count(&self) -> usize {
        self.proxies.values().filter(|p| p.animation.is_some()).count()
    }

    fn lookup_mut(&mut self, position: BlockPos) -> Result<(ProxyId, &mut RotatingProxy), PowerError> {
        let proxy = self
            .proxy_id(position)
            .ok_or(violation(position, ProxyViolation::NotAttached))?;
        let state = self
            .proxies
            .get_mut(proxy)
            .ok_or(violation(position, ProxyViolation::NotAttached))?;
        Ok((proxy, state))
    }
}

fn violation(position: BlockPos, reason: ProxyViolation) -> PowerError {
    PowerError::ProxyStateViolation { position, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RecordingRenderer, RenderCommand};

    fn p(x: i32) -> BlockPos {
        BlockPos::new(x, 0, 0)
    }

    fn fixed(v: f64) -> Fixed64 {
        Fixed64::from_num(v)
    }

    #[test]
    fn facing_table_is_total_and_distinct() {
        let rests: Vec<_> = Side::all().into_iter().map(rest_orientation).collect();
        for (i, a) in rests.iter().enumerate() {
            for b in &rests[i + 1..] {
                assert_ne!(a, b);
            }
            assert_eq!(a.roll, QuarterTurn::None);
        }
        assert_eq!(rest_orientation(Side::Front), Orientation::IDENTITY);
        assert_eq!(rest_orientation(Side::Back).pitch, QuarterTurn::Cw180);
        assert_eq!(rest_orientation(Side::Top).pitch, QuarterTurn::Cw90);
        assert_eq!(rest_orientation(Side::Bottom).pitch, QuarterTurn::Cw270);
        assert_eq!(rest_orientation(Side::Left).yaw, QuarterTurn::Cw90);
        assert_eq!(rest_orientation(Side::Right).yaw, QuarterTurn::Cw270);
    }

    #[test]
    fn spin_axis_follows_rest_orientation() {
        assert_eq!(SpinAxis::for_rest(rest_orientation(Side::Left)), SpinAxis::Pitch);
        assert_eq!(SpinAxis::for_rest(rest_orientation(Side::Top)), SpinAxis::Yaw);
        assert_eq!(SpinAxis::for_rest(rest_orientation(Side::Front)), SpinAxis::Roll);
    }

    #[test]
    fn quarter_turns_cycle() {
        let mut turn = QuarterTurn::None;
        for expected in [90, 180, 270, 0] {
            turn = turn.rotate_cw();
            assert_eq!(turn.degrees(), expected);
        }
    }

    #[test]
    fn attach_twice_is_a_violation() {
        let mut visual = VisualSync::new();
        let mut renderer = RecordingRenderer::new();
        visual.attach(p(0), Side::Front, &mut renderer).unwrap();
        let err = visual.attach(p(0), Side::Back, &mut renderer).unwrap_err();
        assert_eq!(
            err,
            PowerError::ProxyStateViolation {
                position: p(0),
                reason: ProxyViolation::AlreadyAttached
            }
        );
        assert_eq!(visual.len(), 1);
        assert_eq!(renderer.commands.len(), 1);
    }

    #[test]
    fn drive_lifecycle_start_change_stop() {
        let mut visual = VisualSync::new();
        let mut renderer = RecordingRenderer::new();
        let proxy = visual.attach(p(0), Side::Left, &mut renderer).unwrap();
        renderer.take();

        let started = visual.apply(p(0), Drive::Running(fixed(2.0)), &mut renderer).unwrap();
        assert_eq!(started, SyncAction::Started);
        assert_eq!(visual.speed_at(p(0)), fixed(2.0));

        let same = visual.apply(p(0), Drive::Running(fixed(2.0)), &mut renderer).unwrap();
        assert_eq!(same, SyncAction::Unchanged);

        let changed = visual.apply(p(0), Drive::Running(fixed(3.5)), &mut renderer).unwrap();
        assert_eq!(changed, SyncAction::SpeedChanged);

        let stopped = visual.apply(p(0), Drive::Stopped, &mut renderer).unwrap();
        assert_eq!(stopped, SyncAction::Stopped);
        assert!(visual.proxy(p(0)).unwrap().animation.is_none());

        let idle = visual.apply(p(0), Drive::Stopped, &mut renderer).unwrap();
        assert_eq!(idle, SyncAction::Unchanged);

        assert_eq!(
            renderer.take(),
            vec![
                RenderCommand::StartRotation {
                    proxy,
                    axis: SpinAxis::Pitch,
                    speed: fixed(2.0)
                },
                RenderCommand::SetRotationSpeed {
                    proxy,
                    speed: fixed(3.5)
                },
                RenderCommand::StopRotation { proxy },
            ]
        );
    }

    #[test]
    fn zero_speed_drive_counts_as_stopped() {
        let mut visual = VisualSync::new();
        let mut renderer = RecordingRenderer::new();
        visual.attach(p(0), Side::Front, &mut renderer).unwrap();

        let action = visual.apply(p(0), Drive::Running(Fixed64::ZERO), &mut renderer).unwrap();
        assert_eq!(action, SyncAction::Unchanged);

        visual.apply(p(0), Drive::Running(fixed(1.0)), &mut renderer).unwrap();
        let action = visual.apply(p(0), Drive::Running(Fixed64::ZERO), &mut renderer).unwrap();
        assert_eq!(action, SyncAction::Stopped);
    }

    #[test]
    fn low_level_updates_require_spinning_proxy() {
        let mut visual = VisualSync::new();
        let mut renderer = RecordingRenderer::new();

        assert!(matches!(
            visual.set_speed(p(0), fixed(1.0), &mut renderer),
            Err(PowerError::ProxyStateViolation {
                reason: ProxyViolation::NotAttached,
                ..
            })
        ));

        visual.attach(p(0), Side::Front, &mut renderer).unwrap();
        assert!(matches!(
            visual.stop(p(0), &mut renderer),
            Err(PowerError::ProxyStateViolation {
                reason: ProxyViolation::NotSpinning,
                ..
            })
        ));

        visual.apply(p(0), Drive::Running(fixed(1.0)), &mut renderer).unwrap();
        assert!(visual.set_speed(p(0), fixed(4.0), &mut renderer).unwrap());
        assert!(!visual.set_speed(p(0), fixed(4.0), &mut renderer).unwrap());
        visual.stop(p(0), &mut renderer).unwrap();
        assert_eq!(visual.spinning_count(), 0);
    }

    #[test]
    fn detach_destroys_proxy_only_once() {
        let mut visual = VisualSync::new();
        let mut renderer = RecordingRenderer::new();
        let proxy = visual.attach(p(3), Side::Top, &mut renderer).unwrap();
        renderer.take();

        let state = visual.detach(p(3), &mut renderer).unwrap();
        assert_eq!(state.position, p(3));
        assert_eq!(renderer.take(), vec![RenderCommand::DestroyProxy { proxy }]);
        assert!(visual.detach(p(3), &mut renderer).is_err());
        assert!(visual.is_empty());
    }
}
