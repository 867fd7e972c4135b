//! Outbound calls into the renderer.

use mechpower_core::fixed::Fixed64;
use mechpower_core::id::ProxyId;
use mechpower_core::position::BlockPos;

use crate::visual::{Orientation, SpinAxis};

/// The render collaborator that owns the actual rotating entities.
///
/// The visual layer guarantees the call sequence per proxy: one
/// `create_proxy`, then any number of start/speed/stop cycles, then one
/// `destroy_proxy`.
pub trait RotationRenderer {
    fn create_proxy(&mut self, proxy: ProxyId, position: BlockPos, rest: Orientation);
    fn destroy_proxy(&mut self, proxy: ProxyId);
    fn start_rotation(&mut self, proxy: ProxyId, axis: SpinAxis, speed: Fixed64);
    fn set_rotation_speed(&mut self, proxy: ProxyId, speed: Fixed64);
    fn stop_rotation(&mut self, proxy: ProxyId);
}

/// One recorded renderer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCommand {
    CreateProxy {
        proxy: ProxyId,
        position: BlockPos,
        rest: Orientation,
    },
    DestroyProxy {
        proxy: ProxyId,
    },
    StartRotation {
        proxy: ProxyId,
        axis: SpinAxis,
        speed: Fixed64,
    },
    SetRotationSpeed {
        proxy: ProxyId,
        speed: Fixed64,
    },
    StopRotation {
        proxy: ProxyId,
    },
}

/// Keeps every call in order. Used by headless hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    pub commands: Vec<RenderCommand>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the commands recorded since the last call.
    pub fn take(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl RotationRenderer for RecordingRenderer {
    fn create_proxy(&mut self, proxy: ProxyId, position: BlockPos, rest: Orientation) {
        self.commands.push(RenderCommand::CreateProxy {
            proxy,
            position,
            rest,
        });
    }

    fn destroy_proxy(&mut self, proxy: ProxyId) {
        self.commands.push(RenderCommand::DestroyProxy { proxy });
    }

    fn start_rotation(&mut self, proxy: ProxyId, axis: SpinAxis, speed: Fixed64) {
        self.commands
            .push(RenderCommand::StartRotation { proxy, axis, speed });
    }

    fn set_rotation_speed(&mut self, proxy: ProxyId, speed: Fixed64) {
        self.commands
            .push(RenderCommand::SetRotationSpeed { proxy, speed });
    }

    fn stop_rotation(&mut self, proxy: ProxyId) {
        self.commands.push(RenderCommand::StopRotation { proxy });
    }
}

/// Discards every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl RotationRenderer for NullRenderer {
    fn create_proxy(&mut self, _proxy: ProxyId, _position: BlockPos, _rest: Orientation) {}
    fn destroy_proxy(&mut self, _proxy: ProxyId) {}
    fn start_rotation(&mut self, _proxy: ProxyId, _axis: SpinAxis, _speed: Fixed64) {}
    fn set_rotation_speed(&mut self, _proxy: ProxyId, _speed: Fixed64) {}
    fn stop_rotation(&mut self, _proxy: ProxyId) {}
}
