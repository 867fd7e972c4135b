//! Power aggregation over one network.
//!
//! Runs whenever a producer changes. The network is walked twice: once to
//! total active producer power and count consumers, once to push the
//! resulting drive to every rotating member.
//!
//! `drive_speed = total_power / consumer_count`, where the count starts at a
//! baseline load (one by default) so an unloaded network still divides
//! cleanly. An inactive network drives nothing regardless of its total.
//!
//! The result depends only on the current members and their components, so
//! aggregating an unchanged network again pushes nothing new.

use std::num::NonZeroU32;

use mechpower_core::fixed::Fixed64;
use mechpower_core::id::NetworkId;
use mechpower_core::position::BlockPos;
use mechpower_core::topology::NetworkGraph;
use tracing::debug;

use crate::components::ComponentLookup;
use crate::error::PowerError;
use crate::render::RotationRenderer;
use crate::visual::{Drive, SyncAction, VisualSync};

/// Aggregate power state of one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkPower {
    pub network: NetworkId,
    /// Sum of active producer power.
    pub total_power: Fixed64,
    /// Baseline plus explicit consumers.
    pub consumer_count: u32,
    /// Whether any producer in the network is active.
    pub active: bool,
    pub drive_speed: Fixed64,
}

impl NetworkPower {
    /// The drive every rotating member should receive.
    pub fn drive(&self) -> Drive {
        if self.active {
            Drive::Running(self.drive_speed)
        } else {
            Drive::Stopped
        }
    }
}

/// Outcome of one aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    pub power: NetworkPower,
    /// One entry per rotating member, in position order.
    pub actions: Vec<(BlockPos, SyncAction)>,
}

impl Aggregation {
    /// Whether the pass changed any visual state.
    pub fn changed_visuals(&self) -> bool {
        self.actions
            .iter()
            .any(|(_, action)| *action != SyncAction::Unchanged)
    }
}

/// Total the producers and consumers of `network`.
///
/// A stale id measures as an empty, inactive network.
pub fn measure(
    graph: &NetworkGraph,
    components: &impl ComponentLookup,
    network: NetworkId,
    baseline_consumers: NonZeroU32,
) -> NetworkPower {
    let mut consumer_count = baseline_consumers.get();
    let mut total_power = Fixed64::ZERO;
    let mut active = false;

    for position in graph.member_positions(network) {
        if components.is_consumer_at(position) {
            consumer_count = consumer_count.saturating_add(1);
        }
        if let Some(producer) = components.producer_at(position) {
            active |= producer.active;
            total_power = total_power.saturating_add(producer.output());
        }
    }

    let drive_speed = if active {
        total_power / i64::from(consumer_count)
    } else {
        Fixed64::ZERO
    };

    NetworkPower {
        network,
        total_power,
        consumer_count,
        active,
        drive_speed,
    }
}

/// Measure `network` and push its drive to every rotating member.
pub fn aggregate(
    graph: &NetworkGraph,
    components: &impl ComponentLookup,
    visual: &mut VisualSync,
    renderer: &mut impl RotationRenderer,
    network: NetworkId,
    baseline_consumers: NonZeroU32,
) -> Result<Aggregation, PowerError> {
    let power = measure(graph, components, network, baseline_consumers);
    let drive = power.drive();

    let mut actions = Vec::new();
    for position in graph.member_positions(network) {
        if visual.is_attached(position) {
            let action = visual.apply(position, drive, renderer)?;
            actions.push((position, action));
        }
    }

    debug!(
        %network,
        total_power = %power.total_power,
        consumers = power.consumer_count,
        active = power.active,
        drive_speed = %power.drive_speed,
        rotating = actions.len(),
        "network aggregated"
    );
    Ok(Aggregation { power, actions })
}
