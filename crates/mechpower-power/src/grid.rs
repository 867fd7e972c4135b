//! Host-facing facade over topology, components, aggregation and visuals.
//!
//! Every lifecycle notification from the host maps to one synchronous call.
//! Structural changes update the topology graph only; power is re-derived
//! when a producer reports a change or when the host asks for a refresh
//! (after world load, or after removing blocks from a running network).

use std::num::NonZeroU32;

use mechpower_core::NetworkError;
use mechpower_core::event::TopologyEvent;
use mechpower_core::fixed::Fixed64;
use mechpower_core::id::{NetworkId, ProxyId};
use mechpower_core::position::{BlockPos, NetworkNode, Side, SideMask};
use mechpower_core::topology::NetworkGraph;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregate::{Aggregation, NetworkPower, aggregate, measure};
use crate::components::{BlockStore, ProducerState};
use crate::error::PowerError;
use crate::render::RotationRenderer;
use crate::visual::{RotatingProxy, VisualSync};

/// Tunables for a [`PowerGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Load every network carries before any explicit consumer.
    pub baseline_consumers: NonZeroU32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            baseline_consumers: NonZeroU32::MIN,
        }
    }
}

/// The mechanical power system of one world.
#[derive(Debug)]
pub struct PowerGrid<R: RotationRenderer> {
    graph: NetworkGraph,
    components: BlockStore,
    visual: VisualSync,
    renderer: R,
    config: GridConfig,
}

impl<R: RotationRenderer> PowerGrid<R> {
    pub fn new(renderer: R) -> Self {
        Self::with_config(GridConfig::default(), renderer)
    }

    pub fn with_config(config: GridConfig, renderer: R) -> Self {
        info!(baseline_consumers = config.baseline_consumers.get(), "power grid created");
        Self {
            graph: NetworkGraph::new(),
            components: BlockStore::new(),
            visual: VisualSync::new(),
            renderer,
            config,
        }
    }

    // -- Structural notifications --

    pub fn node_created(&mut self, position: BlockPos, mask: SideMask) -> Result<NetworkId, PowerError> {
        Ok(self.graph.add_node(position, mask)?)
    }

    /// The block at `position` was destroyed. Its proxy and components go
    /// with it.
    pub fn node_removed(&mut self, position: BlockPos) -> Result<(), PowerError> {
        self.graph.remove_node(position)?;
        self.release_block(position)
    }

    pub fn node_mask_changed(&mut self, position: BlockPos, mask: SideMask) -> Result<NetworkId, PowerError> {
        Ok(self.graph.update_node(position, mask)?)
    }

    /// Bulk placement, as on chunk load.
    pub fn nodes_created(&mut self, positions: &[BlockPos], mask: SideMask) -> Result<Vec<NetworkId>, PowerError> {
        let networks = self.graph.add_nodes(positions, mask)?;
        debug!(nodes = positions.len(), networks = networks.len(), "bulk placement");
        Ok(networks)
    }

    /// Bulk removal, as on chunk unload.
    pub fn nodes_removed(&mut self, positions: &[BlockPos]) -> Result<(), PowerError> {
        self.graph.remove_nodes(positions)?;
        for &position in positions {
            self.release_block(position)?;
        }
        debug!(nodes = positions.len(), "bulk removal");
        Ok(())
    }

    // -- Component notifications --

    /// A rotating part facing `facing` appeared on the placed block at
    /// `position`.
    pub fn rotating_part_added(&mut self, position: BlockPos, facing: Side) -> Result<ProxyId, PowerError> {
        self.require_node(position)?;
        self.visual.attach(position, facing, &mut self.renderer)
    }

    /// Mark or unmark the block at `position` as a consumer. Returns whether
    /// the marker changed.
    pub fn set_consumer(&mut self, position: BlockPos, consumer: bool) -> Result<bool, PowerError> {
        self.require_node(position)?;
        Ok(self.components.set_consumer(position, consumer))
    }

    /// A producer reported its state. The first report attaches the
    /// producer; later ones overwrite it. The producer's network is
    /// aggregated afterwards.
    pub fn producer_state_changed(
        &mut self,
        position: BlockPos,
        active: bool,
        power: Fixed64,
    ) -> Result<Aggregation, PowerError> {
        let network = self.graph.network_of(position)?;
        if power < Fixed64::ZERO {
            return Err(PowerError::NegativePower { position, power });
        }
        self.components
            .set_producer(position, ProducerState::new(active, power));
        self.refresh_network(network)
    }

    /// The producer at `position` went away while its block stayed.
    pub fn producer_removed(&mut self, position: BlockPos) -> Result<Aggregation, PowerError> {
        let network = self.graph.network_of(position)?;
        self.components.remove_producer(position);
        self.refresh_network(network)
    }

    // -- On-demand aggregation --

    /// Re-aggregate the network containing `position`.
    pub fn refresh(&mut self, position: BlockPos) -> Result<Aggregation, PowerError> {
        let network = self.graph.network_of(position)?;
        self.refresh_network(network)
    }

    /// Re-aggregate every network, in id order.
    pub fn refresh_all(&mut self) -> Result<Vec<Aggregation>, PowerError> {
        self.graph
            .all_networks()
            .into_iter()
            .map(|network| self.refresh_network(network))
            .collect()
    }

    // -- Queries --

    pub fn network_of(&self, position: BlockPos) -> Result<NetworkId, PowerError> {
        Ok(self.graph.network_of(position)?)
    }

    pub fn members_of(&self, network: NetworkId) -> Vec<NetworkNode> {
        self.graph.members_of(network)
    }

    pub fn all_networks(&self) -> Vec<NetworkId> {
        self.graph.all_networks()
    }

    /// Power state of `network` as it would be aggregated now. Touches no
    /// visuals.
    pub fn network_power(&self, network: NetworkId) -> NetworkPower {
        measure(&self.graph, &self.components, network, self.config.baseline_consumers)
    }

    pub fn proxy(&self, position: BlockPos) -> Option<&RotatingProxy> {
        self.visual.proxy(position)
    }

    /// Spin speed currently shown at `position`; zero when idle or not
    /// rotating.
    pub fn drive_speed_at(&self, position: BlockPos) -> Fixed64 {
        self.visual.speed_at(position)
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn graph(&self) -> &NetworkGraph {
        &self.graph
    }

    pub fn components(&self) -> &BlockStore {
        &self.components
    }

    pub fn visual(&self) -> &VisualSync {
        &self.visual
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn drain_topology_events(&mut self) -> Vec<TopologyEvent> {
        self.graph.drain_events()
    }

    // -- Internal --

    fn refresh_network(&mut self, network: NetworkId) -> Result<Aggregation, PowerError> {
        aggregate(
            &self.graph,
            &self.components,
            &mut self.visual,
            &mut self.renderer,
            network,
            self.config.baseline_consumers,
        )
    }

    fn require_node(&self, position: BlockPos) -> Result<(), PowerError> {
        if self.graph.contains(position) {
            Ok(())
        } else {
            Err(NetworkError::UnknownNode(position).into())
        }
    }

    /// Drop everything a removed block owned.
    fn release_block(&mut self, position: BlockPos) -> Result<(), PowerError> {
        if self.visual.is_attached(position) {
            self.visual.detach(position, &mut self.renderer)?;
        }
        self.components.clear_block(position);
        Ok(())
    }
}
