//! Per-block power components and the lookup seam the aggregator reads.
//!
//! The host owns block entities; the aggregator only needs to ask, for a
//! position, whether a producer or consumer lives there. [`BlockStore`] is a
//! plain in-memory implementation for headless hosts and tests.

use std::collections::{HashMap, HashSet};

use mechpower_core::fixed::Fixed64;
use mechpower_core::position::BlockPos;
use serde::{Deserialize, Serialize};

/// A block that feeds power into its network while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerState {
    pub active: bool,
    /// Non-negative power magnitude.
    pub power: Fixed64,
}

impl ProducerState {
    pub fn new(active: bool, power: Fixed64) -> Self {
        Self { active, power }
    }

    /// Power actually contributed right now.
    pub fn output(&self) -> Fixed64 {
        if self.active { self.power } else { Fixed64::ZERO }
    }
}

/// Read access to the power components attached to blocks.
pub trait ComponentLookup {
    fn producer_at(&self, position: BlockPos) -> Option<ProducerState>;
    fn is_consumer_at(&self, position: BlockPos) -> bool;
}

/// In-memory component storage keyed by position.
#[derive(Debug, Clone, Default)]
pub struct BlockStore {
    producers: HashMap<BlockPos, ProducerState>,
    consumers: HashSet<BlockPos>,
}

impl BlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach or overwrite a producer. Returns the previous state.
    pub fn set_producer(&mut self, position: BlockPos, state: ProducerState) -> Option<ProducerState> {
        self.producers.insert(position, state)
    }

    pub fn remove_producer(&mut self, position: BlockPos) -> Option<ProducerState> {
        self.producers.remove(&position)
    }

    /// Mark or unmark a consumer. Returns whether the marker changed.
    pub fn set_consumer(&mut self, position: BlockPos, consumer: bool) -> bool {
        if consumer {
            self.consumers.insert(position)
        } else {
            self.consumers.remove(&position)
        }
    }

    /// Drop every component at `position`, as when its block is destroyed.
    pub fn clear_block(&mut self, position: BlockPos) {
        self.producers.remove(&position);
        self.consumers.remove(&position);
    }

    pub fn producer_count(&self) -> usize {
        self.producers.len()
    }

    pub fn consumer_count(&self) -> usize {
        self.consumers.len()
    }
}

impl ComponentLookup for BlockStore {
    fn producer_at(&self, position: BlockPos) -> Option<ProducerState> {
        self.producers.get(&position).copied()
    }

    fn is_consumer_at(&self, position: BlockPos) -> bool {
        self.consumers.contains(&position)
    }
}
