//! Topology events.
//!
//! The graph buffers one event per structural change to network identity.
//! Hosts drain the buffer after each notification; nothing is delivered
//! through callbacks.

use crate::id::NetworkId;

/// A change in network identity caused by a node operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyEvent {
    /// A fresh singleton network was formed by an isolated node.
    NetworkCreated { network: NetworkId },
    /// `absorbed` networks were folded into `survivor`; their ids are stale.
    NetworksMerged {
        survivor: NetworkId,
        absorbed: Vec<NetworkId>,
    },
    /// Removing a bridge left `original` with only part of its members; the
    /// other parts received the `split_off` ids.
    NetworkSplit {
        original: NetworkId,
        split_off: Vec<NetworkId>,
    },
    /// The network lost its last member.
    NetworkDissolved { network: NetworkId },
}
