use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a rotating-part proxy owned by the visual layer.
    pub struct ProxyId;
}

/// Identifies a network. Cheap to copy and compare.
///
/// Ordinals are handed out in increasing order and never reused by the graph
/// that issued them, so a stale id can never alias a newer network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NetworkId(pub u32);

impl std::fmt::Display for NetworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "net#{}", self.0)
    }
}
