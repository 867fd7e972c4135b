use mechpower_core::NetworkError;
use mechpower_core::fixed::Fixed64;
use mechpower_core::position::BlockPos;

/// What was wrong with a proxy-state request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyViolation {
    /// A proxy was created for a node that already has one.
    AlreadyAttached,
    /// The node has no proxy.
    NotAttached,
    /// A speed or stop update reached a proxy that is not spinning.
    NotSpinning,
}

impl std::fmt::Display for ProxyViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProxyViolation::AlreadyAttached => f.write_str("proxy already exists"),
            ProxyViolation::NotAttached => f.write_str("no proxy exists"),
            ProxyViolation::NotSpinning => f.write_str("proxy is not spinning"),
        }
    }
}

/// Errors raised by the power layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PowerError {
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("proxy state violation at {position}: {reason}")]
    ProxyStateViolation {
        position: BlockPos,
        reason: ProxyViolation,
    },
    #[error("producer at {position} reports negative power {power}")]
    NegativePower { position: BlockPos, power: Fixed64 },
}
