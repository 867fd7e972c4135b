use crate::position::BlockPos;

/// Errors raised by the node table and topology graph.
///
/// All of these are contract violations by the caller; the graph is left
/// untouched when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// A node already occupies the position.
    #[error("a node already exists at {0}")]
    DuplicateNode(BlockPos),
    /// No node occupies the position.
    #[error("no node exists at {0}")]
    UnknownNode(BlockPos),
    /// The raw connection mask sets bits outside the six sides.
    #[error("invalid connection mask 0b{0:08b}: only the low six bits name sides")]
    InvalidMask(u8),
}
