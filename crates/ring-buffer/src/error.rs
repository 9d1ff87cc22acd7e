//! Ring Buffer Error Types

use thiserror::Error;

/// Errors raised while constructing a ring buffer
///
/// Out-of-range reads and pops on an empty buffer are not represented here:
/// those are contract violations and panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RingBufferError {
    /// A ring buffer must hold at least one element
    #[error("Ring buffer capacity must be at least 1")]
    ZeroCapacity,
}
