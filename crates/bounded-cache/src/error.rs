//! Cache Error Types

use thiserror::Error;

/// Errors while configuring a cache
///
/// Lookups never fail: a miss is an ordinary `None` or `false`.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The count bound must allow at least one entry
    #[error("Cache max_count must be at least 1")]
    ZeroMaxCount,

    /// Configuration sources could not be read or deserialized
    #[error("Invalid cache configuration: {0}")]
    Config(#[from] ::config::ConfigError),
}
