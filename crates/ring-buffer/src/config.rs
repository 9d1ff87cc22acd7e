//! Ring buffer configuration

use serde::{Deserialize, Serialize};

use crate::error::RingBufferError;

/// Default buffer capacity
pub const DEFAULT_CAPACITY: usize = 3000;

/// Construction-time ring buffer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingBufferConfig {
    /// Fixed number of slots, immutable after construction
    pub capacity: usize,
}

impl Default for RingBufferConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl RingBufferConfig {
    /// Create a config with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Check that the config describes a usable buffer
    pub fn validate(&self) -> Result<(), RingBufferError> {
        if self.capacity == 0 {
            return Err(RingBufferError::ZeroCapacity);
        }
        Ok(())
    }
}
