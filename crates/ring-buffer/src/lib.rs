//! Copy-on-Write Ring Buffer
//!
//! Provides a fixed-capacity FIFO that overwrites its oldest element when full.
//! Storage is shared between clones and only duplicated on the first write
//! after a clone, so snapshots are cheap and readers never see torn data.

mod buffer;
mod config;
mod error;

pub use buffer::RingBuffer;
pub use config::{RingBufferConfig, DEFAULT_CAPACITY};
pub use error::RingBufferError;
