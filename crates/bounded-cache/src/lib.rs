//! Bounded LRU Cache
//!
//! Provides a thread-safe least-recently-used cache that evicts by entry
//! count and, optionally, by an approximate memory budget. Values are handed
//! out as `Arc` handles and stay valid after the cache evicts them.

mod cache;
mod config;
mod error;
mod stats;

pub use cache::BoundedCache;
pub use crate::config::{CacheConfig, DEFAULT_MAX_COUNT};
pub use error::CacheError;
pub use stats::CacheStats;
