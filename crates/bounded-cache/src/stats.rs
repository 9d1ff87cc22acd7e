//! Cache statistics

use serde::Serialize;

/// Lookup and eviction counters since the last reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Calls to `get`
    pub gets: u64,
    /// Calls to `get` that found the key
    pub hits: u64,
    /// Entries removed by the eviction step
    pub evictions: u64,
}

impl CacheStats {
    /// Calls to `get` that did not find the key
    pub fn misses(&self) -> u64 {
        self.gets - self.hits
    }

    /// Hit rate in `[0.0, 1.0]`, or `None` when no lookups have been made
    pub fn hit_rate(&self) -> Option<f64> {
        if self.gets == 0 {
            None
        } else {
            Some(self.hits as f64 / self.gets as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            gets: 6,
            hits: 3,
            evictions: 0,
        };
        assert_eq!(stats.hit_rate(), Some(0.5));
        assert_eq!(stats.misses(), 3);
    }

    #[test]
    fn test_hit_rate_without_lookups() {
        assert_eq!(CacheStats::default().hit_rate(), None);
    }
}
