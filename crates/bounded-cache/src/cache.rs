//! Bounded LRU Cache Implementation

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, trace};

use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::stats::CacheStats;

/// Null link in the recency list
const SENTINEL: usize = usize::MAX;

/// Recency list node. `value` is `None` only while the slot is on the free list.
struct Node<K, V> {
    key: K,
    value: Option<Arc<V>>,
    prev: usize,
    next: usize,
}

impl<K: Clone, V> Clone for Node<K, V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            value: self.value.clone(),
            prev: self.prev,
            next: self.next,
        }
    }
}

/// Recency list and key index, always updated together under one lock
struct Inner<K, V> {
    /// Key to arena slot
    index: HashMap<K, usize>,
    /// Arena backing the doubly-linked recency list
    arena: Vec<Node<K, V>>,
    /// Most-recently used
    head: usize,
    /// Least-recently used
    tail: usize,
    /// Recycled slots, chained through `next`
    free_head: usize,
    stats: CacheStats,
}

impl<K: Clone, V> Clone for Inner<K, V> {
    fn clone(&self) -> Self {
        Self {
            index: self.index.clone(),
            arena: self.arena.clone(),
            head: self.head,
            tail: self.tail,
            free_head: self.free_head,
            stats: self.stats,
        }
    }
}

impl<K: Hash + Eq + Clone, V> Inner<K, V> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            arena: Vec::new(),
            head: SENTINEL,
            tail: SENTINEL,
            free_head: SENTINEL,
            stats: CacheStats::default(),
        }
    }

    /// Insert a new entry or replace an existing one; either way it ends up at the head
    fn upsert(&mut self, key: K, value: Arc<V>) {
        if let Some(&idx) = self.index.get(&key) {
            self.arena[idx].value = Some(value);
            self.move_to_head(idx);
            return;
        }

        let idx = self.alloc_slot(key.clone(), value);
        self.push_head(idx);
        self.index.insert(key, idx);
    }

    fn lookup(&mut self, key: &K) -> Option<Arc<V>> {
        self.stats.gets += 1;
        let idx = *self.index.get(key)?;
        self.stats.hits += 1;
        self.move_to_head(idx);
        self.arena[idx].value.clone()
    }

    fn alloc_slot(&mut self, key: K, value: Arc<V>) -> usize {
        let node = Node {
            key,
            value: Some(value),
            prev: SENTINEL,
            next: SENTINEL,
        };

        if self.free_head != SENTINEL {
            let idx = self.free_head;
            self.free_head = self.arena[idx].next;
            self.arena[idx] = node;
            idx
        } else {
            self.arena.push(node);
            self.arena.len() - 1
        }
    }

    /// Detach a node from the list without freeing its slot
    fn unlink(&mut self, idx: usize) {
        let prev = self.arena[idx].prev;
        let next = self.arena[idx].next;

        if prev != SENTINEL {
            self.arena[prev].next = next;
        } else {
            self.head = next;
        }

        if next != SENTINEL {
            self.arena[next].prev = prev;
        } else {
            self.tail = prev;
        }

        self.arena[idx].prev = SENTINEL;
        self.arena[idx].next = SENTINEL;
    }

    fn push_head(&mut self, idx: usize) {
        self.arena[idx].prev = SENTINEL;
        self.arena[idx].next = self.head;

        if self.head != SENTINEL {
            self.arena[self.head].prev = idx;
        }
        self.head = idx;

        if self.tail == SENTINEL {
            self.tail = idx;
        }
    }

    fn move_to_head(&mut self, idx: usize) {
        if self.head == idx {
            return;
        }
        self.unlink(idx);
        self.push_head(idx);
    }

    /// Remove the least-recently used entry from both the list and the index
    fn evict_tail(&mut self) -> Option<K> {
        if self.tail == SENTINEL {
            return None;
        }
        let idx = self.tail;
        self.unlink(idx);

        let key = self.arena[idx].key.clone();
        self.index.remove(&key);
        // Drops only the cache's handle; callers keep theirs.
        self.arena[idx].value = None;
        self.arena[idx].next = self.free_head;
        self.free_head = idx;

        self.stats.evictions += 1;
        Some(key)
    }

    fn clear(&mut self) {
        self.index.clear();
        self.arena.clear();
        self.head = SENTINEL;
        self.tail = SENTINEL;
        self.free_head = SENTINEL;
    }
}

/// Thread-safe LRU cache bounded by entry count and an optional memory budget.
///
/// Every operation holds the instance lock for its whole duration. Each
/// `push` runs at most one eviction step afterwards: if the entry count
/// exceeds `max_count`, or a memory budget is set and
/// `len * size_of::<V>()` exceeds it, the least-recently used entry is
/// dropped. The memory figure counts `V` itself, not heap data it owns.
///
/// # Example
/// ```
/// use bounded_cache::BoundedCache;
///
/// let cache: BoundedCache<&str, i32> = BoundedCache::new(2);
/// cache.push("a", 1);
/// cache.push("b", 2);
/// assert_eq!(cache.get(&"a").as_deref(), Some(&1));
///
/// cache.push("c", 3); // evicts "b"
/// assert!(!cache.exists(&"b"));
/// assert_eq!(cache.hit_rate(), Some(1.0));
/// ```
pub struct BoundedCache<K, V> {
    inner: Mutex<Inner<K, V>>,
    max_count: usize,
    max_memory: Option<usize>,
}

impl<K: Hash + Eq + Clone, V> BoundedCache<K, V> {
    /// Create a cache bounded by entry count only
    ///
    /// # Panics
    /// Panics if `max_count` is 0.
    pub fn new(max_count: usize) -> Self {
        match Self::try_new(max_count) {
            Ok(cache) => cache,
            Err(e) => panic!("{e}"),
        }
    }

    /// Create a cache bounded by entry count, rejecting a zero bound
    pub fn try_new(max_count: usize) -> Result<Self, CacheError> {
        Self::with_config(&CacheConfig::new(max_count))
    }

    /// Create a cache bounded by entry count and approximate memory in bytes.
    /// A `max_memory` of 0 disables the memory bound.
    ///
    /// # Panics
    /// Panics if `max_count` is 0.
    pub fn with_memory_limit(max_count: usize, max_memory: usize) -> Self {
        match Self::with_config(&CacheConfig::with_memory_limit(max_count, max_memory)) {
            Ok(cache) => cache,
            Err(e) => panic!("{e}"),
        }
    }

    /// Create a cache from a validated config
    pub fn with_config(config: &CacheConfig) -> Result<Self, CacheError> {
        config.validate()?;
        info!(
            "Creating bounded cache: max_count={}, max_memory={:?}",
            config.max_count,
            config.memory_budget()
        );

        Ok(Self {
            inner: Mutex::new(Inner::new()),
            max_count: config.max_count,
            max_memory: config.memory_budget(),
        })
    }

    /// Insert or replace `key`, make it most-recently used, then evict at
    /// most one least-recently used entry if a bound is exceeded
    pub fn push(&self, key: K, value: impl Into<Arc<V>>) {
        let mut inner = self.inner.lock();
        inner.upsert(key, value.into());

        let count = inner.index.len();
        let over_count = count > self.max_count;
        let over_memory = self
            .max_memory
            .is_some_and(|budget| Self::estimate_memory(count) > budget);

        if (over_count || over_memory) && inner.evict_tail().is_some() {
            debug!(
                "Evicted least-recently used entry (count={}, over_count={}, over_memory={})",
                count, over_count, over_memory
            );
        }
    }

    /// Look up `key`, making it most-recently used on a hit.
    /// Every call counts towards the hit rate.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.inner.lock().lookup(key)
    }

    /// Check membership without touching recency order or statistics
    pub fn exists(&self, key: &K) -> bool {
        self.inner.lock().index.contains_key(key)
    }

    /// Fraction of `get` calls that hit since the last reset,
    /// `None` if there have been none
    pub fn hit_rate(&self) -> Option<f64> {
        self.inner.lock().stats.hit_rate()
    }

    /// Snapshot of the statistics counters
    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats
    }

    /// Zero the statistics counters; entries are untouched
    pub fn reset_stats(&self) {
        trace!("Resetting cache statistics");
        self.inner.lock().stats = CacheStats::default();
    }

    /// Remove every entry; statistics are untouched
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.inner.lock().index.len()
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry-count bound
    pub fn max_count(&self) -> usize {
        self.max_count
    }

    /// Memory budget in bytes, if enabled
    pub fn max_memory(&self) -> Option<usize> {
        self.max_memory
    }

    /// Memory estimate the eviction step compares against the budget
    pub fn approx_memory(&self) -> usize {
        Self::estimate_memory(self.len())
    }

    fn estimate_memory(count: usize) -> usize {
        count.saturating_mul(mem::size_of::<V>())
    }
}

impl<K: Clone, V> Clone for BoundedCache<K, V> {
    /// Independent cache holding the same entries, order and statistics.
    /// Value handles are shared with the source.
    fn clone(&self) -> Self {
        let inner = self.inner.lock().clone();
        Self {
            inner: Mutex::new(inner),
            max_count: self.max_count,
            max_memory: self.max_memory,
        }
    }
}

impl<K, V> fmt::Debug for BoundedCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("BoundedCache")
            .field("max_count", &self.max_count)
            .field("max_memory", &self.max_memory)
            .field("len", &inner.index.len())
            .field("stats", &inner.stats)
            .finish()
    }
}
