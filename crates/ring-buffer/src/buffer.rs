//! Copy-on-Write Ring Buffer Implementation

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::RingBufferConfig;
use crate::error::RingBufferError;

/// Fixed-length slot storage shared between clones
type Slots<T> = Vec<Option<T>>;

/// Index state guarded by the instance lock
struct Inner<T> {
    /// Current storage generation
    storage: Arc<Slots<T>>,
    /// Oldest element
    head: usize,
    /// Newest element
    tail: usize,
    /// `head == tail` is one element unless this is set
    is_empty: bool,
    /// Pushes over the lifetime of this logical buffer
    total_pushed: u64,
}

impl<T> Clone for Inner<T> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            head: self.head,
            tail: self.tail,
            is_empty: self.is_empty,
            total_pushed: self.total_pushed,
        }
    }
}

impl<T: Clone> Inner<T> {
    /// Storage that is safe to write, duplicating it first if another
    /// instance or an in-flight reader still holds this generation
    fn unique_storage(&mut self) -> &mut Slots<T> {
        if Arc::strong_count(&self.storage) > 1 {
            debug!(
                "Ring buffer storage shared by {} owners, copying before write",
                Arc::strong_count(&self.storage)
            );
        }
        Arc::make_mut(&mut self.storage)
    }
}

/// Index state and storage generation captured under the lock.
///
/// Reads clone out of this after the lock is released. The captured
/// generation is never written again because every writer sees the extra
/// reference and copies first.
struct Snapshot<T> {
    storage: Arc<Slots<T>>,
    head: usize,
    tail: usize,
    is_empty: bool,
    capacity: usize,
}

impl<T: Clone> Snapshot<T> {
    fn len(&self) -> usize {
        logical_len(self.head, self.tail, self.is_empty, self.capacity)
    }

    /// Clone of the `n`-th oldest element
    fn get(&self, n: usize) -> Option<T> {
        if n >= self.len() {
            return None;
        }
        self.storage[(self.head + n) % self.capacity].clone()
    }

    fn newest(&self) -> Option<T> {
        if self.is_empty {
            return None;
        }
        self.storage[self.tail].clone()
    }
}

fn logical_len(head: usize, tail: usize, is_empty: bool, capacity: usize) -> usize {
    if is_empty {
        0
    } else if tail >= head {
        tail - head + 1
    } else {
        capacity - (head - tail - 1)
    }
}

/// Fixed-capacity FIFO that overwrites its oldest element when full.
///
/// Every operation locks the instance. Mutations copy the backing storage
/// first when it is shared with a clone (or with a reader that is still
/// copying an element out), so clones behave as independent snapshots
/// while costing O(1) until one side is written.
///
/// `front`, `back`, `at` and `pop` panic when their precondition does not
/// hold. Use `get`, `try_front`, `try_back` or `try_pop` when the caller
/// cannot check `len()` first.
pub struct RingBuffer<T> {
    inner: Mutex<Inner<T>>,
    capacity: usize,
}

impl<T: Clone> RingBuffer<T> {
    /// Create a new ring buffer with given capacity
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(buffer) => buffer,
            Err(e) => panic!("{e}"),
        }
    }

    /// Create a new ring buffer, rejecting a zero capacity
    pub fn try_new(capacity: usize) -> Result<Self, RingBufferError> {
        Self::with_config(&RingBufferConfig::new(capacity))
    }

    /// Create a ring buffer from a validated config
    pub fn with_config(config: &RingBufferConfig) -> Result<Self, RingBufferError> {
        config.validate()?;
        debug!("Creating ring buffer with capacity {}", config.capacity);

        let storage: Slots<T> = (0..config.capacity).map(|_| None).collect();
        Ok(Self {
            inner: Mutex::new(Inner {
                storage: Arc::new(storage),
                head: 0,
                tail: 0,
                is_empty: true,
                total_pushed: 0,
            }),
            capacity: config.capacity,
        })
    }

    /// Create a buffer with default capacity (3000 elements)
    pub fn with_default_capacity() -> Self {
        Self::new(crate::config::DEFAULT_CAPACITY)
    }

    /// Append a value as the newest element (overwrites oldest if full)
    pub fn push_back(&self, value: T) {
        let capacity = self.capacity;
        let mut inner = self.inner.lock();

        if !inner.is_empty {
            let next_tail = (inner.tail + 1) % capacity;
            if next_tail == inner.head {
                trace!("Ring buffer full, overwriting slot {}", inner.head);
                inner.head = (inner.head + 1) % capacity;
            }
            inner.tail = next_tail;
        }

        let tail = inner.tail;
        inner.unique_storage()[tail] = Some(value);
        inner.is_empty = false;
        inner.total_pushed += 1;
    }

    /// Remove and return the oldest element
    ///
    /// # Panics
    /// Panics if the buffer is empty.
    pub fn pop(&self) -> T {
        match self.try_pop() {
            Some(value) => value,
            None => panic!("pop() called on an empty RingBuffer"),
        }
    }

    /// Remove and return the oldest element, or `None` if empty
    pub fn try_pop(&self) -> Option<T> {
        let capacity = self.capacity;
        let mut inner = self.inner.lock();

        if inner.is_empty {
            return None;
        }

        let head = inner.head;
        let value = inner.unique_storage()[head].take();

        if head == inner.tail {
            // Last element gone: collapse head and tail onto the next slot
            // so the following push starts from a clean position.
            let next = (head + 1) % capacity;
            inner.head = next;
            inner.tail = next;
            inner.is_empty = true;
        } else {
            inner.head = (head + 1) % capacity;
        }

        value
    }

    /// Copy of the oldest element
    ///
    /// # Panics
    /// Panics if the buffer is empty.
    pub fn front(&self) -> T {
        match self.try_front() {
            Some(value) => value,
            None => panic!("front() called on an empty RingBuffer"),
        }
    }

    /// Copy of the oldest element, or `None` if empty
    pub fn try_front(&self) -> Option<T> {
        self.snapshot().get(0)
    }

    /// Copy of the newest element
    ///
    /// # Panics
    /// Panics if the buffer is empty.
    pub fn back(&self) -> T {
        match self.try_back() {
            Some(value) => value,
            None => panic!("back() called on an empty RingBuffer"),
        }
    }

    /// Copy of the newest element, or `None` if empty
    pub fn try_back(&self) -> Option<T> {
        self.snapshot().newest()
    }

    /// Copy of the `n`-th oldest element (0 is the front)
    ///
    /// # Panics
    /// Panics if `n >= self.len()`.
    pub fn at(&self, n: usize) -> T {
        let snapshot = self.snapshot();
        let len = snapshot.len();
        match snapshot.get(n) {
            Some(value) => value,
            None => panic!("RingBuffer index out of range: the len is {len} but the index is {n}"),
        }
    }

    /// Copy of the `n`-th oldest element, or `None` if out of range
    pub fn get(&self, n: usize) -> Option<T> {
        self.snapshot().get(n)
    }

    /// Copy of every element, oldest first, taken from a single storage generation
    pub fn to_vec(&self) -> Vec<T> {
        let snapshot = self.snapshot();
        (0..snapshot.len()).filter_map(|n| snapshot.get(n)).collect()
    }

    /// Drop all elements
    pub fn clear(&self) {
        let capacity = self.capacity;
        let mut inner = self.inner.lock();

        match Arc::get_mut(&mut inner.storage) {
            Some(slots) => slots.iter_mut().for_each(|slot| *slot = None),
            None => inner.storage = Arc::new((0..capacity).map(|_| None).collect()),
        }
        inner.head = 0;
        inner.tail = 0;
        inner.is_empty = true;
    }

    /// Capture index state and the current storage generation
    fn snapshot(&self) -> Snapshot<T> {
        let inner = self.inner.lock();
        Snapshot {
            storage: Arc::clone(&inner.storage),
            head: inner.head,
            tail: inner.tail,
            is_empty: inner.is_empty,
            capacity: self.capacity,
        }
    }
}

impl<T> RingBuffer<T> {
    /// Get the number of elements currently in the buffer
    pub fn len(&self) -> usize {
        let inner = self.inner.lock();
        logical_len(inner.head, inner.tail, inner.is_empty, self.capacity)
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty
    }

    /// Check if the next push will overwrite the oldest element
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    /// Get the buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get total values pushed (for statistics)
    pub fn total_pushed(&self) -> u64 {
        self.inner.lock().total_pushed
    }
}

impl<T> Clone for RingBuffer<T> {
    /// Snapshot of the source: shares its storage until either side writes
    fn clone(&self) -> Self {
        let inner = self.inner.lock().clone();
        Self {
            inner: Mutex::new(inner),
            capacity: self.capacity,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        let inner = source.inner.lock().clone();
        *self.inner.get_mut() = inner;
        self.capacity = source.capacity;
    }
}

impl<T> fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}
