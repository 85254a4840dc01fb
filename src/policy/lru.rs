//! # Byte-bounded Least Recently Used (LRU) Cache
//!
//! This module provides the eviction engine behind every group: an LRU cache
//! whose capacity is a byte budget rather than an entry count, plus a
//! thread-safe wrapper that builds the engine lazily on first write.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                        ConcurrentByteLru<V>                              │
//!   │                                                                          │
//!   │   ┌────────────────────────────────────────────────────────────────────┐ │
//!   │   │            RwLock<Option<ByteLruCore<V>>>  (built on first add)    │ │
//!   │   └────────────────────────────────────────────────────────────────────┘ │
//!   │                                  │                                       │
//!   │                                  ▼                                       │
//!   │   ┌────────────────────────────────────────────────────────────────────┐ │
//!   │   │                       ByteLruCore<V>                               │ │
//!   │   │                                                                    │ │
//!   │   │   FxHashMap<String, SlotId>  ──────────────┐                       │ │
//!   │   │                                            ▼                       │ │
//!   │   │   IntrusiveList<Entry<V>>                                          │ │
//!   │   │     front ──► [k3] ◄──► [k2] ◄──► [k1] ◄── back                    │ │
//!   │   │               MRU                 LRU                              │ │
//!   │   │                                                                    │ │
//!   │   │   used_bytes = Σ key.len() + value.byte_len()  <=  capacity        │ │
//!   │   └────────────────────────────────────────────────────────────────────┘ │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Components
//!
//! | Component              | Description                                        |
//! |------------------------|----------------------------------------------------|
//! | `ByteLruCore<V>`       | Single-threaded engine: list + index + accounting  |
//! | `ConcurrentByteLru<V>` | `parking_lot::RwLock` wrapper with lazy engine     |
//! | `Entry<V>`             | List node payload: owned key + value               |
//! | `EvictionListener<V>`  | Callback run synchronously for each evicted entry  |
//!
//! ## Insert Flow
//!
//! ```text
//!   capacity = 14, each entry costs 2 (key) + 5 (value) = 7
//!
//!   insert(k1)   front ─► [k1]                 used = 7
//!   insert(k2)   front ─► [k2] [k1]            used = 14
//!   insert(k3)   front ─► [k3] [k2] [k1]       used = 21 > 14
//!                evict back (k1), notify        used = 14
//!                front ─► [k3] [k2]
//! ```
//!
//! The eviction loop runs after every insert, new key or overwrite, and stops
//! once `used <= capacity` or the cache is empty. An entry larger than the
//! whole budget is therefore evicted immediately after insertion, and a
//! capacity of 0 keeps the cache permanently empty.
//!
//! ## Eviction Listener
//!
//! The listener fires once for every entry leaving through capacity pressure
//! or [`ByteLruCore::remove_oldest`]. It does not fire when `insert` replaces
//! the value of an existing key, nor for [`ByteLruCore::remove`] and
//! [`ByteLruCore::clear`], which are explicit removals rather than evictions.
//!
//! ## Concurrency Model
//!
//! ```text
//!   add()   ── write lock ─────────────► build engine if absent, insert
//!   get()   ── read lock ───────┬─────► engine absent: None, no allocation
//!                               └─────► release, write lock, promote to MRU
//!   peek()  ── read lock ──────────────► lookup without promotion
//! ```
//!
//! `get` needs exclusive access once the engine exists because promotion
//! rewrites list links. Locks are never held beyond the in-memory update.
//!
//! ## Performance Characteristics
//!
//! | Operation        | Time       | Notes                              |
//! |------------------|------------|------------------------------------|
//! | `insert`         | O(1)* avg  | *plus one O(1) step per eviction   |
//! | `get`            | O(1) avg   | Index lookup + list move           |
//! | `peek`           | O(1) avg   | Index lookup only                  |
//! | `remove_oldest`  | O(1)       | Back-of-list removal               |
//!
//! ## Example Usage
//!
//! ```
//! use groupcache::policy::lru::ByteLruCore;
//!
//! let mut cache: ByteLruCore<Vec<u8>> = ByteLruCore::new(14);
//! cache.insert("k1", vec![0; 5]);
//! cache.insert("k2", vec![0; 5]);
//! cache.insert("k3", vec![0; 5]);
//!
//! assert_eq!(cache.len(), 2);
//! assert_eq!(cache.total_bytes(), 14);
//! assert!(!cache.contains("k1"));
//! ```

use std::fmt;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::slot_arena::SlotId;
use crate::value::ByteLen;

/// Callback invoked with the key and value of each evicted entry.
pub type EvictionListener<V> = Box<dyn FnMut(&str, &V) + Send + Sync>;

#[derive(Debug)]
struct Entry<V> {
    key: String,
    value: V,
}

impl<V: ByteLen> Entry<V> {
    fn cost(&self) -> u64 {
        entry_cost(&self.key, &self.value)
    }
}

#[inline]
fn entry_cost<V: ByteLen>(key: &str, value: &V) -> u64 {
    (key.len() + value.byte_len()) as u64
}

/// Single-threaded, byte-accounted LRU engine.
///
/// Every entry costs `key.len() + value.byte_len()` bytes. After each
/// [`insert`](Self::insert) the total cost is at most [`capacity`](Self::capacity),
/// with least recently used entries evicted to get there.
pub struct ByteLruCore<V> {
    index: FxHashMap<String, SlotId>,
    list: IntrusiveList<Entry<V>>,
    capacity: u64,
    used: u64,
    on_evict: Option<EvictionListener<V>>,
}

impl<V: ByteLen> ByteLruCore<V> {
    /// Creates an empty cache with a budget of `capacity` bytes.
    ///
    /// A capacity of 0 creates a cache that never retains anything.
    ///
    /// # Example
    /// ```
    /// use groupcache::policy::lru::ByteLruCore;
    /// use groupcache::ByteView;
    ///
    /// let cache: ByteLruCore<ByteView> = ByteLruCore::new(1 << 20);
    /// assert!(cache.is_empty());
    /// ```
    pub fn new(capacity: u64) -> Self {
        Self {
            index: FxHashMap::default(),
            list: IntrusiveList::new(),
            capacity,
            used: 0,
            on_evict: None,
        }
    }

    /// Creates an empty cache that reports evictions to `listener`.
    ///
    /// # Example
    /// ```
    /// use std::sync::{Arc, Mutex};
    /// use groupcache::policy::lru::ByteLruCore;
    ///
    /// let evicted = Arc::new(Mutex::new(Vec::new()));
    /// let sink = Arc::clone(&evicted);
    /// let mut cache = ByteLruCore::with_eviction_listener(10, move |key: &str, _: &String| {
    ///     sink.lock().unwrap().push(key.to_string());
    /// });
    ///
    /// cache.insert("longkey", "12345678".to_string()); // costs 15 > 10
    /// assert!(cache.is_empty());
    /// assert_eq!(*evicted.lock().unwrap(), vec!["longkey".to_string()]);
    /// ```
    pub fn with_eviction_listener<F>(capacity: u64, listener: F) -> Self
    where
        F: FnMut(&str, &V) + Send + Sync + 'static,
    {
        let mut cache = Self::new(capacity);
        cache.on_evict = Some(Box::new(listener));
        cache
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Byte budget.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Sum of `key.len() + value.byte_len()` over all entries.
    pub fn total_bytes(&self) -> u64 {
        self.used
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the value for `key` and marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.list.move_to_front(id);
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Returns the value for `key` without touching recency order.
    pub fn peek(&self, key: &str) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Inserts or replaces `key`, then evicts from the LRU end until the
    /// cache fits its budget.
    ///
    /// Replacing an existing key adjusts the byte total by the difference in
    /// value size and promotes the key; the eviction listener is not told
    /// about the replaced value.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&id) => {
                let new_len = value.byte_len() as u64;
                if let Some(entry) = self.list.get_mut(id) {
                    let old_len = entry.value.byte_len() as u64;
                    self.used = self.used - old_len + new_len;
                    entry.value = value;
                }
                self.list.move_to_front(id);
            },
            None => {
                self.used += entry_cost(&key, &value);
                let id = self.list.push_front(Entry {
                    key: key.clone(),
                    value,
                });
                self.index.insert(key, id);
            },
        }

        while !self.is_empty() && self.over_budget() {
            self.remove_oldest();
        }

        #[cfg(debug_assertions)]
        self.debug_validate_invariants();
    }

    /// Evicts the least recently used entry, notifying the listener.
    ///
    /// Returns the evicted pair, or `None` when the cache is empty.
    pub fn remove_oldest(&mut self) -> Option<(String, V)> {
        let entry = self.list.pop_back()?;
        self.index.remove(&entry.key);
        self.used -= entry.cost();
        log::trace!(
            "evicted {:?} ({} bytes, {} bytes in use)",
            entry.key,
            entry.cost(),
            self.used
        );
        if let Some(listener) = self.on_evict.as_mut() {
            listener(&entry.key, &entry.value);
        }
        Some((entry.key, entry.value))
    }

    // Capacity 0 disables the cache, so even zero-cost entries are dropped.
    fn over_budget(&self) -> bool {
        self.used > self.capacity || self.capacity == 0
    }

    /// Removes `key` without notifying the eviction listener.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let id = self.index.remove(key)?;
        let entry = self.list.remove(id)?;
        self.used -= entry.cost();
        Some(entry.value)
    }

    /// Drops every entry without notifying the eviction listener.
    pub fn clear(&mut self) {
        self.index.clear();
        self.list.clear();
        self.used = 0;
    }

    /// Keys from most to least recently used.
    pub fn keys_mru(&self) -> Vec<&str> {
        self.list.iter().map(|entry| entry.key.as_str()).collect()
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.list.debug_validate_invariants();
        assert_eq!(self.index.len(), self.list.len());
        let mut used = 0u64;
        for entry in self.list.iter() {
            assert!(self.index.contains_key(&entry.key));
            used += entry.cost();
        }
        assert_eq!(used, self.used, "byte accounting drifted");
        assert!(self.is_empty() || self.used <= self.capacity);
    }
}

impl<V> fmt::Debug for ByteLruCore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteLruCore")
            .field("len", &self.index.len())
            .field("used", &self.used)
            .field("capacity", &self.capacity)
            .field("has_listener", &self.on_evict.is_some())
            .finish_non_exhaustive()
    }
}

/// Thread-safe byte-bounded LRU that allocates its engine on first write.
///
/// A `get` before any `add` observes "not found" without building the engine.
/// The capacity is fixed at construction.
pub struct ConcurrentByteLru<V> {
    capacity: u64,
    inner: RwLock<Option<ByteLruCore<V>>>,
}

impl<V> ConcurrentByteLru<V>
where
    V: ByteLen + Clone + Send + Sync,
{
    /// Creates a wrapper for an engine of `capacity` bytes. Nothing is
    /// allocated until the first [`add`](Self::add).
    ///
    /// # Example
    ///
    /// ```
    /// use groupcache::policy::lru::ConcurrentByteLru;
    /// use groupcache::ByteView;
    ///
    /// let cache: ConcurrentByteLru<ByteView> = ConcurrentByteLru::new(1024);
    /// assert_eq!(cache.get("k"), None);
    /// assert!(!cache.is_initialized());
    ///
    /// cache.add("k", ByteView::from("v"));
    /// assert_eq!(cache.get("k"), Some(ByteView::from("v")));
    /// ```
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            inner: RwLock::new(None),
        }
    }

    pub fn add(&self, key: impl Into<String>, value: V) {
        let mut guard = self.inner.write();
        let capacity = self.capacity;
        guard
            .get_or_insert_with(|| ByteLruCore::new(capacity))
            .insert(key, value);
    }

    /// Returns a clone of the value and marks it most recently used.
    ///
    /// Before the first `add` this only takes a shared lock, so concurrent
    /// lookups on an empty wrapper never wait on each other.
    pub fn get(&self, key: &str) -> Option<V> {
        if self.inner.read().is_none() {
            return None;
        }
        // Promotion reorders the recency list.
        self.inner.write().as_mut()?.get(key).cloned()
    }

    /// Returns a clone of the value without promoting it.
    pub fn peek(&self, key: &str) -> Option<V> {
        self.inner.read().as_ref()?.peek(key).cloned()
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.read().as_ref().map_or(0, ByteLruCore::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_bytes(&self) -> u64 {
        self.inner.read().as_ref().map_or(0, ByteLruCore::total_bytes)
    }

    /// `true` once the first `add` has built the engine.
    pub fn is_initialized(&self) -> bool {
        self.inner.read().is_some()
    }
}

impl<V> fmt::Debug for ConcurrentByteLru<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("ConcurrentByteLru")
            .field("capacity", &self.capacity)
            .field("len", &inner.as_ref().map_or(0, |core| core.index.len()))
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    impl ByteLen for u8 {
        fn byte_len(&self) -> usize {
            *self as usize
        }
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(String, u8),
        Get(String),
        RemoveOldest,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => ("[a-f]{0,3}", any::<u8>()).prop_map(|(k, v)| Op::Insert(k, v % 40)),
            2 => "[a-f]{0,3}".prop_map(Op::Get),
            1 => Just(Op::RemoveOldest),
        ]
    }

    proptest! {
        /// Property: total bytes never exceed capacity after insert
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_capacity_invariant(
            capacity in 0u64..120,
            ops in prop::collection::vec(op_strategy(), 0..200)
        ) {
            let mut cache: ByteLruCore<u8> = ByteLruCore::new(capacity);
            for op in ops {
                match op {
                    Op::Insert(k, v) => {
                        cache.insert(k, v);
                        if capacity == 0 {
                            prop_assert!(cache.is_empty());
                        }
                        prop_assert!(cache.total_bytes() <= capacity);
                    },
                    Op::Get(k) => {
                        let before = cache.total_bytes();
                        cache.get(&k);
                        prop_assert_eq!(cache.total_bytes(), before);
                    },
                    Op::RemoveOldest => {
                        cache.remove_oldest();
                    },
                }
                cache.debug_validate_invariants();
            }
        }

        /// Property: with no eviction pressure, recency order matches a
        /// move-to-front model
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_recency_matches_model(ops in prop::collection::vec(op_strategy(), 0..200)) {
            let mut cache: ByteLruCore<u8> = ByteLruCore::new(u64::MAX);
            let mut model: Vec<String> = Vec::new();
            for op in ops {
                match op {
                    Op::Insert(k, v) => {
                        model.retain(|m| m != &k);
                        model.insert(0, k.clone());
                        cache.insert(k, v);
                    },
                    Op::Get(k) => {
                        if let Some(pos) = model.iter().position(|m| m == &k) {
                            let key = model.remove(pos);
                            model.insert(0, key);
                        }
                        cache.get(&k);
                    },
                    Op::RemoveOldest => {
                        let expected = model.pop();
                        prop_assert_eq!(cache.remove_oldest().map(|(k, _)| k), expected);
                    },
                }
                prop_assert_eq!(cache.keys_mru(), model.iter().map(String::as_str).collect::<Vec<_>>());
            }
        }

        /// Property: every entry that leaves by eviction is reported exactly once
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_listener_accounts_for_every_departure(
            capacity in 1u64..80,
            inserts in prop::collection::vec(("[a-z]{1,2}", 0u8..30), 1..150)
        ) {
            use std::sync::atomic::{AtomicUsize, Ordering};
            use std::sync::Arc;

            let evicted = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&evicted);
            let mut cache = ByteLruCore::with_eviction_listener(capacity, move |_: &str, _: &u8| {
                counter.fetch_add(1, Ordering::Relaxed);
            });

            let mut new_keys = 0usize;
            for (k, v) in inserts {
                if !cache.contains(&k) {
                    new_keys += 1;
                }
                cache.insert(k, v);
            }
            prop_assert_eq!(new_keys, cache.len() + evicted.load(Ordering::Relaxed));
        }
    }
}
