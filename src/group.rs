//! # Group
//!
//! A named namespace of keys backed by its own byte-bounded LRU, an optional
//! [`Loader`] for the source of truth, and an optional [`PeerPicker`] that
//! routes keys owned by other nodes.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────────────────────────────────────────────────────────┐
//!   │                              Group                                  │
//!   │                                                                     │
//!   │   name: String                                                      │
//!   │   cache: ConcurrentByteLru<ByteView>   (lazy, byte-bounded)         │
//!   │   loader: Option<Arc<dyn Loader>>                                   │
//!   │   picker: RwLock<Option<Arc<dyn PeerPicker>>>   (bound later)       │
//!   │   counters (feature = "metrics")                                    │
//!   └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Get Flow
//!
//! ```text
//!   get(key)
//!     │
//!     ├─ key == "" ───────────────────────────────► Err(KeyIsNil)
//!     │
//!     ├─ picker bound and pick_peer(key) = Some(f)
//!     │     └─ f.fetch(name, key) ─┬─ Ok(bytes) ──► Ok(ByteView)  (not cached)
//!     │                            └─ Err(e) ─────► Err(Remote { .. })
//!     │
//!     └─ local
//!           ├─ cache hit ─────────────────────────► Ok(value)
//!           ├─ no loader ─────────────────────────► Err(KeyNotFound)
//!           └─ loader.load(key)
//!                 ├─ Ok(bytes) ── cache.add ──────► Ok(ByteView)
//!                 └─ Err(e) ──────────────────────► Err(Loader { .. })
//! ```
//!
//! No lock is held across a loader call or a remote fetch. Concurrent misses
//! on the same key each call the loader and each populate the cache; the last
//! write wins.
//!
//! [`Group::add`] always stores locally, even for keys another peer owns.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::CacheError;
#[cfg(feature = "metrics")]
use crate::metrics::{GroupCounters, GroupMetricsSnapshot};
use crate::policy::lru::ConcurrentByteLru;
use crate::traits::{Loader, PeerPicker};
use crate::value::ByteView;

/// A named cache namespace. Create groups through [`Engine`](crate::Engine).
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use groupcache::{Engine, LoaderFn};
///
/// let engine = Engine::new();
/// let loader = LoaderFn::new(|key: &str| Ok(format!("value-of-{key}").into_bytes()));
/// let group = engine.add_group("scores", Some(Arc::new(loader)), 1 << 10);
///
/// let value = group.get("alice").unwrap();
/// assert_eq!(value.to_string(), "value-of-alice");
/// assert_eq!(group.cached_len(), 1);
/// ```
pub struct Group {
    name: String,
    cache: ConcurrentByteLru<ByteView>,
    loader: Option<Arc<dyn Loader>>,
    picker: RwLock<Option<Arc<dyn PeerPicker>>>,
    #[cfg(feature = "metrics")]
    counters: GroupCounters,
}

impl Group {
    pub(crate) fn new(
        name: impl Into<String>,
        loader: Option<Arc<dyn Loader>>,
        capacity_bytes: u64,
    ) -> Self {
        Self {
            name: name.into(),
            cache: ConcurrentByteLru::new(capacity_bytes),
            loader,
            picker: RwLock::new(None),
            #[cfg(feature = "metrics")]
            counters: GroupCounters::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Byte budget of the local cache.
    pub fn capacity_bytes(&self) -> u64 {
        self.cache.capacity()
    }

    /// Number of entries held locally.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Bytes (keys plus values) held locally.
    pub fn cached_bytes(&self) -> u64 {
        self.cache.total_bytes()
    }

    /// Binds or replaces the peer picker consulted by [`get`](Self::get).
    pub fn register_picker(&self, picker: Arc<dyn PeerPicker>) {
        *self.picker.write() = Some(picker);
    }

    /// Returns the value for `key`, delegating to its owning peer or falling
    /// back to the loader on a local miss.
    ///
    /// # Errors
    ///
    /// - [`CacheError::KeyIsNil`] for an empty key.
    /// - [`CacheError::Remote`] when the owning peer fails.
    /// - [`CacheError::Loader`] when the loader fails.
    /// - [`CacheError::KeyNotFound`] on a local miss with no loader.
    pub fn get(&self, key: &str) -> Result<ByteView, CacheError> {
        if key.is_empty() {
            return Err(CacheError::KeyIsNil);
        }
        #[cfg(feature = "metrics")]
        self.counters.inc_get();

        // Clone out so the picker lock is released before the fetch.
        let picker = self.picker.read().clone();
        if let Some(fetcher) = picker.and_then(|picker| picker.pick_peer(key)) {
            log::debug!("group {}: delegating key {key:?} to owning peer", self.name);
            #[cfg(feature = "metrics")]
            self.counters.inc_peer_load();
            return match fetcher.fetch(&self.name, key) {
                Ok(bytes) => Ok(ByteView::from(bytes)),
                Err(source) => {
                    #[cfg(feature = "metrics")]
                    self.counters.inc_peer_error();
                    log::warn!("group {}: peer fetch for {key:?} failed: {source}", self.name);
                    Err(CacheError::Remote {
                        group: self.name.clone(),
                        key: key.to_owned(),
                        source,
                    })
                },
            };
        }

        if let Some(value) = self.cache.get(key) {
            #[cfg(feature = "metrics")]
            self.counters.inc_cache_hit();
            return Ok(value);
        }

        self.load_locally(key)
    }

    fn load_locally(&self, key: &str) -> Result<ByteView, CacheError> {
        let Some(loader) = self.loader.as_ref() else {
            return Err(CacheError::KeyNotFound);
        };

        log::debug!("group {}: cache miss for {key:?}, invoking loader", self.name);
        #[cfg(feature = "metrics")]
        self.counters.inc_load();
        match loader.load(key) {
            Ok(bytes) => {
                let value = ByteView::from(bytes);
                self.cache.add(key, value.clone());
                Ok(value)
            },
            Err(source) => {
                #[cfg(feature = "metrics")]
                self.counters.inc_load_error();
                log::warn!("group {}: loader failed for {key:?}: {source}", self.name);
                Err(CacheError::Loader {
                    key: key.to_owned(),
                    source,
                })
            },
        }
    }

    /// Stores `value` under `key` in the local cache.
    ///
    /// The peer picker is not consulted.
    pub fn add(&self, key: &str, value: ByteView) -> Result<(), CacheError> {
        if key.is_empty() {
            return Err(CacheError::KeyIsNil);
        }
        self.cache.add(key, value);
        #[cfg(feature = "metrics")]
        self.counters.inc_local_add();
        Ok(())
    }

    /// Snapshot of this group's request counters.
    #[cfg(feature = "metrics")]
    pub fn metrics(&self) -> GroupMetricsSnapshot {
        self.counters.snapshot()
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("cache", &self.cache)
            .field("has_loader", &self.loader.is_some())
            .field("has_picker", &self.picker.read().is_some())
            .finish()
    }
}
