//! Ring-backed [`PeerPicker`].
//!
//! [`PeerPool`] pairs a [`HashRing`] with one [`PeerFetcher`] per remote peer
//! and the identity of the local node. A single mutex serializes membership
//! changes against lookups, so the ring itself can stay unsynchronized.
//!
//! ```text
//!   pick_peer(key)
//!     │  lock
//!     ├─ ring empty ─────────────────► None
//!     ├─ owner == self_id ───────────► None   (serve locally)
//!     ├─ no fetcher for owner ───────► None
//!     └─ fetcher[owner] ─────────────► Some(fetcher)
//! ```
//!
//! The local node is added to the ring like any other peer so that it owns
//! its share of keys, but it never gets a fetcher.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::hash_ring::HashRing;
use crate::traits::{PeerFetcher, PeerPicker};

struct PoolState {
    ring: HashRing,
    fetchers: FxHashMap<String, Arc<dyn PeerFetcher>>,
}

/// Thread-safe peer directory implementing [`PeerPicker`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use groupcache::{BoxError, HashRing, PeerFetcher, PeerPicker, PeerPool};
///
/// struct Remote;
/// impl PeerFetcher for Remote {
///     fn fetch(&self, _group: &str, _key: &str) -> Result<Vec<u8>, BoxError> {
///         Ok(b"remote".to_vec())
///     }
/// }
///
/// let pool = PeerPool::new("10.0.0.1", HashRing::with_replicas(50));
/// pool.add_self();
/// pool.set_peer("10.0.0.2", Arc::new(Remote));
///
/// // Every key is owned by one of the two nodes; only the remote one
/// // yields a fetcher.
/// for key in ["a", "b", "c", "d"] {
///     let owner = pool.owner_of(key).unwrap();
///     assert_eq!(pool.pick_peer(key).is_some(), owner == "10.0.0.2");
/// }
/// ```
pub struct PeerPool {
    self_id: String,
    state: Mutex<PoolState>,
}

impl PeerPool {
    /// Creates a pool for the node identified by `self_id`.
    ///
    /// The local node is not placed on the ring until
    /// [`add_self`](Self::add_self) or [`set_peers`](Self::set_peers) names it.
    pub fn new(self_id: impl Into<String>, ring: HashRing) -> Self {
        Self {
            self_id: self_id.into(),
            state: Mutex::new(PoolState {
                ring,
                fetchers: FxHashMap::default(),
            }),
        }
    }

    pub fn self_id(&self) -> &str {
        &self.self_id
    }

    /// Places the local node on the ring.
    pub fn add_self(&self) {
        let mut state = self.state.lock();
        state.ring.add_peers([self.self_id.as_str()]);
    }

    /// Adds or replaces a remote peer.
    ///
    /// Passing the local id places it on the ring but does not store the
    /// fetcher, so the local node is never picked.
    pub fn set_peer(&self, id: impl Into<String>, fetcher: Arc<dyn PeerFetcher>) {
        let id = id.into();
        let mut state = self.state.lock();
        state.ring.add_peers([id.as_str()]);
        if id != self.self_id {
            state.fetchers.insert(id, fetcher);
        }
    }

    /// Adds a batch of peers. Entries without a fetcher (typically the local
    /// node) are placed on the ring only.
    pub fn set_peers<I>(&self, peers: I)
    where
        I: IntoIterator<Item = (String, Option<Arc<dyn PeerFetcher>>)>,
    {
        let mut state = self.state.lock();
        let mut ids = Vec::new();
        for (id, fetcher) in peers {
            if let Some(fetcher) = fetcher {
                if id != self.self_id {
                    state.fetchers.insert(id.clone(), fetcher);
                }
            }
            ids.push(id);
        }
        log::debug!("peer pool {}: adding {} peers", self.self_id, ids.len());
        state.ring.add_peers(&ids);
    }

    /// Removes a peer from the ring and drops its fetcher.
    pub fn remove_peer(&self, id: &str) {
        let mut state = self.state.lock();
        state.ring.remove_peer(id);
        state.fetchers.remove(id);
        log::debug!("peer pool {}: removed peer {id}", self.self_id);
    }

    /// Ring owner of `key`, including the local node.
    pub fn owner_of(&self, key: &str) -> Option<String> {
        self.state.lock().ring.get(key).map(str::to_owned)
    }

    /// Sorted ids currently on the ring.
    pub fn peers(&self) -> Vec<String> {
        self.state
            .lock()
            .ring
            .peers()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }
}

impl PeerPicker for PeerPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerFetcher>> {
        let state = self.state.lock();
        let owner = state.ring.get(key)?;
        if owner == self.self_id {
            return None;
        }
        state.fetchers.get(owner).cloned()
    }
}

impl fmt::Debug for PeerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("PeerPool")
            .field("self_id", &self.self_id)
            .field("ring", &state.ring)
            .field("fetchers", &state.fetchers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;

    struct Named(&'static str);

    impl PeerFetcher for Named {
        fn fetch(&self, _group: &str, _key: &str) -> Result<Vec<u8>, BoxError> {
            Ok(self.0.as_bytes().to_vec())
        }
    }

    fn fetched_by(pool: &PeerPool, key: &str) -> Option<String> {
        pool.pick_peer(key)
            .map(|f| String::from_utf8(f.fetch("g", key).unwrap()).unwrap())
    }

    #[test]
    fn empty_pool_picks_nothing() {
        let pool = PeerPool::new("self", HashRing::with_replicas(10));
        assert!(pool.pick_peer("k").is_none());
        assert!(pool.owner_of("k").is_none());
    }

    #[test]
    fn only_self_on_ring_picks_nothing() {
        let pool = PeerPool::new("self", HashRing::with_replicas(10));
        pool.add_self();
        for i in 0..100 {
            let key = format!("key-{i}");
            assert_eq!(pool.owner_of(&key).as_deref(), Some("self"));
            assert!(pool.pick_peer(&key).is_none());
        }
    }

    #[test]
    fn local_id_never_gets_a_fetcher() {
        let pool = PeerPool::new("self", HashRing::with_replicas(10));
        pool.set_peer("self", Arc::new(Named("self")));
        for i in 0..100 {
            assert!(pool.pick_peer(&format!("key-{i}")).is_none());
        }
    }

    #[test]
    fn picks_fetcher_of_ring_owner() {
        let pool = PeerPool::new("a", HashRing::with_replicas(20));
        pool.set_peers([
            ("a".to_string(), None),
            ("b".to_string(), Some(Arc::new(Named("b")) as Arc<dyn PeerFetcher>)),
            ("c".to_string(), Some(Arc::new(Named("c")) as Arc<dyn PeerFetcher>)),
        ]);
        assert_eq!(pool.peers(), vec!["a", "b", "c"]);

        let mut remote = 0;
        for i in 0..200 {
            let key = format!("key-{i}");
            let owner = pool.owner_of(&key).unwrap();
            match fetched_by(&pool, &key) {
                Some(peer) => {
                    assert_eq!(peer, owner);
                    remote += 1;
                },
                None => assert_eq!(owner, "a"),
            }
        }
        assert!(remote > 0);
    }

    #[test]
    fn removed_peer_is_no_longer_picked() {
        let pool = PeerPool::new("a", HashRing::with_replicas(20));
        pool.add_self();
        pool.set_peer("b", Arc::new(Named("b")));
        pool.remove_peer("b");

        assert_eq!(pool.peers(), vec!["a"]);
        for i in 0..100 {
            assert!(pool.pick_peer(&format!("key-{i}")).is_none());
        }
    }

    #[test]
    fn peer_on_ring_without_fetcher_is_skipped() {
        let pool = PeerPool::new("a", HashRing::with_replicas(20));
        pool.set_peers([("b".to_string(), None)]);
        assert_eq!(pool.owner_of("k").as_deref(), Some("b"));
        assert!(pool.pick_peer("k").is_none());
    }
}
