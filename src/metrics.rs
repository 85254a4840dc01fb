//! Per-group counters.
//!
//! Counters are relaxed atomics bumped on the request path and read through a
//! point-in-time [`GroupMetricsSnapshot`]. Individual counters are exact, but a
//! snapshot taken while requests are in flight is not a consistent cut across
//! counters.
//!
//! ```text
//!   get ──► gets += 1 ─┬─ peer owns key ──► peer_loads += 1 ─► (error? peer_errors += 1)
//!                      └─ local ─┬─ hit ──► cache_hits += 1
//!                                └─ miss ─► loads += 1 ─────► (error? load_errors += 1)
//!   add ──► local_adds += 1
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of a group's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupMetricsSnapshot {
    /// `get` calls with a non-empty key.
    pub gets: u64,
    /// Local lookups answered from the cache.
    pub cache_hits: u64,
    /// Loader invocations after a local miss.
    pub loads: u64,
    /// Loader invocations that failed.
    pub load_errors: u64,
    /// Requests delegated to a remote owner.
    pub peer_loads: u64,
    /// Delegated requests that failed.
    pub peer_errors: u64,
    /// Successful `add` calls.
    pub local_adds: u64,
}

impl GroupMetricsSnapshot {
    /// Fraction of local lookups served from cache, or `None` before any.
    pub fn hit_ratio(&self) -> Option<f64> {
        let local = self.cache_hits + self.loads;
        (local > 0).then(|| self.cache_hits as f64 / local as f64)
    }
}

#[derive(Debug, Default)]
pub(crate) struct GroupCounters {
    gets: AtomicU64,
    cache_hits: AtomicU64,
    loads: AtomicU64,
    load_errors: AtomicU64,
    peer_loads: AtomicU64,
    peer_errors: AtomicU64,
    local_adds: AtomicU64,
}

impl GroupCounters {
    pub(crate) fn snapshot(&self) -> GroupMetricsSnapshot {
        GroupMetricsSnapshot {
            gets: self.gets.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            load_errors: self.load_errors.load(Ordering::Relaxed),
            peer_loads: self.peer_loads.load(Ordering::Relaxed),
            peer_errors: self.peer_errors.load(Ordering::Relaxed),
            local_adds: self.local_adds.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn inc_get(&self) {
        self.gets.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_load_error(&self) {
        self.load_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_peer_load(&self) {
        self.peer_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_peer_error(&self) {
        self.peer_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_local_add(&self) {
        self.local_adds.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_increments() {
        let counters = GroupCounters::default();
        counters.inc_get();
        counters.inc_get();
        counters.inc_cache_hit();
        counters.inc_load();
        counters.inc_load_error();
        counters.inc_peer_load();
        counters.inc_peer_error();
        counters.inc_local_add();

        let snap = counters.snapshot();
        assert_eq!(
            snap,
            GroupMetricsSnapshot {
                gets: 2,
                cache_hits: 1,
                loads: 1,
                load_errors: 1,
                peer_loads: 1,
                peer_errors: 1,
                local_adds: 1,
            }
        );
    }

    #[test]
    fn hit_ratio() {
        assert_eq!(GroupMetricsSnapshot::default().hit_ratio(), None);
        let snap = GroupMetricsSnapshot {
            cache_hits: 3,
            loads: 1,
            ..Default::default()
        };
        assert_eq!(snap.hit_ratio(), Some(0.75));
    }
}
