//! # Collaborator Capabilities
//!
//! A [`Group`](crate::Group) talks to the outside world through three small
//! traits. Each has exactly one method, so a test double, a database adapter
//! or a network client can implement them directly without an inheritance
//! hierarchy.
//!
//! ## Architecture
//!
//! ```text
//!                        Group::get(key)
//!                              │
//!             ┌────────────────┴─────────────────┐
//!             ▼                                  ▼
//!   ┌───────────────────────┐        ┌───────────────────────────┐
//!   │      PeerPicker       │        │          Loader           │
//!   │                       │        │                           │
//!   │  pick_peer(key)       │        │  load(key) → bytes        │
//!   │   → Option<Fetcher>   │        │  (source of truth, only   │
//!   │  (never the local     │        │   on local cache miss)    │
//!   │   node)               │        └───────────────────────────┘
//!   └───────────┬───────────┘
//!               │ Some(fetcher)
//!               ▼
//!   ┌───────────────────────┐
//!   │      PeerFetcher      │
//!   │                       │
//!   │  fetch(group, key)    │
//!   │   → bytes             │
//!   │  (transport, encoding │
//!   │   and retry policy    │
//!   │   are the impl's)     │
//!   └───────────────────────┘
//! ```
//!
//! ## Trait Summary
//!
//! | Trait         | Method                          | Implemented by               |
//! |---------------|---------------------------------|------------------------------|
//! | `Loader`      | `load(&str)`                    | DB adapters, [`LoaderFn`]    |
//! | `PeerFetcher` | `fetch(&str, &str)`             | HTTP/RPC clients             |
//! | `PeerPicker`  | `pick_peer(&str)`               | [`PeerPool`](crate::PeerPool)|
//!
//! All three are `Send + Sync` so a group can be shared across threads.
//! Errors are returned as [`BoxError`] and reach the caller unchanged inside
//! [`CacheError`](crate::CacheError).

use std::fmt;
use std::sync::Arc;

use crate::error::BoxError;

/// Fetches a value from the authoritative source on local cache miss.
pub trait Loader: Send + Sync {
    fn load(&self, key: &str) -> Result<Vec<u8>, BoxError>;
}

/// Fetches a value from the cache of the peer that owns it.
pub trait PeerFetcher: Send + Sync {
    fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>, BoxError>;
}

/// Chooses the remote peer that owns a key.
///
/// Returns `None` when there are no peers or when the local node owns the
/// key. Implementations must never return a fetcher for the local node, or
/// requests would forward to themselves forever.
pub trait PeerPicker: Send + Sync {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerFetcher>>;
}

/// Adapts a closure into a [`Loader`].
///
/// # Example
///
/// ```
/// use groupcache::{Loader, LoaderFn};
///
/// let loader = LoaderFn::new(|key: &str| Ok(key.to_uppercase().into_bytes()));
/// assert_eq!(loader.load("abc").unwrap(), b"ABC");
/// ```
pub struct LoaderFn<F>(F);

impl<F> LoaderFn<F>
where
    F: Fn(&str) -> Result<Vec<u8>, BoxError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Loader for LoaderFn<F>
where
    F: Fn(&str) -> Result<Vec<u8>, BoxError> + Send + Sync,
{
    fn load(&self, key: &str) -> Result<Vec<u8>, BoxError> {
        (self.0)(key)
    }
}

impl<F> fmt::Debug for LoaderFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LoaderFn")
    }
}

impl<T: Loader + ?Sized> Loader for Arc<T> {
    fn load(&self, key: &str) -> Result<Vec<u8>, BoxError> {
        (**self).load(key)
    }
}

impl<T: PeerFetcher + ?Sized> PeerFetcher for Arc<T> {
    fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>, BoxError> {
        (**self).fetch(group, key)
    }
}

impl<T: PeerPicker + ?Sized> PeerPicker for Arc<T> {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerFetcher>> {
        (**self).pick_peer(key)
    }
}
