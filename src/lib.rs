//! groupcache: byte-bounded LRU groups with loader fallback and
//! consistent-hash peer delegation.
//!
//! Keys live in named [`Group`]s registered on an [`Engine`]. Each group owns
//! a lazily built, byte-accounted LRU ([`policy::lru`]) and may fall back to a
//! [`Loader`] on miss. A [`PeerPicker`], usually a [`PeerPool`] backed by a
//! [`HashRing`], routes keys owned by other nodes to their [`PeerFetcher`].
//!
//! ```
//! use std::sync::Arc;
//! use groupcache::prelude::*;
//!
//! let engine = Engine::new();
//! let loader = LoaderFn::new(|key: &str| Ok(key.len().to_string().into_bytes()));
//! let group = engine.add_group("lengths", Some(Arc::new(loader)), 1 << 20);
//!
//! assert_eq!(group.get("hello").unwrap(), ByteView::from("5"));
//! ```
//!
//! Transport, request encoding and process startup are left to the
//! application; it supplies them by implementing [`PeerFetcher`].

pub mod config;
pub mod ds;
pub mod engine;
pub mod error;
pub mod group;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod peers;
pub mod policy;
pub mod prelude;
pub mod traits;
pub mod value;

pub use config::Config;
pub use ds::HashRing;
pub use engine::Engine;
pub use error::{BoxError, CacheError, ConfigError};
pub use group::Group;
#[cfg(feature = "metrics")]
pub use metrics::GroupMetricsSnapshot;
pub use peers::PeerPool;
pub use traits::{Loader, LoaderFn, PeerFetcher, PeerPicker};
pub use value::{ByteLen, ByteView};
