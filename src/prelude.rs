pub use crate::config::Config;
pub use crate::ds::{HashRing, IntrusiveList, SlotArena, SlotId};
pub use crate::engine::Engine;
pub use crate::error::{BoxError, CacheError, ConfigError};
pub use crate::group::Group;
#[cfg(feature = "metrics")]
pub use crate::metrics::GroupMetricsSnapshot;
pub use crate::peers::PeerPool;
pub use crate::policy::lru::{ByteLruCore, ConcurrentByteLru};
pub use crate::traits::{Loader, LoaderFn, PeerFetcher, PeerPicker};
pub use crate::value::{ByteLen, ByteView};
