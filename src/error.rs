//! Error types for the groupcache library.
//!
//! ## Key Components
//!
//! - [`CacheError`]: Returned by [`Group::get`](crate::Group::get) and
//!   [`Group::add`](crate::Group::add). Loader and peer failures keep the
//!   collaborator's original error as their [`source`](std::error::Error::source).
//! - [`ConfigError`]: Returned when configuration cannot be read, parsed or
//!   validated.
//! - [`BoxError`]: The error type collaborators ([`Loader`](crate::Loader),
//!   [`PeerFetcher`](crate::PeerFetcher)) return.
//!
//! ## Example Usage
//!
//! ```
//! use groupcache::{CacheError, Engine};
//!
//! let engine = Engine::new();
//! let group = engine.add_group("scores", None, 1 << 10);
//!
//! assert!(matches!(group.get(""), Err(CacheError::KeyIsNil)));
//! let err = group.get("alice").unwrap_err();
//! assert!(err.is_not_found());
//! ```

use std::io;

use thiserror::Error;

/// Boxed error produced by loaders and peer fetchers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ---------------------------------------------------------------------------
// CacheError
// ---------------------------------------------------------------------------

/// Error returned by group operations.
///
/// Nothing is retried or swallowed: every variant describes the single call
/// that failed.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The key was the empty string.
    #[error("KeyIsNil")]
    KeyIsNil,

    /// Local miss and the group has no loader.
    #[error("KeyNotFound")]
    KeyNotFound,

    /// The group's loader failed; nothing was cached.
    #[error("loader failed for key {key:?}")]
    Loader {
        key: String,
        #[source]
        source: BoxError,
    },

    /// The owning peer could not serve the key.
    #[error("peer fetch failed for {group}/{key:?}")]
    Remote {
        group: String,
        key: String,
        #[source]
        source: BoxError,
    },
}

impl CacheError {
    /// `true` for [`CacheError::KeyNotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::KeyNotFound)
    }

    /// The collaborator error behind a loader or peer failure, if any.
    pub fn collaborator_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            CacheError::Loader { source, .. } | CacheError::Remote { source, .. } => {
                Some(source.as_ref())
            },
            CacheError::KeyIsNil | CacheError::KeyNotFound => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when configuration cannot be loaded or is invalid.
///
/// # Example
///
/// ```
/// use groupcache::Config;
///
/// let err = Config::from_json_str(r#"{ "hash": { "replicas": 0 } }"#).unwrap_err();
/// assert!(err.to_string().contains("replicas"));
/// ```
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file")]
    Io(#[from] io::Error),

    #[error("failed to parse config")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Creates a validation error with the given description.
    pub fn invalid(msg: impl Into<String>) -> Self {
        ConfigError::Invalid(msg.into())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
