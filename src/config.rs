//! Library configuration.
//!
//! Settings are plain serde structs so they can be embedded in an
//! application's own config or loaded from a standalone JSON file:
//!
//! ```json
//! {
//!   "cache": { "maxBytes": 1048576 },
//!   "hash":  { "replicas": 50 }
//! }
//! ```
//!
//! Every field has a default, so partial files are fine. A missing file is
//! not an error; [`Config::load`] falls back to [`Config::default`].

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default byte budget for a group's cache (1 MiB).
pub const DEFAULT_MAX_BYTES: u64 = 1 << 20;

/// Default number of virtual nodes per peer.
pub const DEFAULT_REPLICAS: usize = 50;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheSettings,
    pub hash: HashSettings,
}

/// Group cache sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheSettings {
    /// Byte budget used by [`Engine::add_group_with_config`](crate::Engine::add_group_with_config).
    pub max_bytes: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

/// Consistent-hash ring settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HashSettings {
    pub replicas: usize,
}

impl Default for HashSettings {
    fn default() -> Self {
        Self {
            replicas: DEFAULT_REPLICAS,
        }
    }
}

impl Config {
    /// Loads configuration from a JSON file.
    ///
    /// Returns the defaults when `path` does not exist. Read, parse and
    /// validation failures are returned as [`ConfigError`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("config {} not found, using defaults", path.display());
                return Ok(Self::default());
            },
            Err(err) => return Err(err.into()),
        };
        Self::from_json_str(&contents)
    }

    /// Parses configuration from a JSON document layered over the defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the ring cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hash.replicas == 0 {
            return Err(ConfigError::invalid("hash.replicas must be > 0"));
        }
        Ok(())
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.cache.max_bytes = max_bytes;
        self
    }

    pub fn with_replicas(mut self, replicas: usize) -> Self {
        self.hash.replicas = replicas;
        self
    }
}
