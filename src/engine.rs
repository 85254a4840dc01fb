//! Group registry.
//!
//! An [`Engine`] maps group names to shared [`Group`] handles. It is an owned
//! value, not a process-wide singleton: applications typically create one and
//! share it as `Arc<Engine>`.
//!
//! Registering a name that already exists replaces the previous group. Handles
//! obtained earlier keep working against the old group, which is dropped once
//! the last handle goes away.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::config::Config;
use crate::group::Group;
use crate::traits::Loader;

/// Concurrency-safe directory of named groups.
///
/// # Example
///
/// ```
/// use groupcache::Engine;
///
/// let engine = Engine::new();
/// let first = engine.add_group("g", None, 1024);
/// let second = engine.add_group("g", None, 2048);
///
/// let current = engine.get_group("g").unwrap();
/// assert!(std::sync::Arc::ptr_eq(&current, &second));
/// assert!(!std::sync::Arc::ptr_eq(&current, &first));
/// assert_eq!(current.capacity_bytes(), 2048);
/// ```
#[derive(Default)]
pub struct Engine {
    groups: RwLock<FxHashMap<String, Arc<Group>>>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a group and installs it under `name`, replacing any group
    /// previously registered there.
    pub fn add_group(
        &self,
        name: impl Into<String>,
        loader: Option<Arc<dyn Loader>>,
        capacity_bytes: u64,
    ) -> Arc<Group> {
        let name = name.into();
        let group = Arc::new(Group::new(name.clone(), loader, capacity_bytes));
        let previous = self.groups.write().insert(name, Arc::clone(&group));
        if previous.is_some() {
            log::debug!("replaced group {} ({capacity_bytes} bytes)", group.name());
        } else {
            log::debug!("registered group {} ({capacity_bytes} bytes)", group.name());
        }
        group
    }

    /// [`add_group`](Self::add_group) sized by `config.cache.max_bytes`.
    pub fn add_group_with_config(
        &self,
        name: impl Into<String>,
        loader: Option<Arc<dyn Loader>>,
        config: &Config,
    ) -> Arc<Group> {
        self.add_group(name, loader, config.cache.max_bytes)
    }

    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    /// Unregisters `name` and returns the group that was installed.
    pub fn remove_group(&self, name: &str) -> Option<Arc<Group>> {
        let removed = self.groups.write().remove(name);
        if removed.is_some() {
            log::debug!("removed group {name}");
        }
        removed
    }

    /// Registered names, sorted.
    pub fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("groups", &self.group_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::value::ByteView;

    #[test]
    fn unknown_group_is_none() {
        let engine = Engine::new();
        assert!(engine.get_group("nope").is_none());
        assert!(engine.is_empty());
    }

    #[test]
    fn add_and_lookup() {
        let engine = Engine::new();
        let group = engine.add_group("scores", None, 128);
        let found = engine.get_group("scores").unwrap();
        assert!(Arc::ptr_eq(&group, &found));
        assert_eq!(found.name(), "scores");
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn reregistering_discards_previous_state() {
        let engine = Engine::new();
        let old = engine.add_group("g", None, 128);
        old.add("k", ByteView::from("v")).unwrap();

        let new = engine.add_group("g", None, 128);
        assert_eq!(engine.len(), 1);
        assert!(matches!(new.get("k"), Err(CacheError::KeyNotFound)));
        // The old handle still sees its own cache.
        assert_eq!(old.get("k").unwrap(), ByteView::from("v"));
    }

    #[test]
    fn config_sizes_group() {
        let engine = Engine::new();
        let config = Config::default().with_max_bytes(4096);
        let group = engine.add_group_with_config("g", None, &config);
        assert_eq!(group.capacity_bytes(), 4096);
    }

    #[test]
    fn remove_and_list() {
        let engine = Engine::new();
        engine.add_group("b", None, 1);
        engine.add_group("a", None, 1);
        assert_eq!(engine.group_names(), vec!["a", "b"]);

        assert!(engine.remove_group("a").is_some());
        assert!(engine.remove_group("a").is_none());
        assert_eq!(engine.group_names(), vec!["b"]);
    }

    #[test]
    fn engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
        assert_send_sync::<Group>();
    }
}
