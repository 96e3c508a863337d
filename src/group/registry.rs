//! Group Registry
//!
//! Maps group names to live [`Group`]s. Built once by whoever assembles the
//! node and shared (behind an `Arc`) with everything that resolves groups by
//! name, such as the peer HTTP handlers. Groups are never removed.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::getter::Getter;
use super::group::Group;
use crate::error::{CacheError, Result};

pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Adds `group` under its name.
    ///
    /// # Returns
    /// * `Ok(group)` shared handle to the registered group.
    /// * `Err(CacheError::Configuration)` if the name is already taken.
    pub fn register(&self, group: Group) -> Result<Arc<Group>> {
        let mut groups = self.groups.write();
        if groups.contains_key(group.name()) {
            return Err(CacheError::Configuration(format!(
                "group {} is already registered",
                group.name()
            )));
        }

        let group = Arc::new(group);
        groups.insert(group.name().to_string(), group.clone());
        tracing::info!("Registered cache group: {}", group.name());

        Ok(group)
    }

    /// Shorthand for building a group with default options and registering it.
    pub fn new_group(
        &self,
        name: &str,
        cache_bytes: usize,
        getter: Arc<dyn Getter>,
    ) -> Result<Arc<Group>> {
        self.register(Group::new(name, cache_bytes, getter))
    }

    /// Looks up a group by name; unknown names are simply absent.
    pub fn get(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }
}

impl Default for GroupRegistry {
    fn default() -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
        }
    }
}
