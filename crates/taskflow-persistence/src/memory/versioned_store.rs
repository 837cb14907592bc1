//! Version-checked map shared by the in-memory repositories

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use taskflow_domain::repositories::Versioned;

use crate::error::PersistenceError;

/// Map of aggregates whose writes are conditional on the aggregate version
///
/// The version comparison and the insert happen under one write lock, so two
/// writers that loaded the same version cannot both succeed.
#[derive(Debug)]
pub(crate) struct VersionedStore<K, T> {
    items: RwLock<HashMap<K, T>>,
}

impl<K, T> Default for VersionedStore<K, T> {
    fn default() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, T> VersionedStore<K, T>
where
    K: Eq + Hash + Clone + Display,
    T: Versioned + Clone,
{
    pub(crate) fn save(&self, key: &K, entity: &T) -> Result<T, PersistenceError> {
        let mut items = self.items.write();

        match items.get(key) {
            Some(stored) if stored.version() != entity.version() => {
                tracing::warn!(
                    entity_type = T::ENTITY_TYPE,
                    id = %key,
                    expected = entity.version(),
                    found = stored.version(),
                    "Rejected stale write"
                );
                return Err(PersistenceError::concurrency_conflict(format!(
                    "{} {} was modified concurrently (expected version {}, found {})",
                    T::ENTITY_TYPE,
                    key,
                    entity.version(),
                    stored.version()
                )));
            }
            None if entity.version() != 0 => {
                // Loaded earlier but deleted since.
                return Err(PersistenceError::not_found(T::ENTITY_TYPE, key.to_string()));
            }
            _ => {}
        }

        let mut saved = entity.clone();
        saved.set_version(entity.version() + 1);
        items.insert(key.clone(), saved.clone());
        Ok(saved)
    }

    pub(crate) fn get(&self, key: &K) -> Option<T> {
        self.items.read().get(key).cloned()
    }

    pub(crate) fn all(&self) -> Vec<T> {
        self.items.read().values().cloned().collect()
    }

    pub(crate) fn remove(&self, key: &K) -> bool {
        self.items.write().remove(key).is_some()
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.items.read().contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.items.read().len()
    }

    pub(crate) fn clear(&self) {
        self.items.write().clear();
    }
}
