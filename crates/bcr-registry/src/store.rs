//! # Keyed Store
//!
//! Thread-safe, cloneable in-memory store where each record sits behind
//! its own mutex. The outer `RwLock` only guards the key set, so writers
//! to different records never contend, and an update on one record holds
//! that record's lock for the whole read-validate-write.
//!
//! All locks are `parking_lot` and are never held across `.await`.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

/// Per-key serialized store.
#[derive(Debug)]
pub struct KeyedStore<K, T> {
    entries: Arc<RwLock<HashMap<K, Arc<Mutex<T>>>>>,
}

impl<K, T> Clone for KeyedStore<K, T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K, T> Default for KeyedStore<K, T> {
    fn default() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<K: Eq + Hash + Clone, T: Clone> KeyedStore<K, T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record only if the key is vacant. Returns whether it was
    /// inserted.
    pub fn insert_new(&self, key: K, value: T) -> bool {
        let mut guard = self.entries.write();
        if guard.contains_key(&key) {
            return false;
        }
        guard.insert(key, Arc::new(Mutex::new(value)));
        true
    }

    /// Insert or replace a record. Used when hydrating from storage.
    pub fn upsert(&self, key: K, value: T) {
        self.entries.write().insert(key, Arc::new(Mutex::new(value)));
    }

    /// Snapshot clone of one record.
    pub fn get(&self, key: &K) -> Option<T> {
        let entry = self.entries.read().get(key).cloned()?;
        let snapshot = entry.lock().clone();
        Some(snapshot)
    }

    /// Snapshot clones of every record, in no particular order.
    pub fn snapshot_all(&self) -> Vec<T> {
        let entries: Vec<Arc<Mutex<T>>> = self.entries.read().values().cloned().collect();
        entries.iter().map(|e| e.lock().clone()).collect()
    }

    /// Atomically read-validate-update one record.
    ///
    /// The closure runs under that record's exclusive lock. Returns `None`
    /// if the key does not exist.
    pub fn try_update<R, E>(
        &self,
        key: &K,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        let entry = self.entries.read().get(key).cloned()?;
        let mut guard = entry.lock();
        Some(f(&mut guard))
    }

    /// Remove a record if `remove` accepts it, checked under the
    /// record's lock. Returns whether it was removed.
    pub fn remove_if(&self, key: &K, remove: impl FnOnce(&T) -> bool) -> bool {
        let mut index = self.entries.write();
        let Some(entry) = index.get(key).cloned() else {
            return false;
        };
        let guard = entry.lock();
        if !remove(&guard) {
            return false;
        }
        drop(guard);
        index.remove(key);
        true
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
