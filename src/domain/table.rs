//! Keyed in-memory collection behind a single async lock.
//!
//! Used for the users, tickets and contact messages. Reads hand out
//! clones so no lock outlives a call; [`Table::update`] runs a closure
//! under the write lock for check-and-set transitions.

use std::collections::HashMap;
use std::hash::Hash;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A `HashMap` of records guarded by a [`tokio::sync::RwLock`].
#[derive(Debug)]
pub struct Table<K, V> {
    rows: RwLock<HashMap<K, V>>,
}

impl<K, V> Table<K, V>
where
    K: Eq + Hash + Copy,
    V: Clone,
{
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts or replaces a record.
    pub async fn insert(&self, key: K, value: V) {
        self.rows.write().await.insert(key, value);
    }

    /// Inserts `value` unless a record conflicting with it already exists.
    ///
    /// `conflicts` is evaluated against every stored record while the
    /// write lock is held, so two concurrent inserts cannot both pass.
    ///
    /// # Errors
    ///
    /// Returns whatever `conflicts` produced for the first clashing record.
    pub async fn insert_unique<E>(
        &self,
        key: K,
        value: V,
        conflicts: impl Fn(&V, &V) -> Option<E>,
    ) -> Result<(), E> {
        let mut rows = self.rows.write().await;
        if let Some(err) = rows.values().find_map(|existing| conflicts(existing, &value)) {
            return Err(err);
        }
        rows.insert(key, value);
        Ok(())
    }

    /// Returns a clone of the record, if present.
    pub async fn get(&self, key: K) -> Option<V> {
        self.rows.read().await.get(&key).cloned()
    }

    /// Runs `f` on the record under the write lock and returns its result.
    ///
    /// Returns `None` if the key is absent.
    pub async fn update<R>(&self, key: K, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        self.rows.write().await.get_mut(&key).map(f)
    }

    /// Runs `f` with the whole map under the write lock.
    pub async fn with_all_mut<R>(&self, f: impl FnOnce(&mut HashMap<K, V>) -> R) -> R {
        let mut rows = self.rows.write().await;
        f(&mut rows)
    }

    /// Read-locks the whole table until the guard is dropped.
    ///
    /// Lets a caller keep a record from being removed while it works on
    /// other collections.
    pub async fn read_lock(&self) -> RwLockReadGuard<'_, HashMap<K, V>> {
        self.rows.read().await
    }

    /// Write-locks the whole table until the guard is dropped.
    pub async fn write_lock(&self) -> RwLockWriteGuard<'_, HashMap<K, V>> {
        self.rows.write().await
    }

    /// Removes and returns the record, if present.
    pub async fn remove(&self, key: K) -> Option<V> {
        self.rows.write().await.remove(&key)
    }

    /// Returns clones of every record matching `pred`.
    pub async fn filter(&self, pred: impl Fn(&V) -> bool) -> Vec<V> {
        self.rows
            .read()
            .await
            .values()
            .filter(|v| pred(v))
            .cloned()
            .collect()
    }

    /// Returns `true` if any record matches `pred`.
    pub async fn any(&self, pred: impl Fn(&V) -> bool) -> bool {
        self.rows.read().await.values().any(pred)
    }

    /// Replaces the whole content.
    pub async fn replace_all(&self, rows: impl IntoIterator<Item = (K, V)>) {
        let mut map = self.rows.write().await;
        map.clear();
        map.extend(rows);
    }

    /// Returns the number of records.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Returns `true` if the table is empty.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

impl<K, V> Default for Table<K, V>
where
    K: Eq + Hash + Copy,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
