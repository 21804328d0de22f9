use std::collections::HashMap;
use std::hash::Hash;

use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,

    #[error("Duplicate key")]
    Duplicate,
}

/// In-process document collection keyed by `K`.
///
/// Reads hand out clones; writes go through `update_with`, which runs the
/// caller's closure under the exclusive lock so a read-modify-write on a
/// single document is atomic with respect to every other writer.
pub struct Collection<K, V> {
    docs: RwLock<HashMap<K, V>>,
}

impl<K, V> Collection<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a new document. Fails if the key is already present.
    pub async fn insert(&self, key: K, value: V) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        if docs.contains_key(&key) {
            return Err(StoreError::Duplicate);
        }
        docs.insert(key, value);
        Ok(())
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let docs = self.docs.read().await;
        docs.get(key).cloned()
    }

    /// Returns clones of every document matching the predicate.
    pub async fn find<F>(&self, predicate: F) -> Vec<V>
    where
        F: Fn(&V) -> bool,
    {
        let docs = self.docs.read().await;
        docs.values().filter(|doc| predicate(doc)).cloned().collect()
    }

    /// Applies `f` to the document under the write lock and returns the
    /// updated document together with the closure's result. Closures are
    /// expected to validate before mutating so a rejected update leaves the
    /// document untouched.
    pub async fn update_with<R, F>(&self, key: &K, f: F) -> Result<(V, R), StoreError>
    where
        F: FnOnce(&mut V) -> R,
    {
        let mut docs = self.docs.write().await;
        let doc = docs.get_mut(key).ok_or(StoreError::NotFound)?;
        let result = f(doc);
        Ok((doc.clone(), result))
    }

    pub async fn len(&self) -> usize {
        let docs = self.docs.read().await;
        docs.len()
    }
}

impl<K, V> Default for Collection<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
