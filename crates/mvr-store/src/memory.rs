use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{StoreError, StoreResult};
use crate::key::Key;
use crate::lock::{ExclusiveGuard, KeyedLocks};
use crate::traits::Storage;

/// In-memory, `BTreeMap`-based storage.
///
/// Intended for tests and embedding. Values are held behind a `RwLock`;
/// `Bytes` clones are reference-counted so reads never copy content.
pub struct InMemoryStorage {
    values: RwLock<BTreeMap<Key, Bytes>>,
    locks: KeyedLocks,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(BTreeMap::new()),
            locks: KeyedLocks::new(),
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().expect("lock poisoned").is_empty()
    }

    /// Every stored key, sorted.
    pub fn keys(&self) -> Vec<Key> {
        self.values
            .read()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect()
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn exists(&self, key: &Key) -> StoreResult<bool> {
        Ok(self.values.read().expect("lock poisoned").contains_key(key))
    }

    async fn value(&self, key: &Key) -> StoreResult<Bytes> {
        self.values
            .read()
            .expect("lock poisoned")
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.clone()))
    }

    async fn save(&self, key: &Key, content: Bytes) -> StoreResult<()> {
        if key.is_root() {
            return Err(StoreError::InvalidKey {
                key: String::new(),
                reason: "cannot store a value at the root".into(),
            });
        }
        self.values
            .write()
            .expect("lock poisoned")
            .insert(key.clone(), content);
        Ok(())
    }

    async fn list(&self, prefix: &Key) -> StoreResult<Vec<Key>> {
        let map = self.values.read().expect("lock poisoned");
        // Every descendant of `a/b` sorts after `a/b` itself; stop at the
        // first key that no longer shares the raw string prefix.
        let keys = map
            .range::<Key, _>((Bound::Excluded(prefix), Bound::Unbounded))
            .map(|(key, _)| key)
            .take_while(|key| key.as_str().starts_with(prefix.as_str()))
            .filter(|key| key.starts_with(prefix) && *key != prefix)
            .cloned()
            .collect();
        Ok(keys)
    }

    async fn delete(&self, key: &Key) -> StoreResult<()> {
        self.values.write().expect("lock poisoned").remove(key);
        Ok(())
    }

    async fn exclusive(&self, key: &Key) -> ExclusiveGuard {
        self.locks.lock(key).await
    }
}

impl std::fmt::Debug for InMemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStorage")
            .field("value_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k(s: &str) -> Key {
        Key::new(s).unwrap()
    }

    async fn seeded() -> InMemoryStorage {
        let store = InMemoryStorage::new();
        for key in ["a/b/1", "a/b/2", "a/bc/1", "a/b-x", "z"] {
            store.save(&k(key), Bytes::from(key.to_string())).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn save_and_read_back() {
        let store = InMemoryStorage::new();
        store.save(&k("x/y"), Bytes::from_static(b"hello")).await.unwrap();
        assert!(store.exists(&k("x/y")).await.unwrap());
        assert_eq!(store.value(&k("x/y")).await.unwrap(), Bytes::from_static(b"hello"));
        assert!(!store.exists(&k("x")).await.unwrap());
    }

    #[tokio::test]
    async fn save_overwrites() {
        let store = InMemoryStorage::new();
        store.save(&k("x"), Bytes::from_static(b"1")).await.unwrap();
        store.save(&k("x"), Bytes::from_static(b"2")).await.unwrap();
        assert_eq!(store.value(&k("x")).await.unwrap(), Bytes::from_static(b"2"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn missing_value_is_not_found() {
        let store = InMemoryStorage::new();
        let err = store.value(&k("nope")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(key) if key == k("nope")));
    }

    #[tokio::test]
    async fn list_is_component_wise() {
        let store = seeded().await;
        let keys = store.list(&k("a/b")).await.unwrap();
        assert_eq!(keys, vec![k("a/b/1"), k("a/b/2")]);
        assert_eq!(store.list(&Key::root()).await.unwrap().len(), 5);
        assert!(store.list(&k("q")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = seeded().await;
        store.delete(&k("a/b/1")).await.unwrap();
        store.delete(&k("a/b/1")).await.unwrap();
        assert_eq!(store.list(&k("a/b")).await.unwrap(), vec![k("a/b/2")]);
    }

    #[tokio::test]
    async fn copy_duplicates_value() {
        let store = seeded().await;
        store.copy(&k("z"), &k("y/z")).await.unwrap();
        assert_eq!(store.value(&k("y/z")).await.unwrap(), Bytes::from_static(b"z"));
        assert!(store.exists(&k("z")).await.unwrap());
    }

    #[tokio::test]
    async fn root_is_not_a_value() {
        let store = InMemoryStorage::new();
        assert!(store.save(&Key::root(), Bytes::new()).await.is_err());
    }
}
