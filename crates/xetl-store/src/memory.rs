//! In-process object store.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::{ObjectStore, StoreError};

/// Object store backed by an in-memory ordered map.
///
/// Clones share the same objects.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    objects: Arc<RwLock<BTreeMap<String, Bytes>>>,
    reject_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `put` fail (or succeed again with `false`).
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Returns all keys in the store.
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    /// Returns the number of objects in the store.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Returns true if the store holds no objects.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let objects = self.objects.read().await;
        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })
    }

    async fn put(&self, key: &str, body: Bytes) -> Result<(), StoreError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write {
                key: key.to_string(),
                source: std::io::Error::other("writes are rejected"),
            });
        }
        self.objects.write().await.insert(key.to_string(), body);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get() {
        let store = MemoryStore::new();
        store
            .put("prefix/test1.csv", Bytes::from_static(b"col1,col2\nvalA,valB\n"))
            .await
            .unwrap();

        let body = store.get("prefix/test1.csv").await.unwrap();
        assert_eq!(&body[..], b"col1,col2\nvalA,valB\n");
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = MemoryStore::new();
        let err = store.get("meta.csv").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_prefix_sorted() {
        let store = MemoryStore::new();
        for key in [
            "2022-09-16/b.csv",
            "2022-09-15/a.csv",
            "2022-09-16/a.csv",
            "2022-09-17/a.csv",
        ] {
            store.put(key, Bytes::new()).await.unwrap();
        }

        let keys = store.list("2022-09-16").await.unwrap();
        assert_eq!(keys, vec!["2022-09-16/a.csv", "2022-09-16/b.csv"]);
        assert!(store.list("2023").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryStore::new();
        store.put("k", Bytes::from_static(b"old")).await.unwrap();
        store.put("k", Bytes::from_static(b"new")).await.unwrap();

        assert_eq!(&store.get("k").await.unwrap()[..], b"new");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_reject_writes() {
        let store = MemoryStore::new();
        store.reject_writes(true);
        assert!(matches!(
            store.put("k", Bytes::new()).await,
            Err(StoreError::Write { .. })
        ));
        assert!(store.is_empty().await);

        store.reject_writes(false);
        assert!(store.put("k", Bytes::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_clones_share_objects() {
        let store = MemoryStore::new();
        let view = store.clone();
        store.put("k", Bytes::from_static(b"v")).await.unwrap();
        assert_eq!(view.keys().await, vec!["k"]);
    }
}
