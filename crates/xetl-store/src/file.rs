//! Local directory used as a bucket.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::{ObjectStore, StoreError};

/// Object store rooted at a local directory.
///
/// The key `2022-09-16/trades.csv` maps to `<root>/2022-09-16/trades.csv`.
/// Writes go to a sibling `.partial` file that is renamed over the target,
/// so readers never observe a half-written object.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `root`. The directory is created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a key onto a path below the root.
    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let invalid = |reason: &str| StoreError::InvalidKey {
            key: key.to_string(),
            reason: reason.to_string(),
        };

        if key.is_empty() || key.ends_with('/') {
            return Err(invalid("key must name an object"));
        }

        let relative = Path::new(key);
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => return Err(invalid("key must stay below the store root")),
            }
        }

        Ok(self.root.join(relative))
    }

    /// Converts a path below the root back into a key.
    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }
}

/// Returns true if keys below the directory `dir_key` can start with `prefix`.
fn may_hold_prefix(dir_key: &str, prefix: &str) -> bool {
    dir_key.starts_with(prefix)
        || prefix
            .strip_prefix(dir_key)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[async_trait]
impl ObjectStore for FileStore {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let list_err = |source| StoreError::List {
            prefix: prefix.to_string(),
            source,
        };

        let start = match prefix.rsplit_once('/') {
            Some((dir, _)) if !dir.is_empty() => self.path_for(dir)?,
            _ => self.root.clone(),
        };
        if !fs::try_exists(&start).await.map_err(list_err)? {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        let mut pending = vec![start];
        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await.map_err(list_err)?;
            while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
                let path = entry.path();
                let Some(key) = self.key_for(&path) else {
                    continue;
                };
                let file_type = entry.file_type().await.map_err(list_err)?;
                if file_type.is_dir() {
                    if may_hold_prefix(&key, prefix) {
                        pending.push(path);
                    }
                } else if key.starts_with(prefix) && !key.ends_with(".partial") {
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound {
                key: key.to_string(),
            }),
            Err(e) => Err(StoreError::Read {
                key: key.to_string(),
                source: e,
            }),
        }
    }

    async fn put(&self, key: &str, body: Bytes) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let write_err = |source| StoreError::Write {
            key: key.to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let mut partial = path.clone().into_os_string();
        partial.push(".partial");
        let partial = PathBuf::from(partial);

        fs::write(&partial, &body).await.map_err(write_err)?;
        fs::rename(&partial, &path).await.map_err(write_err)?;

        tracing::debug!(key, bytes = body.len(), root = %self.root.display(), "object written");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file://{}", self.root.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("bucket"));

        store
            .put("report1/xetra_daily_report1_20220919.csv", Bytes::from_static(b"a\n1\n"))
            .await
            .unwrap();

        assert!(
            temp_dir
                .path()
                .join("bucket/report1/xetra_daily_report1_20220919.csv")
                .exists()
        );
        let body = store
            .get("report1/xetra_daily_report1_20220919.csv")
            .await
            .unwrap();
        assert_eq!(&body[..], b"a\n1\n");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        let err = store.get("meta_file.csv").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_recurses_and_filters() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        for key in [
            "2022-09-16/2022-09-16_BINS_XETR14.csv",
            "2022-09-16/2022-09-16_BINS_XETR13.csv",
            "2022-09-17/2022-09-17_BINS_XETR07.csv",
        ] {
            store.put(key, Bytes::from_static(b"x")).await.unwrap();
        }

        let keys = store.list("2022-09-16").await.unwrap();
        assert_eq!(
            keys,
            vec![
                "2022-09-16/2022-09-16_BINS_XETR13.csv",
                "2022-09-16/2022-09-16_BINS_XETR14.csv",
            ]
        );
        assert_eq!(store.list("").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_list_nested_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        for key in [
            "report1/xetra_daily_report1_20220919.csv",
            "report1/xetra_daily_report1_20220920.csv",
            "report2/xetra_daily_report2_20220919.csv",
            "report1/archive/old.csv",
        ] {
            store.put(key, Bytes::from_static(b"x")).await.unwrap();
        }

        assert_eq!(
            store.list("report1/xetra").await.unwrap(),
            vec![
                "report1/xetra_daily_report1_20220919.csv",
                "report1/xetra_daily_report1_20220920.csv",
            ]
        );
        assert_eq!(store.list("report1/").await.unwrap().len(), 3);
        assert_eq!(store.list("report").await.unwrap().len(), 4);
        assert!(store.list("report3/").await.unwrap().is_empty());
    }

    #[test]
    fn test_may_hold_prefix() {
        assert!(may_hold_prefix("2022-09-16", "2022-09-16"));
        assert!(may_hold_prefix("2022-09-16", "2022-09"));
        assert!(may_hold_prefix("report1", "report1/xetra"));
        assert!(!may_hold_prefix("report1", "report10/x"));
        assert!(!may_hold_prefix("2022-09-17", "2022-09-16"));
    }

    #[tokio::test]
    async fn test_list_missing_root_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("nothing-here"));
        assert!(store.list("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        for key in ["../outside.csv", "/etc/passwd", "", "dir/"] {
            assert!(
                matches!(
                    store.put(key, Bytes::new()).await,
                    Err(StoreError::InvalidKey { .. })
                ),
                "key {key:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_put_overwrites_without_leftovers() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        store.put("meta_file.csv", Bytes::from_static(b"old")).await.unwrap();
        store.put("meta_file.csv", Bytes::from_static(b"new")).await.unwrap();

        assert_eq!(&store.get("meta_file.csv").await.unwrap()[..], b"new");
        assert_eq!(store.list("").await.unwrap(), vec!["meta_file.csv"]);
    }
}
