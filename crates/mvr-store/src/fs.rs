use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{StoreError, StoreResult};
use crate::key::Key;
use crate::lock::{ExclusiveGuard, KeyedLocks};
use crate::traits::Storage;

/// Name prefix of in-flight temporary files. Never listed.
const TEMP_PREFIX: &str = ".mvr-tmp-";

/// Storage backed by a directory tree: one regular file per key.
///
/// Saves write a temporary file next to the target and rename it into place.
/// Deletes prune directories left empty, up to (not including) the root.
pub struct FileStorage {
    root: PathBuf,
    locks: KeyedLocks,
}

impl FileStorage {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            locks: KeyedLocks::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, key: &Key) -> PathBuf {
        key.parts().fold(self.root.clone(), |path, part| path.join(part))
    }
}

fn join_error(err: tokio::task::JoinError) -> StoreError {
    StoreError::Backend(format!("blocking task failed: {err}"))
}

fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::new(ErrorKind::InvalidInput, "key has no parent directory"))?;
    // A concurrent delete may prune the directory between creating it and
    // opening the temp file; retry once.
    let mut attempts = 0;
    let mut tmp = loop {
        std::fs::create_dir_all(parent)?;
        match tempfile::Builder::new().prefix(TEMP_PREFIX).tempfile_in(parent) {
            Ok(tmp) => break tmp,
            Err(e) if e.kind() == ErrorKind::NotFound && attempts == 0 => attempts += 1,
            Err(e) => return Err(e),
        }
    };
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn walk(root: &Path, dir: &Path) -> StoreResult<Vec<Key>> {
    let mut keys = Vec::new();
    for entry in walkdir::WalkDir::new(dir).min_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            // Pruned by a concurrent delete while walking.
            Err(e) if e.io_error().is_some_and(|io| io.kind() == ErrorKind::NotFound) => continue,
            Err(e) => {
                return Err(match e.into_io_error() {
                    Some(io) => StoreError::Io(io),
                    None => StoreError::Backend("directory walk failed".into()),
                })
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with(TEMP_PREFIX) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        keys.push(Key::new(&parts.join("/"))?);
    }
    keys.sort();
    Ok(keys)
}

#[async_trait]
impl Storage for FileStorage {
    async fn exists(&self, key: &Key) -> StoreResult<bool> {
        if key.is_root() {
            return Ok(false);
        }
        match tokio::fs::metadata(self.path_of(key)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn value(&self, key: &Key) -> StoreResult<Bytes> {
        if key.is_root() {
            return Err(StoreError::NotFound(key.clone()));
        }
        let path = self.path_of(key);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(key.clone())),
            Err(e) => match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_dir() => Err(StoreError::NotFound(key.clone())),
                _ => Err(e.into()),
            },
        }
    }

    async fn save(&self, key: &Key, content: Bytes) -> StoreResult<()> {
        if key.is_root() {
            return Err(StoreError::InvalidKey {
                key: String::new(),
                reason: "cannot store a value at the root".into(),
            });
        }
        let path = self.path_of(key);
        tokio::task::spawn_blocking(move || write_atomic(&path, &content))
            .await
            .map_err(join_error)??;
        tracing::trace!(key = %key, "saved");
        Ok(())
    }

    async fn list(&self, prefix: &Key) -> StoreResult<Vec<Key>> {
        let dir = self.path_of(prefix);
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Ok(Vec::new()),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        }
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || walk(&root, &dir))
            .await
            .map_err(join_error)?
    }

    async fn delete(&self, key: &Key) -> StoreResult<()> {
        if key.is_root() {
            return Ok(());
        }
        match tokio::fs::remove_file(self.path_of(key)).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        }
        let mut parent = key.parent();
        while let Some(dir) = parent.filter(|p| !p.is_root()) {
            // Fails on non-empty directories, which ends the walk.
            if tokio::fs::remove_dir(self.path_of(&dir)).await.is_err() {
                break;
            }
            parent = dir.parent();
        }
        Ok(())
    }

    async fn exclusive(&self, key: &Key) -> ExclusiveGuard {
        self.locks.lock(key).await
    }
}

impl std::fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStorage")
            .field("root", &self.root)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k(s: &str) -> Key {
        Key::new(s).unwrap()
    }

    fn store() -> (tempfile::TempDir, FileStorage) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStorage::open(dir.path().join("repo")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn save_creates_directories() {
        let (_dir, store) = store();
        store
            .save(&k("com/example/abc/1.0/abc-1.0.jar"), Bytes::from_static(b"jar"))
            .await
            .unwrap();
        assert!(store.root().join("com/example/abc/1.0/abc-1.0.jar").is_file());
        assert_eq!(
            store.value(&k("com/example/abc/1.0/abc-1.0.jar")).await.unwrap(),
            Bytes::from_static(b"jar")
        );
    }

    #[tokio::test]
    async fn directories_are_not_values() {
        let (_dir, store) = store();
        store.save(&k("a/b/c"), Bytes::from_static(b"1")).await.unwrap();
        assert!(!store.exists(&k("a/b")).await.unwrap());
        assert!(matches!(store.value(&k("a/b")).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.value(&k("x")).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_sorted_and_recursive() {
        let (_dir, store) = store();
        for key in ["a/b/2", "a/b/1", "a/c/d/e", "z"] {
            store.save(&k(key), Bytes::from_static(b".")).await.unwrap();
        }
        assert_eq!(
            store.list(&k("a")).await.unwrap(),
            vec![k("a/b/1"), k("a/b/2"), k("a/c/d/e")]
        );
        assert_eq!(store.list(&Key::root()).await.unwrap().len(), 4);
        assert!(store.list(&k("missing")).await.unwrap().is_empty());
        assert!(store.list(&k("z")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_skips_temp_files() {
        let (_dir, store) = store();
        store.save(&k("a/x"), Bytes::from_static(b".")).await.unwrap();
        std::fs::write(store.root().join("a").join(format!("{TEMP_PREFIX}123")), b"partial").unwrap();
        assert_eq!(store.list(&k("a")).await.unwrap(), vec![k("a/x")]);
    }

    #[tokio::test]
    async fn delete_prunes_empty_directories() {
        let (_dir, store) = store();
        store.save(&k(".upload/g/a/1.0/a.jar"), Bytes::from_static(b".")).await.unwrap();
        store.save(&k(".upload/g/b/1.0/b.jar"), Bytes::from_static(b".")).await.unwrap();
        store.delete(&k(".upload/g/a/1.0/a.jar")).await.unwrap();
        assert!(!store.root().join(".upload/g/a").exists());
        assert!(store.root().join(".upload/g/b/1.0").is_dir());
        assert!(store.root().is_dir());
        store.delete(&k(".upload/g/a/1.0/a.jar")).await.unwrap();
    }

    #[tokio::test]
    async fn overwrite_replaces_content() {
        let (_dir, store) = store();
        store.save(&k("f"), Bytes::from_static(b"long original")).await.unwrap();
        store.save(&k("f"), Bytes::from_static(b"new")).await.unwrap();
        assert_eq!(store.value(&k("f")).await.unwrap(), Bytes::from_static(b"new"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn list_tolerates_concurrent_pruning() {
        let (_dir, store) = store();
        let store = std::sync::Arc::new(store);
        let keep = k(".upload/g/a/keep/f.jar");
        store.save(&keep, Bytes::from_static(b"keep")).await.unwrap();

        let churn = {
            let store = store.clone();
            tokio::spawn(async move {
                for i in 0..2000 {
                    let key = k(&format!(".upload/g/a/v{}/x/y/f.jar", i % 7));
                    store.save(&key, Bytes::from_static(b".")).await.unwrap();
                    store.delete(&key).await.unwrap();
                }
            })
        };

        let prefix = k(".upload/g/a");
        while !churn.is_finished() {
            let keys = store.list(&prefix).await.unwrap();
            assert!(keys.contains(&keep));
        }
        churn.await.unwrap();
        assert_eq!(store.list(&prefix).await.unwrap(), vec![keep]);
    }

    #[tokio::test]
    async fn list_of_missing_prefix_is_empty() {
        let (_dir, store) = store();
        assert!(store.list(&k(".upload/g/a")).await.unwrap().is_empty());
    }
}
