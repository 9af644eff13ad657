use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreResult;
use crate::key::Key;
use crate::lock::ExclusiveGuard;

/// Asynchronous key/value storage.
///
/// All implementations must satisfy these invariants:
/// - `save` overwrites atomically from a reader's point of view.
/// - `list(prefix)` returns every stored key strictly below `prefix`
///   (component-wise), recursively, in ascending order.
/// - `delete` of a missing key succeeds.
/// - `exclusive(key)` resolves only once no other guard for `key` obtained
///   from the same storage is alive.
/// - All I/O errors are propagated, never silently ignored.
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Returns `true` if a value is stored under `key`.
    async fn exists(&self, key: &Key) -> StoreResult<bool>;

    /// Read the whole value. `StoreError::NotFound` if absent.
    async fn value(&self, key: &Key) -> StoreResult<Bytes>;

    /// Store `content` under `key`, replacing any previous value.
    async fn save(&self, key: &Key, content: Bytes) -> StoreResult<()>;

    /// Every key below `prefix`, sorted.
    async fn list(&self, prefix: &Key) -> StoreResult<Vec<Key>>;

    /// Remove the value under `key`, if any.
    async fn delete(&self, key: &Key) -> StoreResult<()>;

    /// Enter the exclusive section for `key`.
    async fn exclusive(&self, key: &Key) -> ExclusiveGuard;

    /// Copy a value. Default implementation reads then saves.
    async fn copy(&self, from: &Key, to: &Key) -> StoreResult<()> {
        let content = self.value(from).await?;
        self.save(to, content).await
    }
}
