use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

use crate::key::Key;

type Registry = Arc<Mutex<HashMap<Key, Arc<tokio::sync::Mutex<()>>>>>;

/// In-process registry of per-key async mutexes.
///
/// A mutex exists only while some task holds or awaits it: the entry is
/// removed when the last [`ExclusiveGuard`] for a key is dropped with no
/// waiters left. Distinct keys never contend.
#[derive(Clone, Default)]
pub struct KeyedLocks {
    registry: Registry,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other guard for `key` is alive, then take one.
    pub async fn lock(&self, key: &Key) -> ExclusiveGuard {
        let mutex = {
            let mut map = self.registry.lock().expect("lock poisoned");
            Arc::clone(map.entry(key.clone()).or_default())
        };
        let guard = mutex.lock_owned().await;
        tracing::trace!(key = %key, "exclusive section entered");
        ExclusiveGuard {
            key: key.clone(),
            guard: Some(guard),
            registry: Arc::clone(&self.registry),
        }
    }

    /// Number of keys currently held or awaited.
    pub fn active(&self) -> usize {
        self.registry.lock().expect("lock poisoned").len()
    }
}

impl std::fmt::Debug for KeyedLocks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedLocks")
            .field("active", &self.active())
            .finish()
    }
}

/// Proof of exclusive access to one key. Released on drop.
pub struct ExclusiveGuard {
    key: Key,
    guard: Option<OwnedMutexGuard<()>>,
    registry: Registry,
}

impl ExclusiveGuard {
    pub fn key(&self) -> &Key {
        &self.key
    }
}

impl Drop for ExclusiveGuard {
    fn drop(&mut self) {
        let Some(guard) = self.guard.take() else {
            return;
        };
        // Waiters clone the mutex under the registry lock, so a strong count
        // of one after release means nobody else can reach this entry.
        let Ok(mut map) = self.registry.lock() else {
            return;
        };
        drop(guard);
        if map
            .get(&self.key)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1)
        {
            map.remove(&self.key);
        }
        tracing::trace!(key = %self.key, "exclusive section left");
    }
}

impl std::fmt::Debug for ExclusiveGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExclusiveGuard").field("key", &self.key).finish()
    }
}
