use crate::cache::CacheKey;
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::OwnedMutexGuard;

type KeyLocks = HashMap<String, Arc<tokio::sync::Mutex<()>>>;

/// Per-key async locks so that only one request computes a given key at a
/// time. Later callers wait on the same lock and then find the result cached.
///
/// The map itself sits behind a plain mutex that is never held across an
/// await, so a guard can remove its own entry when dropped.
#[derive(Default)]
pub struct InflightLocks {
    locks: Arc<Mutex<KeyLocks>>,
}

fn lock_map(locks: &Mutex<KeyLocks>) -> MutexGuard<'_, KeyLocks> {
    locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InflightLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: &CacheKey) -> InflightGuard {
        let key_lock = lock_map(&self.locks)
            .entry(key.as_str().to_string())
            .or_insert_with(|| {
                debug!("InflightLocks: Creating lock for {}", key);
                Arc::new(tokio::sync::Mutex::new(()))
            })
            .clone();
        InflightGuard {
            key: key.as_str().to_string(),
            locks: self.locks.clone(),
            guard: Some(key_lock.lock_owned().await),
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        lock_map(&self.locks).len()
    }
}

/// Held while a key is being computed. Dropping it releases the key and
/// removes its lock once nobody else holds or waits on it.
pub struct InflightGuard {
    key: String,
    locks: Arc<Mutex<KeyLocks>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.guard.take();
        let mut locks = lock_map(&self.locks);
        let idle = locks
            .get(&self.key)
            .map_or(false, |key_lock| Arc::strong_count(key_lock) == 1);
        if idle {
            debug!("InflightLocks: Removing lock for {}", self.key);
            locks.remove(&self.key);
        }
    }
}
