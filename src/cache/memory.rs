use crate::cache::{CacheEntry, CacheError, CacheKey, CacheResult, CacheStore};
use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process [`CacheStore`] guarded by a single reader/writer lock.
///
/// The lock is held only for the duration of one map operation.
pub struct InMemoryCacheStore {
    db: RwLock<HashMap<String, CacheEntry>>,
    max_age: Option<chrono::Duration>,
}

impl InMemoryCacheStore {
    pub fn new(max_age: Option<chrono::Duration>) -> Self {
        Self {
            db: RwLock::new(HashMap::new()),
            max_age,
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.db.read().await.len()
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        match self.max_age {
            Some(max_age) => {
                chrono::Utc::now().signed_duration_since(entry.registered_at) > max_age
            }
            None => false,
        }
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn insert(&self, key: &CacheKey, entry: CacheEntry) -> CacheResult<()> {
        let mut db = self.db.write().await;
        db.insert(key.as_str().to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &CacheKey) -> CacheResult<CacheEntry> {
        let db = self.db.read().await;
        match db.get(key.as_str()) {
            Some(entry) if self.is_expired(entry) => {
                debug!("Cache entry expired: {}", key);
                Err(CacheError::NotFound(key.to_string()))
            }
            Some(entry) => Ok(entry.clone()),
            None => Err(CacheError::NotFound(key.to_string())),
        }
    }
}
