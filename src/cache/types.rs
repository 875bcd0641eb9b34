use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Length of the hex digest prefix used to name persisted artifacts.
const DIGEST_NAME_LEN: usize = 10;

/// Lookup key for one (policy, target) pair.
///
/// The key is the literal concatenation of both references, policy first.
/// It is order-sensitive and never normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn derive(policy: &str, target: &str) -> Self {
        Self(format!("{}{}", policy, target))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fixed-length, filesystem-safe name derived from the key.
    pub fn digest_name(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        let mut name = hex::encode(digest);
        name.truncate(DIGEST_NAME_LEN);
        name
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where an analysis result is durably stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef(pub String);

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub artifact: ArtifactRef,
    pub registered_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(artifact: ArtifactRef) -> Self {
        Self {
            artifact,
            registered_at: Utc::now(),
        }
    }
}

/// Maps a [`CacheKey`] to the artifact holding its findings.
///
/// The store only records *where* a result lives, never the result bytes, so
/// a backend can be swapped (in-process map, Redis, a blob index) without
/// touching the key space. Implementations must be safe to share across
/// concurrent requests.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn insert(&self, key: &CacheKey, entry: CacheEntry) -> CacheResult<()>;
    async fn get(&self, key: &CacheKey) -> CacheResult<CacheEntry>;
}

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("Cache key not found: {0}")]
    NotFound(String),
}

/// Durable backing for analysis results, addressed by the key's digest name.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persists `findings` for `key`. Creates the artifact exclusively when it
    /// is absent and reopens it for writing when it already exists.
    async fn write(&self, key: &CacheKey, findings: &[String]) -> ArtifactResult<ArtifactRef>;
    async fn read(&self, artifact: &ArtifactRef) -> ArtifactResult<Vec<String>>;
}

pub type ArtifactResult<T> = Result<T, ArtifactError>;

#[derive(thiserror::Error, Debug)]
pub enum ArtifactError {
    #[error("Artifact IO failed: {0}")]
    IO(#[from] std::io::Error),
    #[error("Artifact serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}
