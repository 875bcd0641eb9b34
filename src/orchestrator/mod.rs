/// Request-level composition of fetch, extraction, analysis and memoization
mod error;

pub use error::{DocumentSide, PersistenceError, PipelineError, PipelineResult};

use crate::analyzer::RetryingAnalyzer;
use crate::api::DocumentFetcher;
use crate::cache::{ArtifactStore, CacheEntry, CacheKey, CacheStore, InflightLocks};
use crate::extract::{ContentExtractor, ExtractedContent};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub findings: Vec<String>,
    pub cache_key: CacheKey,
    pub cache_hit: bool,
}

impl PipelineOutcome {
    /// Findings joined by single spaces, identical for hits and misses.
    pub fn response_text(&self) -> String {
        self.findings.join(" ")
    }
}

pub struct Orchestrator {
    fetcher: Arc<dyn DocumentFetcher>,
    extractor: ContentExtractor,
    analyzer: RetryingAnalyzer,
    store: Arc<dyn CacheStore>,
    artifacts: Arc<dyn ArtifactStore>,
    inflight: InflightLocks,
    request_timeout: Option<Duration>,
}

impl Orchestrator {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        analyzer: RetryingAnalyzer,
        store: Arc<dyn CacheStore>,
        artifacts: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            fetcher,
            extractor: ContentExtractor::default(),
            analyzer,
            store,
            artifacts,
            inflight: InflightLocks::new(),
            request_timeout: None,
        }
    }

    pub fn with_extractor(mut self, extractor: ContentExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Option<Duration>) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub async fn handle_request(
        &self,
        policy: &str,
        target: &str,
    ) -> PipelineResult<PipelineOutcome> {
        if policy.trim().is_empty() {
            return Err(PipelineError::InvalidInput("policy is required".to_string()));
        }
        if target.trim().is_empty() {
            return Err(PipelineError::InvalidInput("webpage is required".to_string()));
        }

        let cache_key = CacheKey::derive(policy, target);
        debug!("Cache key: {}", cache_key);
        if let Some(findings) = self.lookup(&cache_key).await {
            return Ok(PipelineOutcome {
                findings,
                cache_key,
                cache_hit: true,
            });
        }

        let guard = self.inflight.acquire(&cache_key).await;
        // A concurrent request for the same key may have finished while we waited.
        if let Some(findings) = self.lookup(&cache_key).await {
            return Ok(PipelineOutcome {
                findings,
                cache_key,
                cache_hit: true,
            });
        }

        let findings = self.compute(policy, target, &cache_key).await?;
        drop(guard);

        Ok(PipelineOutcome {
            findings,
            cache_key,
            cache_hit: false,
        })
    }

    /// Any failure to read a registered result is treated as a miss.
    async fn lookup(&self, cache_key: &CacheKey) -> Option<Vec<String>> {
        let entry = match self.store.get(cache_key).await {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Cache miss: {}", e);
                return None;
            }
        };
        match self.artifacts.read(&entry.artifact).await {
            Ok(findings) => {
                debug!("Cache hit: {} -> {}", cache_key, entry.artifact);
                Some(findings)
            }
            Err(e) => {
                warn!(
                    "Cache artifact {} unreadable, continuing as cache miss: {:?}",
                    entry.artifact, e
                );
                None
            }
        }
    }

    async fn compute(
        &self,
        policy: &str,
        target: &str,
        cache_key: &CacheKey,
    ) -> PipelineResult<Vec<String>> {
        // Both fetches run to completion so a double failure always names the policy.
        let (policy_content, target_content) = tokio::join!(
            self.fetch_and_extract(policy, DocumentSide::Policy),
            self.fetch_and_extract(target, DocumentSide::Target),
        );
        let (policy_content, target_content) = (policy_content?, target_content?);
        info!(
            "Extracted {} policy segments and {} webpage segments",
            policy_content.len(),
            target_content.len()
        );

        // A timeout too large to represent as an instant means no deadline.
        let deadline = self
            .request_timeout
            .and_then(|timeout| Instant::now().checked_add(timeout));
        let findings = self
            .analyzer
            .analyze(&policy_content, &target_content, deadline)
            .await?;

        debug!("Writing artifact: {}", cache_key);
        let artifact = self
            .artifacts
            .write(cache_key, &findings)
            .await
            .map_err(PersistenceError::from)?;
        self.store
            .insert(cache_key, CacheEntry::new(artifact))
            .await
            .map_err(PersistenceError::from)?;
        Ok(findings)
    }

    async fn fetch_and_extract(
        &self,
        reference: &str,
        side: DocumentSide,
    ) -> PipelineResult<ExtractedContent> {
        let bytes = self
            .fetcher
            .fetch(reference)
            .await
            .map_err(|source| PipelineError::FetchFailure { side, source })?;
        let content = self.extractor.extract_bytes(&bytes);
        if content.is_empty() {
            warn!("No content extracted from {} document: {}", side, reference);
        }
        Ok(content)
    }
}
