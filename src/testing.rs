//! Scripted collaborators for unit tests.

use crate::analyzer::{PromptTemplate, RetryingAnalyzer};
use crate::api::completion::CompletionResult;
use crate::api::fetch::FetchResult;
use crate::api::{CompletionError, CompletionProvider, DocumentFetcher};
use crate::cache::{FileArtifactStore, InMemoryCacheStore};
use crate::orchestrator::Orchestrator;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub struct StubProvider {
    scripted: Mutex<VecDeque<CompletionResult<String>>>,
    fallback: fn() -> CompletionResult<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl StubProvider {
    pub fn always(fallback: fn() -> CompletionResult<String>) -> Self {
        Self::scripted(Vec::new(), fallback)
    }

    pub fn scripted(
        responses: Vec<CompletionResult<String>>,
        fallback: fn() -> CompletionResult<String>,
    ) -> Self {
        Self {
            scripted: Mutex::new(responses.into()),
            fallback,
            delay: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    async fn complete(&self, prompt: &str, _max_tokens: u32) -> CompletionResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.scripted.lock().unwrap().pop_front();
        next.unwrap_or_else(|| (self.fallback)())
    }
}

pub fn retryable_timeout() -> CompletionResult<String> {
    Err(CompletionError::Timeout { status: Some(503) })
}

pub fn unauthorized() -> CompletionResult<String> {
    Err(CompletionError::Api {
        status: 401,
        message: "invalid api key".to_string(),
    })
}

pub struct StubFetcher {
    documents: HashMap<String, Vec<u8>>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn new(documents: &[(&str, &str)]) -> Self {
        Self {
            documents: documents
                .iter()
                .map(|(url, body)| (url.to_string(), body.as_bytes().to_vec()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentFetcher for StubFetcher {
    async fn fetch(&self, reference: &str) -> FetchResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.documents.get(reference) {
            Some(body) => Ok(body.clone()),
            // Builder errors are the only reqwest::Error we can produce offline.
            None => Err(reqwest::Client::new()
                .get("not a url")
                .build()
                .unwrap_err()
                .into()),
        }
    }
}

/// Orchestrator over stubs with artifacts under `asset_root/asset`.
pub fn stub_orchestrator(
    fetcher: Arc<StubFetcher>,
    provider: Arc<StubProvider>,
    asset_root: &Path,
) -> Orchestrator {
    let analyzer = RetryingAnalyzer::new(provider, PromptTemplate::default(), 64);
    let artifacts = FileArtifactStore::new(Some(
        asset_root.join("asset").to_string_lossy().to_string(),
    ));
    Orchestrator::new(
        fetcher,
        analyzer,
        Arc::new(InMemoryCacheStore::default()),
        Arc::new(artifacts),
    )
}
