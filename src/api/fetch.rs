use async_trait::async_trait;
use log::debug;
use std::time::Duration;

/// Retrieves the raw bytes behind a document reference.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, reference: &str) -> FetchResult<Vec<u8>>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn with_timeout(timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::new(client))
    }

    async fn build_request(&self, url: &str) -> FetchResult<reqwest::Response> {
        debug!("Requesting URL: {}", url);
        let request = self.client.get(url).build().map_err(FetchError::from);
        let response = self
            .client
            .execute(request?)
            .await
            .map_err(FetchError::from)?;
        response
            .error_for_status()
            .map_err(FetchError::HttpResponseFailure)
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, reference: &str) -> FetchResult<Vec<u8>> {
        let response = self.build_request(reference).await?;
        let bytes = response.bytes().await?;
        debug!("Fetched {} bytes from {}", bytes.len(), reference);
        Ok(bytes.to_vec())
    }
}

pub type FetchResult<T> = Result<T, FetchError>;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("HTTP client failure: {0}")]
    HttpFailure(#[from] reqwest::Error),
    #[error("HTTP response error: {0}")]
    HttpResponseFailure(reqwest::Error),
}
