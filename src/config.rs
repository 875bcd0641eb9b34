use crate::analyzer::{Backoff, FindingGranularity, RetryPolicy, DEFAULT_PROMPT};
use crate::api::openai::DEFAULT_BASE_URL;
use crate::extract::DEFAULT_HEADING_TAGS;
use serde::Deserialize;
use std::time::Duration;

pub const ENV_PREFIX: &str = "COMPLIANCE_";

/// Process configuration, read from `COMPLIANCE_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    /// Output token budget per completion.
    #[serde(default = "default_openai_tokens")]
    pub openai_tokens: u32,
    #[serde(default = "default_openai_timeout_secs")]
    pub openai_timeout_secs: u64,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_prompt")]
    pub prompt: String,
    #[serde(default = "default_asset_directory")]
    pub asset_directory: String,
    pub request_timeout_secs: Option<u64>,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default)]
    pub retry_backoff: BackoffStrategy,
    #[serde(default)]
    pub retry_backoff_ms: u64,
    #[serde(default)]
    pub finding_granularity: FindingGranularity,
    pub cache_max_age_hours: Option<i64>,
    #[serde(default = "default_heading_tags")]
    pub heading_tags: Vec<String>,
}

/// Shape of the delay between retries; `retry_backoff_ms` sets its scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    Fixed,
    #[default]
    Exponential,
}

fn default_port() -> u16 {
    8080
}

fn default_openai_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_openai_model() -> String {
    "gpt-4".to_string()
}

fn default_openai_tokens() -> u32 {
    1024
}

fn default_openai_timeout_secs() -> u64 {
    60
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_prompt() -> String {
    DEFAULT_PROMPT.to_string()
}

fn default_asset_directory() -> String {
    "asset".to_string()
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_heading_tags() -> Vec<String> {
    DEFAULT_HEADING_TAGS.iter().map(|t| t.to_string()).collect()
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX).from_iter::<_, Config>(vars)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let backoff = match (self.retry_backoff, self.retry_backoff_ms) {
            (_, 0) => Backoff::None,
            (BackoffStrategy::Fixed, ms) => Backoff::Fixed(Duration::from_millis(ms)),
            (BackoffStrategy::Exponential, ms) => Backoff::Exponential {
                base: Duration::from_millis(ms),
                max: Duration::from_millis(ms.saturating_mul(8)),
            },
        };
        RetryPolicy {
            max_attempts: self.retry_attempts,
            backoff,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn cache_max_age(&self) -> Option<chrono::Duration> {
        self.cache_max_age_hours.and_then(chrono::Duration::try_hours)
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
