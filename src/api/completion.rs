use async_trait::async_trait;

/// An opaque text-completion capability: given a prompt, returns text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> CompletionResult<String>;
}

pub type CompletionResult<T> = Result<T, CompletionError>;

#[derive(thiserror::Error, Debug)]
pub enum CompletionError {
    #[error("Completion request timed out (upstream status: {status:?})")]
    Timeout { status: Option<u16> },
    #[error("Completion transport failure: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Completion API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Completion response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Completion response contained no choices")]
    EmptyResponse,
}

impl CompletionError {
    /// Maps a client error, keeping the status when one had already arrived.
    pub fn from_transport(error: reqwest::Error, status: Option<u16>) -> Self {
        if error.is_timeout() {
            let status = status.or_else(|| error.status().map(|s| s.as_u16()));
            CompletionError::Timeout { status }
        } else {
            CompletionError::Transport(error)
        }
    }

    pub fn timed_out(&self) -> bool {
        matches!(self, CompletionError::Timeout { .. })
    }

    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            CompletionError::Timeout { status } => *status,
            CompletionError::Transport(e) => e.status().map(|s| s.as_u16()),
            CompletionError::Api { status, .. } => Some(*status),
            CompletionError::Decode(_) | CompletionError::EmptyResponse => None,
        }
    }
}
