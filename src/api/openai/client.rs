use crate::api::completion::{CompletionError, CompletionProvider, CompletionResult};
use crate::api::openai::types::*;
use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn with_timeout(
        timeout: Duration,
        base_url: &str,
        api_key: &str,
        model: &str,
    ) -> CompletionResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CompletionError::Transport)?;
        Ok(Self::new(client, base_url, api_key, model))
    }

    fn error_for_status(status: StatusCode, body: String) -> CompletionError {
        // A gateway timeout is the upstream reporting that it timed out.
        if status == StatusCode::GATEWAY_TIMEOUT {
            return CompletionError::Timeout {
                status: Some(status.as_u16()),
            };
        }
        let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(parsed) => parsed.error.message,
            Err(_) => body,
        };
        CompletionError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> CompletionResult<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            max_tokens,
            messages: vec![ChatMessage {
                role: ChatRole::User,
                content: prompt.to_string(),
            }],
        };
        debug!(
            "OpenAiClient: Requesting chat completion (model={}, prompt_len={})",
            self.model,
            prompt.len()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::from_transport(e, None))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CompletionError::from_transport(e, Some(status.as_u16())))?;
        if !status.is_success() {
            return Err(Self::error_for_status(status, body));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(CompletionError::EmptyResponse)
    }
}
