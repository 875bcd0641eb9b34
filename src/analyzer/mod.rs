/// Turns a pair of extracted documents into findings through the completion
/// capability, retrying transient upstream timeouts
mod findings;
mod prompt;
mod retry;

pub use findings::FindingGranularity;
pub use prompt::{PromptTemplate, DEFAULT_PROMPT};
pub use retry::{classify, Backoff, ErrorClass, RetryPolicy};

use crate::api::{CompletionError, CompletionProvider};
use crate::extract::ExtractedContent;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::time::Instant;

pub struct RetryingAnalyzer {
    provider: Arc<dyn CompletionProvider>,
    template: PromptTemplate,
    max_tokens: u32,
    retry_policy: RetryPolicy,
    granularity: FindingGranularity,
}

impl RetryingAnalyzer {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        template: PromptTemplate,
        max_tokens: u32,
    ) -> Self {
        Self {
            provider,
            template,
            max_tokens,
            retry_policy: RetryPolicy::default(),
            granularity: FindingGranularity::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn with_granularity(mut self, granularity: FindingGranularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Runs the completion for both documents and splits the reply into
    /// findings. Stateless across calls; `deadline` bounds all attempts.
    pub async fn analyze(
        &self,
        policy: &ExtractedContent,
        target: &ExtractedContent,
        deadline: Option<Instant>,
    ) -> AnalysisResult<Vec<String>> {
        let prompt = self.template.render(target, policy);
        let max_attempts = self.retry_policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!("RetryingAnalyzer: attempt {}/{}", attempt, max_attempts);
            let call = self.provider.complete(&prompt, self.max_tokens);
            let outcome = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, call).await {
                    Ok(outcome) => outcome,
                    Err(_) => return Err(AnalysisError::DeadlineExceeded { attempts: attempt }),
                },
                None => call.await,
            };

            let error = match outcome {
                Ok(text) => return Ok(self.granularity.split(&text)),
                Err(error) => error,
            };

            match classify(&error) {
                ErrorClass::Terminal { status } => {
                    warn!(
                        "RetryingAnalyzer: non-retryable failure (status={:?}): {}",
                        status, error
                    );
                    return Err(AnalysisError::Terminal {
                        attempts: attempt,
                        source: error,
                    });
                }
                ErrorClass::Retryable { .. } if attempt >= max_attempts => {
                    warn!("RetryingAnalyzer: giving up after {} attempts: {}", attempt, error);
                    return Err(AnalysisError::Exhausted {
                        attempts: attempt,
                        source: error,
                    });
                }
                ErrorClass::Retryable { status } => {
                    let delay = self.retry_policy.backoff.delay(attempt);
                    info!(
                        "RetryingAnalyzer: retrying after upstream timeout (status={}, delay={:?})",
                        status, delay
                    );
                    if let Some(deadline) = deadline {
                        let resume_at = Instant::now().checked_add(delay);
                        if resume_at.map_or(true, |resume_at| resume_at >= deadline) {
                            return Err(AnalysisError::DeadlineExceeded { attempts: attempt });
                        }
                    }
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("Analysis failed after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        source: CompletionError,
    },
    #[error("Analysis failed: {source}")]
    Terminal {
        attempts: u32,
        source: CompletionError,
    },
    #[error("Analysis deadline exceeded after {attempts} attempts")]
    DeadlineExceeded { attempts: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::SegmentKind;
    use crate::testing::{retryable_timeout, unauthorized, StubProvider};
    use std::time::Duration;

    fn content(text: &str) -> ExtractedContent {
        let mut content = ExtractedContent::new();
        content.push(SegmentKind::Paragraph, text.to_string());
        content
    }

    fn analyzer(provider: Arc<StubProvider>) -> RetryingAnalyzer {
        RetryingAnalyzer::new(provider, PromptTemplate::new("{webpage}||{policy}"), 64)
    }

    #[tokio::test]
    async fn test_success_tokenizes_on_whitespace() {
        let provider = Arc::new(StubProvider::always(|| {
            Ok("Fee-duration-mismatch  refund\nwindow".to_string())
        }));
        let findings = analyzer(provider.clone())
            .analyze(&content("policy"), &content("page"), None)
            .await
            .unwrap();
        assert_eq!(findings, vec!["Fee-duration-mismatch", "refund", "window"]);
        assert_eq!(provider.calls(), 1);
        assert_eq!(provider.last_prompt().unwrap(), "page||policy");
    }

    #[tokio::test]
    async fn test_retryable_timeout_stops_after_three_attempts() {
        let provider = Arc::new(StubProvider::always(retryable_timeout));
        let err = analyzer(provider.clone())
            .analyze(&content("p"), &content("t"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Exhausted { attempts: 3, .. }));
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_failure_is_called_once() {
        let provider = Arc::new(StubProvider::always(unauthorized));
        let err = analyzer(provider.clone())
            .analyze(&content("p"), &content("t"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Terminal { attempts: 1, .. }));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_timeout_without_listed_status_is_called_once() {
        let provider = Arc::new(StubProvider::always(|| {
            Err(CompletionError::Timeout { status: None })
        }));
        analyzer(provider.clone())
            .analyze(&content("p"), &content("t"), None)
            .await
            .unwrap_err();
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_timeout() {
        let provider = Arc::new(StubProvider::scripted(
            vec![retryable_timeout()],
            || Ok("ok".to_string()),
        ));
        let findings = analyzer(provider.clone())
            .analyze(&content("p"), &content("t"), None)
            .await
            .unwrap();
        assert_eq!(findings, vec!["ok"]);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_custom_attempt_limit() {
        let provider = Arc::new(StubProvider::always(retryable_timeout));
        let err = analyzer(provider.clone())
            .with_retry_policy(RetryPolicy {
                max_attempts: 5,
                backoff: Backoff::Fixed(Duration::from_millis(1)),
            })
            .analyze(&content("p"), &content("t"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Exhausted { attempts: 5, .. }));
        assert_eq!(provider.calls(), 5);
    }

    #[tokio::test]
    async fn test_deadline_abandons_slow_call() {
        let provider = Arc::new(
            StubProvider::always(|| Ok("late".to_string())).with_delay(Duration::from_secs(5)),
        );
        let deadline = Instant::now() + Duration::from_millis(50);
        let err = analyzer(provider.clone())
            .analyze(&content("p"), &content("t"), Some(deadline))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::DeadlineExceeded { attempts: 1 }));
    }

    #[tokio::test]
    async fn test_deadline_stops_further_retries() {
        let provider = Arc::new(StubProvider::always(retryable_timeout));
        let deadline = Instant::now() + Duration::from_millis(100);
        let err = analyzer(provider.clone())
            .with_retry_policy(RetryPolicy {
                max_attempts: 10,
                backoff: Backoff::Fixed(Duration::from_secs(1)),
            })
            .analyze(&content("p"), &content("t"), Some(deadline))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::DeadlineExceeded { attempts: 1 }));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_unrepresentable_backoff_ends_at_deadline() {
        let provider = Arc::new(StubProvider::always(retryable_timeout));
        let deadline = Instant::now() + Duration::from_secs(60);
        let err = analyzer(provider.clone())
            .with_retry_policy(RetryPolicy {
                max_attempts: 3,
                backoff: Backoff::Fixed(Duration::from_secs(u64::MAX)),
            })
            .analyze(&content("p"), &content("t"), Some(deadline))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::DeadlineExceeded { attempts: 1 }));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_sentence_granularity() {
        let provider = Arc::new(StubProvider::always(|| {
            Ok("Fees differ. Refund window missing.".to_string())
        }));
        let findings = analyzer(provider)
            .with_granularity(FindingGranularity::Sentence)
            .analyze(&content("p"), &content("t"), None)
            .await
            .unwrap();
        assert_eq!(findings, vec!["Fees differ.", "Refund window missing."]);
    }
}
