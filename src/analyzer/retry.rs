use crate::api::CompletionError;
use std::time::Duration;

/// Upstream statuses that may succeed on a later attempt.
pub const RETRYABLE_STATUSES: [u16; 4] = [500, 502, 503, 504];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Retryable { status: u16 },
    Terminal { status: Option<u16> },
}

/// Only a timeout that also carries a retryable upstream status is retried.
pub fn classify(error: &CompletionError) -> ErrorClass {
    let status = error.upstream_status();
    match status {
        Some(status) if error.timed_out() && RETRYABLE_STATUSES.contains(&status) => {
            ErrorClass::Retryable { status }
        }
        _ => ErrorClass::Terminal { status },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    None,
    Fixed(Duration),
    Exponential { base: Duration, max: Duration },
}

impl Backoff {
    /// Delay before retry number `retry` (1 for the first retry).
    pub fn delay(&self, retry: u32) -> Duration {
        match *self {
            Backoff::None => Duration::ZERO,
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { base, max } => {
                let factor = 2u32.saturating_pow(retry.saturating_sub(1));
                base.saturating_mul(factor).min(max)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::None,
        }
    }
}
