//! Retry policies for contract reads
//!
//! Decides which failures get another attempt and how long to wait.

use crate::backoff::BackoffConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use xocdash_error::DashboardError;

/// Trait for classifying errors as retryable or not
pub trait RetryClassifier<E> {
    /// Check if the error is retryable
    fn is_retryable(&self, error: &E) -> bool;

    /// Get suggested delay override for this error (if any)
    fn suggested_delay(&self, error: &E) -> Option<Duration>;
}

/// Classifier for [`DashboardError`]
#[derive(Debug, Clone, Default)]
pub struct DashboardRetryClassifier;

impl RetryClassifier<DashboardError> for DashboardRetryClassifier {
    fn is_retryable(&self, error: &DashboardError) -> bool {
        error.is_retryable()
    }

    fn suggested_delay(&self, error: &DashboardError) -> Option<Duration> {
        error.retry_after().map(Duration::from_secs)
    }
}

/// JSON-RPC error code classification
#[derive(Debug, Clone, Default)]
pub struct RpcRetryClassifier;

impl RpcRetryClassifier {
    /// `eth_call` revert, as returned by geth-compatible nodes
    pub const EXECUTION_REVERTED: i64 = 3;
    /// Request limit exceeded
    pub const LIMIT_EXCEEDED: i64 = -32005;

    /// Check if RPC error code is retryable
    pub fn is_code_retryable(code: i64) -> bool {
        matches!(
            code,
            -32099..=-32000 | // Server errors
            -32603            // Internal error
        )
    }

    /// Check if the node reported a revert
    pub fn is_revert(code: i64, message: &str) -> bool {
        code == Self::EXECUTION_REVERTED || message.to_lowercase().contains("revert")
    }

    /// Check if the node reported rate limiting
    pub fn is_rate_limited(code: i64, message: &str) -> bool {
        let msg = message.to_lowercase();
        code == Self::LIMIT_EXCEEDED
            || code == 429
            || msg.contains("rate limit")
            || msg.contains("too many requests")
    }
}

/// Per-read retry policy, as loaded from configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum total attempts, including the first
    pub max_attempts: u32,
    /// Initial backoff delay in milliseconds
    pub initial_delay_ms: u64,
    /// Maximum backoff delay in milliseconds
    pub max_delay_ms: u64,
    /// Jitter factor (0.0 to 1.0)
    pub jitter: f64,
    /// Per-attempt timeout in milliseconds
    pub attempt_timeout_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 250,
            max_delay_ms: 5_000,
            jitter: 0.2,
            attempt_timeout_ms: 20_000,
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum attempts
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set initial delay
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Set per-attempt timeout
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Single attempt, no backoff
    pub fn no_retry() -> Self {
        Self::default().with_max_attempts(1)
    }

    /// Per-attempt timeout as a [`Duration`]
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    /// Delay schedule for this policy
    pub fn backoff(&self) -> BackoffConfig {
        BackoffConfig {
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            jitter: self.jitter.clamp(0.0, 1.0),
            max_attempts: self.max_attempts.max(1),
        }
    }
}
