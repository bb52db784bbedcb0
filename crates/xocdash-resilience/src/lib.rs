//! # xocdash Resilience
//!
//! Bounded retry for contract reads.
//!
//! - **Exponential Backoff**: retry failed reads with increasing, jittered delays
//! - **Retry Policies**: classify [`DashboardError`]s and JSON-RPC error codes
//! - **Timeouts**: cap each attempt
//!
//! [`retry_read`] combines the three and is what the read operations use.
//!
//! ```rust
//! use xocdash_resilience::{retry_read, RetryPolicy};
//! use xocdash_error::DashboardError;
//! use std::time::Duration;
//!
//! # async fn example() {
//! let policy = RetryPolicy::new()
//!     .with_max_attempts(3)
//!     .with_initial_delay(Duration::from_millis(10));
//!
//! let value = retry_read(&policy, "balanceOf", || async {
//!     Ok::<_, DashboardError>(42u64)
//! })
//! .await;
//! assert_eq!(value.unwrap(), 42);
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backoff;
pub mod retry_policy;
pub mod timeout;

pub use backoff::{with_backoff_when, BackoffConfig, BackoffError, ExponentialBackoff};
pub use retry_policy::{DashboardRetryClassifier, RetryClassifier, RetryPolicy, RpcRetryClassifier};
pub use timeout::{with_timeout, TimeoutError};

use std::future::Future;
use xocdash_error::{DashboardError, Result};

/// Runs one read under `policy`: each attempt is capped by the attempt
/// timeout, retryable failures back off and try again, anything else is
/// returned at once.
pub async fn retry_read<F, Fut, T>(policy: &RetryPolicy, operation: &str, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempt_timeout = policy.attempt_timeout();

    with_backoff_when(policy.backoff(), &DashboardRetryClassifier, || {
        let attempt = f();
        async move {
            match with_timeout(attempt_timeout, operation, attempt).await {
                Ok(result) => result,
                Err(elapsed) => Err(DashboardError::from(elapsed)),
            }
        }
    })
    .await
    .map_err(BackoffError::into_last_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn fast_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new()
            .with_max_attempts(attempts)
            .with_initial_delay(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_retry_read_recovers_from_network_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let value = retry_read(&fast_policy(3), "balanceOf", || {
            let c = counter.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(DashboardError::network("balanceOf", "connection reset"))
                } else {
                    Ok(5u32)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 5);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_read_does_not_retry_revert() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let err = retry_read(&fast_policy(5), "computeUserHealthRatio", || {
            let c = counter.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(DashboardError::revert("computeUserHealthRatio", "zero debt"))
            }
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(err, DashboardError::ContractRevert { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_read_times_out_each_attempt() {
        let policy = fast_policy(2).with_attempt_timeout(Duration::from_millis(100));

        let err = retry_read(&policy, "liqParam", || async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, DashboardError>(())
        })
        .await
        .unwrap_err();

        assert!(matches!(err, DashboardError::NetworkTimeout { .. }));
    }
}
