//! Per-attempt timeouts

use std::future::Future;
use std::time::Duration;
use xocdash_error::DashboardError;

/// A read attempt that did not finish in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutError {
    /// Read that was cut off
    pub operation: String,
    /// Limit that was hit
    pub limit: Duration,
}

impl std::fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} exceeded {:?}", self.operation, self.limit)
    }
}

impl std::error::Error for TimeoutError {}

impl From<TimeoutError> for DashboardError {
    fn from(err: TimeoutError) -> Self {
        // NetworkTimeout carries whole seconds; sub-second limits round up.
        DashboardError::NetworkTimeout {
            seconds: err.limit.as_secs().max(1),
        }
    }
}

/// Awaits `future`, giving up after `limit`
pub async fn with_timeout<T>(
    limit: Duration,
    operation: impl Into<String>,
    future: impl Future<Output = T>,
) -> Result<T, TimeoutError> {
    let operation = operation.into();
    tokio::time::timeout(limit, future)
        .await
        .map_err(|_| TimeoutError { operation, limit })
}
