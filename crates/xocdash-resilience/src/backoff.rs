//! Exponential backoff with jitter
//!
//! Retry delays double per attempt, capped, with random jitter so that a
//! burst of failed reads from one refresh does not hit the node again in
//! lockstep. A provider's own `retry_after` hint wins when it is longer.

use crate::retry_policy::RetryClassifier;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

const MULTIPLIER: f64 = 2.0;

/// Delay schedule for one read
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffConfig {
    /// Delay before the second attempt
    pub initial_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
    /// Jitter factor in `0.0..=1.0`
    pub jitter: f64,
    /// Total attempts, including the first
    pub max_attempts: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            jitter: 0.2,
            max_attempts: 3,
        }
    }
}

/// Iterator over the delays between attempts.
///
/// Yields `max_attempts - 1` delays: one before each retry.
#[derive(Debug)]
pub struct ExponentialBackoff {
    config: BackoffConfig,
    retries: u32,
    next_delay: Duration,
}

impl ExponentialBackoff {
    /// Starts a schedule
    pub fn new(config: BackoffConfig) -> Self {
        Self {
            next_delay: config.initial_delay,
            config,
            retries: 0,
        }
    }

    fn jittered(&self, base: Duration) -> Duration {
        let spread = base.as_secs_f64() * self.config.jitter.clamp(0.0, 1.0);
        if spread <= 0.0 {
            return base;
        }
        let offset = rand::thread_rng().gen_range(-spread..spread);
        Duration::from_secs_f64((base.as_secs_f64() + offset).max(0.0))
    }
}

impl Iterator for ExponentialBackoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.retries + 1 >= self.config.max_attempts.max(1) {
            return None;
        }
        self.retries += 1;

        let delay = self.jittered(self.next_delay).min(self.config.max_delay);
        let grown = self.next_delay.as_secs_f64() * MULTIPLIER;
        self.next_delay = Duration::from_secs_f64(grown.min(self.config.max_delay.as_secs_f64()));
        Some(delay)
    }
}

/// Failure after the schedule ran out or a non-retryable error was hit
#[derive(Debug)]
pub struct BackoffError<E> {
    /// Attempts made
    pub attempts: u32,
    /// The error from the final attempt
    pub last_error: E,
}

impl<E> BackoffError<E> {
    /// The error from the final attempt
    pub fn into_last_error(self) -> E {
        self.last_error
    }
}

impl<E: std::fmt::Display> std::fmt::Display for BackoffError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gave up after {} attempt(s): {}", self.attempts, self.last_error)
    }
}

impl<E: std::error::Error + 'static> std::error::Error for BackoffError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.last_error)
    }
}

/// Runs `f` until it succeeds, returns an error `classifier` rejects, or
/// the schedule in `config` runs out.
pub async fn with_backoff_when<F, Fut, T, E, C>(
    config: BackoffConfig,
    classifier: &C,
    mut f: F,
) -> Result<T, BackoffError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Debug,
    C: RetryClassifier<E>,
{
    let mut schedule = ExponentialBackoff::new(config);
    let mut attempts = 0;

    loop {
        attempts += 1;
        let err = match f().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let retryable = classifier.is_retryable(&err);
        tracing::debug!(attempt = attempts, retryable, error = ?err, "read attempt failed");

        let delay = match schedule.next() {
            Some(delay) if retryable => delay,
            _ => {
                return Err(BackoffError {
                    attempts,
                    last_error: err,
                })
            }
        };
        let delay = classifier
            .suggested_delay(&err)
            .map_or(delay, |hint| hint.max(delay));

        tracing::trace!(?delay, "waiting before retry");
        tokio::time::sleep(delay).await;
    }
}
