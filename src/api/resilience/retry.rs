//! Retry policy with per-attempt timeouts
//!
//! The policy is a plain data object so that call sites (and tests) can see
//! exactly how many attempts run, how long each may take, and how long the
//! pauses between them are. Fallback behavior lives with the caller; the
//! policy only decides when to give up.

use std::future::Future;
use std::time::Duration;

use log::{debug, warn};
use rand::Rng;

use crate::api::error::ApiError;

/// Marker for errors that are worth another attempt
pub trait RetryableError {
    fn is_retryable(&self) -> bool;
}

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub base_delay: Duration,
    /// Upper bound on any computed delay
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each failed attempt
    pub backoff_multiplier: f64,
    /// Randomize each delay by up to ±25% to avoid thundering herds
    pub jitter: bool,
    /// Per-attempt time budget; the last entry is reused for any further
    /// attempts. Empty means attempts are unbounded.
    pub attempt_timeouts: Vec<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
            attempt_timeouts: Vec::new(),
        }
    }
}

impl RetryConfig {
    /// Two attempts for destination-table schema lookups: 15s, then a short
    /// pause, then one more try with a 25s budget. Callers fall back to the
    /// static column list when both fail.
    pub fn schema_lookup() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(500),
            backoff_multiplier: 1.0,
            jitter: false,
            attempt_timeouts: vec![Duration::from_secs(15), Duration::from_secs(25)],
        }
    }

}

/// Executes operations under a [`RetryConfig`]
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Time budget for the 1-based `attempt`, if any
    pub fn attempt_timeout(&self, attempt: u32) -> Option<Duration> {
        if self.config.attempt_timeouts.is_empty() {
            return None;
        }
        let idx = (attempt as usize)
            .saturating_sub(1)
            .min(self.config.attempt_timeouts.len() - 1);
        Some(self.config.attempt_timeouts[idx])
    }

    /// Delay to sleep before the 1-based `attempt` (attempt 1 never waits)
    fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exponent = (attempt - 2) as i32;
        let raw = self.config.base_delay.as_millis() as f64
            * self.config.backoff_multiplier.powi(exponent);
        let capped = raw.min(self.config.max_delay.as_millis() as f64);
        let with_jitter = if self.config.jitter {
            let factor = rand::rng().random_range(0.75..=1.25);
            capped * factor
        } else {
            capped
        };
        Duration::from_millis(with_jitter as u64)
    }

    /// Run `op` until it succeeds, exhausts the attempt budget, or fails
    /// with a non-retryable error. `op` receives the 1-based attempt number.
    pub async fn execute<T, F, Fut>(&self, mut op: F) -> Result<T, ApiError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut last_error = None;

        for attempt in 1..=self.config.max_attempts.max(1) {
            let delay = self.delay_before(attempt);
            if !delay.is_zero() {
                debug!(
                    "retrying in {:?} (attempt {}/{})",
                    delay, attempt, self.config.max_attempts
                );
                tokio::time::sleep(delay).await;
            }

            let fut = op(attempt);
            let result = match self.attempt_timeout(attempt) {
                Some(limit) => match tokio::time::timeout(limit, fut).await {
                    Ok(result) => result,
                    Err(_) => Err(ApiError::Timeout(limit)),
                },
                None => fut.await,
            };

            match result {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.config.max_attempts => {
                    warn!(
                        "attempt {}/{} failed: {}",
                        attempt, self.config.max_attempts, err
                    );
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error.expect("retry loop ran at least one attempt"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_schema_lookup_config() {
        let config = RetryConfig::schema_lookup();
        assert_eq!(config.max_attempts, 2);
        assert_eq!(
            config.attempt_timeouts,
            vec![Duration::from_secs(15), Duration::from_secs(25)]
        );
    }

    #[test]
    fn test_attempt_timeout_escalates_then_reuses_last() {
        let policy = RetryPolicy::new(RetryConfig::schema_lookup());
        assert_eq!(policy.attempt_timeout(1), Some(Duration::from_secs(15)));
        assert_eq!(policy.attempt_timeout(2), Some(Duration::from_secs(25)));
        assert_eq!(policy.attempt_timeout(3), Some(Duration::from_secs(25)));
    }

    #[test]
    fn test_no_timeouts_means_unbounded() {
        let policy = RetryPolicy::new(RetryConfig {
            attempt_timeouts: Vec::new(),
            ..RetryConfig::default()
        });
        assert_eq!(policy.attempt_timeout(1), None);
    }

    #[test]
    fn test_delay_backoff_without_jitter() {
        let policy = RetryPolicy::new(RetryConfig {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(350),
            backoff_multiplier: 2.0,
            jitter: false,
            attempt_timeouts: Vec::new(),
        });
        assert_eq!(policy.delay_before(1), Duration::ZERO);
        assert_eq!(policy.delay_before(2), Duration::from_millis(100));
        assert_eq!(policy.delay_before(3), Duration::from_millis(200));
        // Capped by max_delay
        assert_eq!(policy.delay_before(4), Duration::from_millis(350));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_once_then_succeeds() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(RetryConfig::schema_lookup());

        let result = policy
            .execute(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 1 {
                        Err(ApiError::Server("temporarily unavailable".into()))
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exactly_one_retry_then_gives_up() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(RetryConfig::schema_lookup());

        let result: Result<(), _> = policy
            .execute(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ApiError::Server("still down".into())) }
            })
            .await;

        assert!(matches!(result, Err(ApiError::Server(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_stops_immediately() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(RetryConfig::schema_lookup());

        let result: Result<(), _> = policy
            .execute(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ApiError::NotFound) }
            })
            .await;

        assert!(matches!(result, Err(ApiError::NotFound)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_attempt_is_cut_off_by_budget() {
        let policy = RetryPolicy::new(RetryConfig {
            max_attempts: 1,
            jitter: false,
            attempt_timeouts: vec![Duration::from_secs(15)],
            ..RetryConfig::default()
        });

        let result: Result<(), _> = policy
            .execute(|_| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            })
            .await;

        match result {
            Err(ApiError::Timeout(limit)) => assert_eq!(limit, Duration::from_secs(15)),
            other => panic!("expected timeout, got {:?}", other.map(|_| ())),
        }
    }
}
