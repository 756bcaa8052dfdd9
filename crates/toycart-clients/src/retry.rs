//! Bounded retry with backoff for transient downstream failures.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;

/// Classifies an error as worth retrying.
pub trait IsTransient {
    /// Returns `true` if another attempt may succeed.
    fn is_transient(&self) -> bool;
}

/// Retry budget and backoff shape.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first. Treated as at least one.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Factor applied to the delay after each retry.
    pub multiplier: u32,
    /// Fraction of each delay added as random jitter, in `0.0..=1.0`.
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(1),
            multiplier: 2,
            jitter: 0.1,
        }
    }
}

impl RetryConfig {
    /// Default backoff with the given attempt budget.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    fn jittered(&self, delay: Duration) -> Duration {
        let fraction = self.jitter.clamp(0.0, 1.0);
        if fraction <= 0.0 {
            return delay;
        }
        let extra = rand::rng().random_range(0.0..=fraction);
        delay + delay.mul_f64(extra)
    }
}

/// Result of a retried operation.
#[derive(Debug)]
pub enum RetryResult<T, E> {
    /// An attempt succeeded.
    Success(T),
    /// Every attempt failed with a transient error.
    Exhausted(E),
    /// An attempt failed with an error that is not worth retrying.
    PermanentFailure(E),
}

impl<T, E> RetryResult<T, E> {
    /// Collapses the result into a plain `Result`.
    ///
    /// # Errors
    ///
    /// Returns the last error on exhaustion or permanent failure.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Exhausted(err) | Self::PermanentFailure(err) => Err(err),
        }
    }
}

/// Runs `operation` until it succeeds, fails permanently, or the attempt
/// budget runs out. `operation` receives the 1-based attempt number.
pub async fn retry_on_transient<F, Fut, T, E>(
    config: &RetryConfig,
    mut operation: F,
) -> RetryResult<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display + IsTransient,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempt, "operation succeeded after retry");
                }
                return RetryResult::Success(value);
            }
            Err(error) => {
                if !error.is_transient() {
                    tracing::warn!(attempt, error = %error, "permanent failure, not retrying");
                    return RetryResult::PermanentFailure(error);
                }

                if attempt >= max_attempts {
                    tracing::warn!(attempt, error = %error, "retry budget exhausted");
                    return RetryResult::Exhausted(error);
                }

                let wait = config.jittered(delay);
                tracing::debug!(
                    attempt,
                    error = %error,
                    delay_ms = wait.as_millis(),
                    "transient failure, retrying after delay"
                );
                sleep(wait).await;

                delay = delay.saturating_mul(config.multiplier).min(config.max_delay);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[derive(Debug)]
    struct Fault {
        transient: bool,
    }

    impl std::fmt::Display for Fault {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "fault(transient={})", self.transient)
        }
    }

    impl IsTransient for Fault {
        fn is_transient(&self) -> bool {
            self.transient
        }
    }

    fn fast(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            multiplier: 2,
            jitter: 0.0,
        }
    }

    #[tokio::test]
    async fn test_success_on_first_attempt_does_not_retry() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result = retry_on_transient(&fast(3), |_| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Fault>(7)
        })
        .await;

        assert!(matches!(result, RetryResult::Success(7)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_failures_consume_the_budget() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result: RetryResult<(), Fault> = retry_on_transient(&fast(3), |_| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Fault { transient: true })
        })
        .await;

        assert!(matches!(result, RetryResult::Exhausted(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_stops_immediately() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result: RetryResult<(), Fault> = retry_on_transient(&fast(5), |_| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Fault { transient: false })
        })
        .await;

        assert!(matches!(result, RetryResult::PermanentFailure(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let result = retry_on_transient(&fast(3), |attempt| async move {
            if attempt < 2 {
                Err(Fault { transient: true })
            } else {
                Ok(attempt)
            }
        })
        .await;

        assert_eq!(result.into_result().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_zero_budget_still_makes_one_attempt() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let _ = retry_on_transient(&fast(0), |_| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(Fault { transient: true })
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
