// Bounded retry with exponential backoff.
// Transient failures are retried; anything else is returned immediately.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{MinerError, Result};

/// Retry budget for a single logical request.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub base_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A policy that never sleeps (tests).
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay after the given failed attempt (1-based): base * 2^(attempt-1), capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exp)
            .min(self.max_delay)
    }
}

/// Run `op` until it succeeds, fails fatally, or the attempt budget runs out.
///
/// `op` receives the 1-based attempt number. An exhausted budget is reported as
/// `FatalFetch` carrying the last transient cause.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, what: &str, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {:?}",
                    what, attempt, max_attempts, e, delay
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            Err(e) if e.is_transient() => {
                return Err(MinerError::FatalFetch(format!(
                    "{} gave up after {} attempts: {}",
                    what, attempt, e
                )));
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for(4), Duration::from_millis(500));
        assert_eq!(policy.delay_for(40), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_recovers_after_transient() {
        let calls = Cell::new(0);
        let result = with_retry(&RetryPolicy::immediate(3), "list commits", |_| {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 3 {
                    Err(MinerError::TransientFetch("connection reset".into()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_budget_exhausted_is_fatal() {
        let calls = Cell::new(0);
        let result: Result<()> = with_retry(&RetryPolicy::immediate(2), "commit detail", |_| {
            calls.set(calls.get() + 1);
            async { Err(MinerError::TransientFetch("timeout".into())) }
        })
        .await;

        assert!(matches!(result, Err(MinerError::FatalFetch(_))));
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_fatal_not_retried() {
        let calls = Cell::new(0);
        let result: Result<()> = with_retry(&RetryPolicy::immediate(5), "languages", |_| {
            calls.set(calls.get() + 1);
            async { Err(MinerError::Unauthorized) }
        })
        .await;

        assert!(matches!(result, Err(MinerError::Unauthorized)));
        assert_eq!(calls.get(), 1);
    }
}
