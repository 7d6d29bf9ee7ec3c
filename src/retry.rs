//! Bounded retry with a fixed backoff.
//!
//! Used for the single bulk catalog fetch. Per-title calls soft-fail instead.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Default number of attempts before giving up.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Default wait between attempts.
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (at least 1).
    pub attempts: u32,
    /// Fixed wait between attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ATTEMPTS, DEFAULT_BACKOFF)
    }
}

/// Run `op` until it succeeds or the attempt budget is spent.
///
/// Returns the last error once every attempt has failed.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => {
                warn!("{} failed (attempt {}/{}): {}", label, attempt, attempts, e);
                return Err(e);
            }
            Err(e) => {
                warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {:?}",
                    label, attempt, attempts, e, policy.backoff
                );
                tokio::time::sleep(policy.backoff).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::ZERO)
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let mut calls = 0;
        let result: Result<u32, String> = retry(&instant_policy(3), "fetch", || {
            calls += 1;
            let n = calls;
            async move {
                if n < 3 {
                    Err(format!("failure {}", n))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let mut calls = 0;
        let result: Result<(), String> = retry(&instant_policy(3), "fetch", || {
            calls += 1;
            let n = calls;
            async move { Err(format!("failure {}", n)) }
        })
        .await;

        assert_eq!(result, Err("failure 3".to_string()));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn first_success_makes_one_call() {
        let mut calls = 0;
        let result: Result<&str, String> = retry(&instant_policy(5), "fetch", || {
            calls += 1;
            async { Ok("ok") }
        })
        .await;

        assert_eq!(result, Ok("ok"));
        assert_eq!(calls, 1);
    }

    #[test]
    fn zero_attempts_is_clamped_to_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).attempts, 1);
    }

    #[test]
    fn defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.backoff, Duration::from_millis(2000));
    }
}
