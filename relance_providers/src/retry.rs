use std::fmt::Display;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Backoff schedule for transport-level retries.
///
/// One initial attempt plus one retry per entry in `delays`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delays: Vec<Duration>,
}

impl RetryPolicy {
    /// Single attempt, no retries.
    #[must_use]
    pub const fn none() -> Self {
        Self { delays: Vec::new() }
    }

    /// `retries` delays doubling from `base`: base, 2*base, 4*base, ...
    #[must_use]
    pub fn exponential(base: Duration, retries: u32) -> Self {
        let delays = (0..retries)
            .map(|i| base.saturating_mul(2_u32.saturating_pow(i)))
            .collect();
        Self { delays }
    }

    #[must_use]
    pub fn max_attempts(&self) -> usize {
        self.delays.len() + 1
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::exponential(Duration::from_secs(1), 3)
    }
}

/// Retry an async operation while `should_retry` accepts the error.
///
/// Returns the first success, the first non-retryable error, or the error of
/// the final attempt.
pub async fn retry_with_backoff_when<F, Fut, T, E, P>(
    mut operation: F,
    policy: &RetryPolicy,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Display,
    P: Fn(&E) -> bool,
{
    let total = policy.max_attempts();
    let mut delays = policy.delays.iter();
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !should_retry(&e) {
                    return Err(e);
                }
                let Some(delay) = delays.next() else {
                    return Err(e);
                };
                warn!(
                    "Request failed (attempt {}/{}): {e}. Retrying after {:?}...",
                    attempt, total, delay
                );
                sleep(*delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_policy(retries: u32) -> RetryPolicy {
        RetryPolicy::exponential(Duration::from_millis(1), retries)
    }

    #[test]
    fn exponential_schedule_doubles() {
        let policy = RetryPolicy::exponential(Duration::from_secs(1), 3);
        assert_eq!(
            policy.delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(RetryPolicy::none().max_attempts(), 1);
    }

    #[tokio::test]
    async fn retry_succeeds_on_first_attempt() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let result = retry_with_backoff_when(
            || {
                let attempts = attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), String>(())
                }
            },
            &fast_policy(2),
            |_| true,
        )
        .await;
        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retry_succeeds_after_failures() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let result: Result<(), String> = retry_with_backoff_when(
            || {
                let attempts = attempts.clone();
                async move {
                    let count = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    if count < 3 {
                        Err(String::from("fail"))
                    } else {
                        Ok(())
                    }
                }
            },
            &fast_policy(3),
            |_| true,
        )
        .await;
        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_fails_after_all_attempts() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let result: Result<(), String> = retry_with_backoff_when(
            || {
                let attempts = attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(String::from("fail"))
                }
            },
            &fast_policy(2),
            |_| true,
        )
        .await;
        assert_eq!(result, Err("fail".to_string()));
        assert_eq!(attempts.load(Ordering::SeqCst), 3); // initial + 2 retries
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let result: Result<(), String> = retry_with_backoff_when(
            || {
                let attempts = attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(String::from("bad request"))
                }
            },
            &fast_policy(5),
            |e| !e.contains("bad request"),
        )
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
