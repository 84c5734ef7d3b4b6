//! Generic retry helper with exponential backoff and jitter.
//!
//! Persistence calls in the campaign pipeline go through [`retry`] so a
//! transient database blip does not abort a send half-way through. The
//! policy is explicit rather than baked in: callers pass a
//! [`RetryPolicy`] and a predicate deciding which errors are worth
//! retrying, so a permanent error (say, a constraint violation) fails
//! immediately instead of burning through the full backoff window.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Tunable parameters for the exponential-backoff strategy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each failure.
    pub base_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Upper bound on the random jitter added to each delay.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_jitter: Duration::from_secs(1),
        }
    }
}

/// Calculate the delay after a failed attempt (1-based).
///
/// The delay is `base * 2^(attempt-1) + jitter`, clamped to
/// [`RetryPolicy::max_delay`].
pub fn backoff_delay(policy: &RetryPolicy, attempt: u32, jitter: Duration) -> Duration {
    // Shift capped so a pathological attempt count cannot overflow.
    let factor = 1u64 << attempt.saturating_sub(1).min(20);
    let delay_ms = (policy.base_delay.as_millis() as u64)
        .saturating_mul(factor)
        .saturating_add(jitter.as_millis() as u64);
    Duration::from_millis(delay_ms).min(policy.max_delay)
}

/// Draw a random jitter in `[0, policy.max_jitter]`.
fn random_jitter(policy: &RetryPolicy) -> Duration {
    let max_ms = policy.max_jitter.as_millis() as u64;
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..=max_ms))
}

/// Invoke `op`, retrying on failure with exponential backoff.
///
/// Errors rejected by `is_retryable` are returned immediately. After
/// `max_attempts` failures the last error is propagated unchanged.
/// Each failed attempt is logged.
pub async fn retry<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    is_retryable: P,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt >= policy.max_attempts || !is_retryable(&e) {
                    return Err(e);
                }

                let delay = backoff_delay(policy, attempt, random_jitter(policy));
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Operation failed, retrying",
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
