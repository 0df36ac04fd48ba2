use std::time::Duration;

use log::warn;
use rand::Rng;

use crate::config::RetryPolicy;
use crate::error::ApiError;

/// Capped exponential backoff with up to 25% random jitter.
pub struct Backoff<'a> {
    policy: &'a RetryPolicy,
    attempt: u32,
}

impl<'a> Backoff<'a> {
    pub fn new(policy: &'a RetryPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    /// Delay before the next attempt.
    pub fn next_delay(&mut self) -> Duration {
        self.attempt += 1;
        let factor = 2u32.saturating_pow((self.attempt - 1).min(16));
        let delay = self.policy.base_delay.saturating_mul(factor).min(self.policy.max_delay);
        if delay.is_zero() {
            return delay;
        }
        let jitter = rand::thread_rng().gen_range(0..=delay.as_millis() as u64 / 4);
        delay + Duration::from_millis(jitter)
    }

    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempt + 1 >= self.policy.max_attempts
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

/// Run `op` until it succeeds, fails with a non-transient error, or the policy
/// runs out of attempts. Returns the last error and the number of attempts made.
pub fn with_retry<T>(
    policy: &RetryPolicy,
    what: &str,
    op: impl FnMut() -> Result<T, ApiError>,
) -> Result<T, (ApiError, u32)> {
    with_retry_when(policy, what, ApiError::is_transient, op)
}

/// Like [`with_retry`], but only errors matching `retryable` are retried.
pub fn with_retry_when<T>(
    policy: &RetryPolicy,
    what: &str,
    retryable: impl Fn(&ApiError) -> bool,
    mut op: impl FnMut() -> Result<T, ApiError>,
) -> Result<T, (ApiError, u32)> {
    let mut backoff = Backoff::new(policy);
    loop {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if retryable(&e) && !backoff.is_exhausted() => {
                let delay = backoff.next_delay();
                warn!(
                    "{what} failed (attempt {}/{}): {e}; retrying in {delay:?}",
                    backoff.attempts(),
                    policy.max_attempts
                );
                std::thread::sleep(delay);
            }
            Err(e) => return Err((e, backoff.attempts() + 1)),
        }
    }
}
