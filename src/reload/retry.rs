//! Fetch-with-retry.
//!
//! Rides out the window where the dev server is restarting or recompiling.
//! The budget is bounded: a server that stays down makes the cycle fail and
//! the client falls back to a full reload.

use std::time::Duration;

use url::Url;

use super::error::ReloadError;
use super::fetch::Fetch;

/// Attempt budget for one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_ATTEMPTS: u32 = 50;
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);

    /// At least one attempt is always made.
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ATTEMPTS, Self::DEFAULT_DELAY)
    }
}

/// Fetch `url`, retrying retryable failures with a fixed delay in between.
///
/// A non-retryable failure ends the loop at once.
pub async fn fetch_with_retry<F: Fetch>(
    fetcher: &F,
    url: &Url,
    policy: &RetryPolicy,
) -> Result<String, ReloadError> {
    let mut attempt = 1;
    loop {
        match fetcher.fetch(url).await {
            Ok(html) => {
                if attempt > 1 {
                    crate::debug!("fetch"; "{} ready after {} attempts", url, attempt);
                }
                return Ok(html);
            }
            Err(err) if !err.is_retryable() => return Err(err.into()),
            Err(last) if attempt >= policy.attempts => {
                return Err(ReloadError::RetriesExhausted {
                    attempts: attempt,
                    last,
                });
            }
            Err(err) => {
                crate::debug!("fetch"; "attempt {}/{} failed: {}", attempt, policy.attempts, err);
            }
        }
        attempt += 1;
        tokio::time::sleep(policy.delay).await;
    }
}
