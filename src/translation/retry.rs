/*!
 * Bounded retry with fixed delays.
 *
 * Every attempt is preceded by a fixed self-throttle delay. Errors accepted by
 * the `is_retriable` predicate (rate limiting, by default) are retried after a
 * longer fixed delay until the retry budget is spent; anything else is
 * returned immediately.
 */

use std::future::Future;
use std::time::Duration;

use log::{debug, warn};

use crate::app_config::TranslationCommonConfig;
use crate::errors::{ProviderError, TranslationError};
use super::cancel::CancellationToken;

/// Retry policy for one remote call
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    pub max_retries: u32,
    /// Wait before every attempt
    pub throttle_delay: Duration,
    /// Extra wait before a retry
    pub retry_delay: Duration,
    is_retriable: fn(&ProviderError) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&TranslationCommonConfig::default())
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, throttle_delay: Duration, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            throttle_delay,
            retry_delay,
            is_retriable: ProviderError::is_rate_limit,
        }
    }

    pub fn from_config(config: &TranslationCommonConfig) -> Self {
        Self::new(
            config.retry_count,
            config.throttle_delay(),
            config.rate_limit_backoff(),
        )
    }

    /// Replace the predicate deciding which errors are worth another attempt
    pub fn with_retriable(mut self, is_retriable: fn(&ProviderError) -> bool) -> Self {
        self.is_retriable = is_retriable;
        self
    }

    /// Total attempts including the first one
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn is_retriable(&self, error: &ProviderError) -> bool {
        (self.is_retriable)(error)
    }

    /// Run `operation` under this policy
    ///
    /// The closure receives the 1-based attempt number. Cancellation is checked
    /// after every wait, never while the operation itself is running.
    pub async fn run<T, F, Fut>(&self, cancel: &CancellationToken, mut operation: F) -> Result<T, TranslationError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            if cancel.sleep(self.throttle_delay).await {
                return Err(TranslationError::Cancelled);
            }

            debug!("Attempt {}/{}", attempt, self.max_attempts());

            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if self.is_retriable(&e) => {
                    if attempt > self.max_retries {
                        return Err(TranslationError::RetriesExhausted {
                            attempts: attempt,
                            last_error: e,
                        });
                    }

                    warn!(
                        "{} (attempt {}/{}), retrying in {:?}",
                        e,
                        attempt,
                        self.max_attempts(),
                        self.retry_delay
                    );

                    if cancel.sleep(self.retry_delay).await {
                        return Err(TranslationError::Cancelled);
                    }
                }
                Err(e) => return Err(TranslationError::Provider(e)),
            }
        }
    }
}
