//! Exponential backoff for outbound vendor calls.

use crate::{DocuqError, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry policy for remote calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first. 1 disables retrying.
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds.
    pub base_delay_ms: u64,
    /// Multiplier applied for each further retry.
    pub backoff_factor: f64,
    /// Upper bound on any single delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            backoff_factor: 2.0,
            max_delay_ms: 8_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Compute the delay after failed attempt `attempt` (1-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let delay_ms = self.base_delay_ms as f64 * self.backoff_factor.powi((attempt - 1) as i32);
        Duration::from_millis(delay_ms.min(self.max_delay_ms as f64) as u64)
    }

    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay for `attempt`, stretched to honor a server `retry-after` and still capped.
    fn delay_after(&self, attempt: u32, err: &DocuqError) -> Duration {
        let backoff = self.delay_for(attempt);
        let cap = Duration::from_millis(self.max_delay_ms);
        match err.retry_after() {
            Some(secs) => backoff.max(Duration::from_secs(secs)).min(cap),
            None => backoff,
        }
    }

    /// Run `op` until it succeeds, fails with a non-transient error, or attempts run out.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && self.should_retry(attempt) => {
                    let delay = self.delay_after(attempt, &e);
                    warn!(
                        target: "docuq::mistral",
                        attempt,
                        max = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "{} failed, retrying: {}",
                        operation,
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
