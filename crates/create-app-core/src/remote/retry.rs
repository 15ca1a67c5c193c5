//! Bounded retry with exponential backoff

use colored::Colorize;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// How often and how patiently to retry a fallible operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after every failure
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Same attempt budget without waiting between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
        }
    }
}

/// Run `operation` until it succeeds or the policy's attempts are used up
///
/// Returns the last error when every attempt failed.
pub async fn retry<T, E, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut delay = policy.initial_delay;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => return Err(e),
            Err(e) => {
                eprintln!(
                    "{}",
                    format!(
                        "Attempt {} of {} failed: {}. Retrying...",
                        attempt, max_attempts, e
                    )
                    .dimmed()
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                delay *= 2;
                attempt += 1;
            }
        }
    }
}
