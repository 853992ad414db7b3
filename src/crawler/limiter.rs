//! Request pacing and retry
//!
//! Politeness is applied in two nested layers, each driven by its own
//! [`DelaySchedule`]:
//! - across threads: the traverser waits before expanding each sibling
//! - across pages: the assembler staggers the page requests of one thread
//!
//! Transient fetch failures are retried by [`retry`] according to a
//! [`RetryPolicy`].

use crate::config::CrawlerConfig;
use crate::crawler::CancelToken;
use crate::TrailError;
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

/// Maps the n-th request of a batch to the delay before it is sent
pub trait DelaySchedule: Send + Sync + Debug {
    fn delay_for(&self, index: u32) -> Duration;
}

/// Request `n` waits `n * step`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearBackoff {
    pub step: Duration,
}

impl DelaySchedule for LinearBackoff {
    fn delay_for(&self, index: u32) -> Duration {
        self.step.saturating_mul(index)
    }
}

/// Every request waits the same amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay {
    pub delay: Duration,
}

impl DelaySchedule for FixedDelay {
    fn delay_for(&self, _index: u32) -> Duration {
        self.delay
    }
}

/// No pacing at all
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoDelay;

impl DelaySchedule for NoDelay {
    fn delay_for(&self, _index: u32) -> Duration {
        Duration::ZERO
    }
}

/// Sleeps for the scheduled delay of request `index`
///
/// # Returns
///
/// * `Ok(())` - The delay elapsed
/// * `Err(TrailError::Cancelled)` - The token was cancelled first
pub async fn pace(
    schedule: &dyn DelaySchedule,
    index: u32,
    cancel: &CancelToken,
) -> Result<(), TrailError> {
    let delay = schedule.delay_for(index);
    if delay.is_zero() {
        return if cancel.is_cancelled() {
            Err(TrailError::Cancelled)
        } else {
            Ok(())
        };
    }

    tracing::trace!("Pacing request {} by {:?}", index, delay);
    cancel.run(tokio::time::sleep(delay)).await
}

/// How often and how patiently transient failures are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,

    /// Delay between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    /// Never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::ZERO,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            delay: config.retry_delay(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// Runs `op` until it succeeds, fails permanently, or retries run out
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Success | Return value |
/// | Transient error, retries left | Wait `policy.delay`, try again |
/// | Transient error, no retries left | Return the error |
/// | Permanent error | Return the error immediately |
/// | Cancelled | Return `Cancelled` |
pub async fn retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancelToken,
    what: &str,
    mut op: F,
) -> Result<T, TrailError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TrailError>>,
{
    let mut attempt = 0;
    loop {
        match cancel.run(op()).await? {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_retries => {
                attempt += 1;
                tracing::warn!(
                    "{} failed ({}), retry {}/{} in {:?}",
                    what,
                    e,
                    attempt,
                    policy.max_retries,
                    policy.delay
                );
                cancel.run(tokio::time::sleep(policy.delay)).await?;
            }
            Err(e) => return Err(e),
        }
    }
}
