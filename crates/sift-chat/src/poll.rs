//! Generic poll-until-terminal primitive

use std::future::Future;
use std::time::Duration;

/// Retry policy for polling an asynchronous reply
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Maximum number of status fetches before giving up
    pub max_attempts: u32,
    /// Fixed wait between attempts
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_millis(1000),
        }
    }
}

/// Result of a poll loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// A fetch returned a value the terminal predicate accepted
    Resolved(T),
    /// Every attempt was consumed without reaching a terminal value
    Exhausted,
}

/// Poll `fetch` until `is_terminal` accepts its value or the policy's
/// attempt budget is exhausted.
///
/// A fetch error is a soft failure: it consumes one attempt and the loop
/// retries after the policy interval, exactly like a non-terminal value.
pub async fn poll_until_terminal<T, F, Fut>(
    policy: &PollPolicy,
    is_terminal: impl Fn(&T) -> bool,
    mut fetch: F,
) -> PollOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = sift_api::Result<T>>,
{
    for attempt in 1..=policy.max_attempts {
        match fetch().await {
            Ok(value) if is_terminal(&value) => return PollOutcome::Resolved(value),
            Ok(_) => {
                tracing::debug!(attempt, max = policy.max_attempts, "reply not ready");
            }
            Err(e) => {
                tracing::debug!(attempt, max = policy.max_attempts, error = %e, "status fetch failed, retrying");
            }
        }
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }
    PollOutcome::Exhausted
}
