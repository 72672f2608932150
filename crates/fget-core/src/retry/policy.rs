//! Retry policy: attempt ceiling, per-attempt deadline, delay, and observers.

use crate::config::{DownloadConfig, OnAttempt, OnError, ShouldStop};
use std::time::Duration;

/// Default per-attempt deadline (10 minutes).
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(600);

pub struct RetryPolicy<'a> {
    /// Maximum attempts including the first; 0 = unbounded (subject only to
    /// the stop predicate).
    pub max_attempts: u32,
    /// Wait between attempts; None retries immediately.
    pub delay: Option<Duration>,
    /// Deadline for one attempt. Every attempt gets a fresh full budget; the
    /// outer loop never decrements it.
    pub attempt_timeout: Duration,
    pub on_attempt: Option<&'a OnAttempt>,
    pub on_error: Option<&'a OnError>,
    pub should_stop: Option<&'a ShouldStop>,
}

impl Default for RetryPolicy<'_> {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            delay: None,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            on_attempt: None,
            on_error: None,
            should_stop: None,
        }
    }
}

impl<'a> RetryPolicy<'a> {
    pub fn from_config(config: &'a DownloadConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delay: config.delay_between_attempts,
            attempt_timeout: config.attempt_timeout,
            on_attempt: config.hooks.on_attempt.as_deref(),
            on_error: config.hooks.on_error.as_deref(),
            should_stop: config.hooks.should_stop.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 0);
        assert_eq!(policy.delay, None);
        assert_eq!(policy.attempt_timeout, Duration::from_secs(600));
        assert!(policy.on_attempt.is_none());
    }

    #[test]
    fn from_config_carries_hooks() {
        let config = DownloadConfig::new("https://example.com/x")
            .on_attempt(|_| {})
            .should_stop(|_| true);
        let policy = RetryPolicy::from_config(&config);
        assert!(policy.on_attempt.is_some());
        assert!(policy.on_error.is_none());
        assert!(policy.should_stop.is_some());
    }
}
