// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// How often the session re-tries its one-time fetch before degrading to an
/// empty record set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    /// Sleep after failed attempt `n` is `n * base_backoff_ms`.
    pub base_backoff_ms: u64,
}

impl RetryPolicy {
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_backoff_ms: 0,
        }
    }

    /// At least one attempt is always made.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.max_attempts.max(1)
    }

    #[must_use]
    pub fn delay_after(&self, failed_attempt: usize) -> Duration {
        let factor = u64::try_from(failed_attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_backoff_ms.saturating_mul(factor))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_backoff_ms: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_scales_with_failed_attempts() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_millis(100));
        assert_eq!(policy.delay_after(3), Duration::from_millis(300));
    }

    #[test]
    fn zero_attempts_still_fetches_once() {
        let policy = RetryPolicy {
            max_attempts: 0,
            base_backoff_ms: 5,
        };
        assert_eq!(policy.attempts(), 1);
        assert_eq!(RetryPolicy::no_retry().attempts(), 1);
    }
}
