//! Bounded reconnect policy.

use std::time::Duration;

/// Fixed-delay retry budget.
///
/// Counts consecutive failed connection attempts. Once the count reaches
/// `max_attempts` no further retry is offered until [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    delay: Duration,
    max_attempts: u32,
    attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts,
            attempts: 0,
        }
    }

    /// Count one failed attempt.
    pub fn record_failure(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }

    /// Delay before the next retry, or `None` once the budget is spent.
    pub fn next_delay(&self) -> Option<Duration> {
        (!self.is_exhausted()).then_some(self.delay)
    }

    /// Forget past failures.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Consecutive failures so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}
