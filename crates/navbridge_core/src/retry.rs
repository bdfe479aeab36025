use std::time::Duration;

pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(150);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Bounded fixed-interval retry for late engine initialization.
///
/// Attempts are numbered from 1. After `max_attempts` failed attempts the caller
/// gives up (log only).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_RETRY_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    pub const fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Delay before the attempt following failed attempt `attempt`, if any remain.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        (attempt < self.max_attempts).then_some(self.interval)
    }
}
