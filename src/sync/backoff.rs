use embassy_time::Duration;

/// Default delay after the first failed attempt
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(2);

/// Default upper bound of the retry delay
pub const DEFAULT_BACKOFF_MAX: Duration = Duration::from_secs(8);

/// Doublings past which the delay is always capped
const MAX_DOUBLINGS: u8 = 16;

/// Capped exponential delay between retries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max: Duration,
}

impl Backoff {
    pub const fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    pub const fn base(&self) -> Duration {
        self.base
    }

    pub const fn max(&self) -> Duration {
        self.max
    }

    /// Delay after the given failed attempt, counting from one
    pub fn delay(&self, attempt: u8) -> Duration {
        let doublings = attempt.saturating_sub(1).min(MAX_DOUBLINGS);
        let millis = self
            .base
            .as_millis()
            .saturating_mul(1 << doublings)
            .min(self.max.as_millis());
        Duration::from_millis(millis)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_MAX)
    }
}
