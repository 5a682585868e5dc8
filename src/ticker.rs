//! Tick pacing for the device loop.
//!
//! Provides portable tick pacing without async/await or platform-specific timers.
//! The caller is responsible for sleeping/waiting between ticks.

use embassy_time::{Duration, Instant};

/// Default steady-state tick interval.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Default boot animation frame interval.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(150);

/// Result of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickResult {
    /// The deadline for the next tick.
    pub next_deadline: Instant,
    /// How long to wait until the next tick (may be zero if behind schedule).
    pub sleep_duration: Duration,
}

/// Tracks tick deadlines with drift correction.
///
/// The interval may change between ticks, the boot phase runs at the
/// animation frame rate and the steady state at the tick rate.
#[derive(Debug, Clone, Default)]
pub struct Ticker {
    next_tick: Option<Instant>,
}

impl Ticker {
    pub const fn new() -> Self {
        Self { next_tick: None }
    }

    /// Schedule the tick after the one running at `now`.
    ///
    /// If we fell behind by more than two intervals the backlog is dropped
    /// instead of catching up.
    pub fn advance(&mut self, now: Instant, interval: Duration) -> TickResult {
        let max_drift = interval * 2;
        let scheduled = match self.next_tick {
            Some(next) if now <= next + max_drift => next,
            _ => now,
        };

        let next_deadline = scheduled + interval;
        self.next_tick = Some(next_deadline);

        TickResult {
            next_deadline,
            sleep_duration: next_deadline.saturating_duration_since(now),
        }
    }

    /// Forget the schedule, the next tick starts a fresh one.
    pub fn reset(&mut self) {
        self.next_tick = None;
    }
}
