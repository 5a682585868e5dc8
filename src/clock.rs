//! Wall-clock and monotonic time sources
//!
//! Timezone handling is a fixed offset; there is no date or DST logic.

use embassy_time::Instant;

use crate::encoder::TimeValue;

/// Seconds since the Unix epoch, UTC
pub type Timestamp = u64;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

/// Device wall clock
///
/// Before a successful sync the reading is whatever the device keeps
/// locally and may be wrong.
pub trait ClockSource {
    fn now(&self) -> Timestamp;

    /// Replace the clock reading with a synced timestamp
    fn set(&mut self, timestamp: Timestamp);
}

/// Monotonic timer used to pace the device loop
pub trait Monotonic {
    fn now(&self) -> Instant;

    /// Block until `deadline`, returns right away when it has passed
    fn sleep_until(&mut self, deadline: Instant);
}

/// Time of day on the local clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl LocalTime {
    pub const fn time_value(self) -> TimeValue {
        TimeValue::from_clock(self.hour, self.minute)
    }
}

/// Convert a UTC timestamp to local time of day
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn local_time(utc: Timestamp, offset_minutes: i32) -> LocalTime {
    let utc = i64::try_from(utc).unwrap_or(i64::MAX);
    let local = utc.saturating_add(i64::from(offset_minutes) * SECONDS_PER_MINUTE);
    let seconds = local.rem_euclid(SECONDS_PER_DAY);

    LocalTime {
        hour: (seconds / SECONDS_PER_HOUR) as u8,
        minute: ((seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE) as u8,
        second: (seconds % SECONDS_PER_MINUTE) as u8,
    }
}
