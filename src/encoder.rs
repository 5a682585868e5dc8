//! Time to segment-role encoding
//!
//! The five segments carry the values `1, 1, 2, 3, 5`. Segments that count
//! toward the hour are lit with the hour color, segments that count toward
//! the minute (in 5-minute buckets) with the minute color, and segments
//! counting toward both with a third color.

use crate::error::EncodingError;
use crate::logging::warn;

/// Number of Fibonacci segments
pub const SEGMENT_COUNT: usize = 5;

/// Values of the logical segments, in encoder index order
pub const SEGMENT_VALUES: [u8; SEGMENT_COUNT] = [1, 1, 2, 3, 5];

/// Minutes represented by one minute bucket
pub const MINUTES_PER_BUCKET: u8 = 5;

/// Number of minute buckets in an hour
pub const MINUTE_BUCKETS: u8 = 60 / MINUTES_PER_BUCKET;

const ROLE_COUNT: usize = 4;
const CANDIDATE_COUNT: usize = ROLE_COUNT.pow(SEGMENT_COUNT as u32);

/// What a segment is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Role {
    #[default]
    Off = 0,
    Hour = 1,
    Minute = 2,
    Both = 3,
}

impl Role {
    pub const fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Off,
            1 => Self::Hour,
            2 => Self::Minute,
            3 => Self::Both,
            _ => return None,
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Both => "both",
        }
    }

    /// Whether the segment adds to the hour sum
    pub const fn counts_hour(self) -> bool {
        matches!(self, Self::Hour | Self::Both)
    }

    /// Whether the segment adds to the minute sum
    pub const fn counts_minute(self) -> bool {
        matches!(self, Self::Minute | Self::Both)
    }

    pub const fn is_lit(self) -> bool {
        !matches!(self, Self::Off)
    }
}

/// Role of every logical segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SegmentSet {
    roles: [Role; SEGMENT_COUNT],
}

impl SegmentSet {
    /// All segments off
    pub const fn blank() -> Self {
        Self {
            roles: [Role::Off; SEGMENT_COUNT],
        }
    }

    pub const fn from_roles(roles: [Role; SEGMENT_COUNT]) -> Self {
        Self { roles }
    }

    pub const fn roles(&self) -> [Role; SEGMENT_COUNT] {
        self.roles
    }

    pub fn role(&self, index: usize) -> Option<Role> {
        self.roles.get(index).copied()
    }

    /// Sum of the values of segments tagged `Hour` or `Both`
    pub fn hour_sum(&self) -> u8 {
        self.sum_where(Role::counts_hour)
    }

    /// Sum of the values of segments tagged `Minute` or `Both`
    pub fn minute_sum(&self) -> u8 {
        self.sum_where(Role::counts_minute)
    }

    pub fn both_count(&self) -> usize {
        self.roles.iter().filter(|role| **role == Role::Both).count()
    }

    pub fn lit_count(&self) -> usize {
        self.roles.iter().filter(|role| role.is_lit()).count()
    }

    pub fn is_blank(&self) -> bool {
        self.lit_count() == 0
    }

    /// Whether the set shows the given time
    pub fn shows(&self, time: TimeValue) -> bool {
        self.hour_sum() % 12 == time.hour_target() && self.minute_sum() == time.minute_bucket()
    }

    fn sum_where(&self, counts: fn(Role) -> bool) -> u8 {
        self.roles
            .iter()
            .zip(SEGMENT_VALUES)
            .filter(|(role, _)| counts(**role))
            .map(|(_, value)| value)
            .sum()
    }

    /// Lit segments as a bitmask, lowest index in the highest bit
    fn lit_mask(&self) -> u8 {
        self.roles
            .iter()
            .fold(0, |mask, role| (mask << 1) | u8::from(role.is_lit()))
    }

    /// Ordering key of the canonical choice, smallest wins
    ///
    /// Fewest `Both` segments, then a lit hour over an unlit one, then fewest
    /// lit segments, then lit segments on the lowest indices, then hour roles
    /// before minute roles.
    ///
    /// Only twelve o'clock has a zero hour sum candidate; the unlit hour loses
    /// so 12:00 shows all segments in the hour color instead of a blank face.
    fn rank(&self) -> (usize, bool, usize, u8, [Role; SEGMENT_COUNT]) {
        (
            self.both_count(),
            self.hour_sum() == 0,
            self.lit_count(),
            !self.lit_mask(),
            self.roles,
        )
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_code(mut code: usize) -> Self {
        let mut roles = [Role::Off; SEGMENT_COUNT];
        for role in &mut roles {
            *role = Role::from_raw((code % ROLE_COUNT) as u8).unwrap_or_default();
            code /= ROLE_COUNT;
        }
        Self { roles }
    }
}

/// Time as shown on the clock face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeValue {
    hour12: u8,
    minute_bucket: u8,
}

impl TimeValue {
    /// Returns `None` unless `hour12` is in `1..=12` and `minute_bucket` in `0..12`
    pub const fn new(hour12: u8, minute_bucket: u8) -> Option<Self> {
        if hour12 == 0 || hour12 > 12 || minute_bucket >= MINUTE_BUCKETS {
            return None;
        }
        Some(Self {
            hour12,
            minute_bucket,
        })
    }

    /// Build from a 24-hour wall-clock reading
    pub const fn from_clock(hour24: u8, minute: u8) -> Self {
        let hour12 = match hour24 % 12 {
            0 => 12,
            hour => hour,
        };
        let minute_bucket = if minute >= 60 {
            MINUTE_BUCKETS - 1
        } else {
            minute / MINUTES_PER_BUCKET
        };
        Self {
            hour12,
            minute_bucket,
        }
    }

    pub const fn hour12(self) -> u8 {
        self.hour12
    }

    pub const fn minute_bucket(self) -> u8 {
        self.minute_bucket
    }

    /// Hour sum modulo 12; twelve o'clock is zero
    pub const fn hour_target(self) -> u8 {
        self.hour12 % 12
    }
}

/// Encode a time into the canonical segment assignment
///
/// Every assignment whose hour sum is congruent to `hour12` modulo 12 and
/// whose minute sum equals `minute_bucket` is a candidate. The canonical one
/// uses the fewest `Both` segments, prefers a lit hour at twelve o'clock and
/// then the fewest lit segments; remaining ties go to the lower-indexed `1`
/// segment and to the hour role.
pub fn encode(hour12: u8, minute_bucket: u8) -> Result<SegmentSet, EncodingError> {
    let error = EncodingError {
        hour12,
        minute_bucket,
    };
    let time = TimeValue::new(hour12, minute_bucket).ok_or(error)?;

    (0..CANDIDATE_COUNT)
        .map(SegmentSet::from_code)
        .filter(|set| set.shows(time))
        .min_by_key(SegmentSet::rank)
        .ok_or(error)
}

/// Encode a time, falling back to a blank face
pub fn encode_or_blank(time: TimeValue) -> SegmentSet {
    encode(time.hour12(), time.minute_bucket()).unwrap_or_else(|error| {
        warn!("{error}, showing a blank face");
        SegmentSet::blank()
    })
}
