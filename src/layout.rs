use core::ops::Range;

use serde::Deserialize;

use crate::color::Rgb;
use crate::encoder::{SEGMENT_COUNT, SEGMENT_VALUES};
use crate::error::ConfigError;

/// Default pins of the multi-pin wiring, in wiring order
pub const DEFAULT_PINS: [u8; SEGMENT_COUNT] = [1, 2, 3, 4, 5];

/// Default data pin of the single-pin wiring
pub const DEFAULT_DATA_PIN: u8 = 2;

/// Pixel range of one segment inside the frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentBounds {
    pub start: usize,
    pub end: usize,
}

impl SegmentBounds {
    /// Get the number of LEDs in the segment
    pub const fn count(self) -> usize {
        self.end - self.start
    }

    pub const fn range(self) -> Range<usize> {
        self.start..self.end
    }
}

/// Get a slice of the LEDs within the bounds
pub(crate) fn bounded(leds: &mut [Rgb], bounds: SegmentBounds) -> &mut [Rgb] {
    &mut leds[bounds.range()]
}

/// How the segments are connected to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wiring {
    /// Every segment on its own output line, pins in wiring order
    MultiPin { pins: [u8; SEGMENT_COUNT] },
    /// All segments daisy-chained on one line
    SinglePin { pin: u8 },
}

impl Wiring {
    /// Number of output lines the wiring drives
    pub const fn line_count(self) -> usize {
        match self {
            Self::MultiPin { .. } => SEGMENT_COUNT,
            Self::SinglePin { .. } => 1,
        }
    }
}

/// A segment as it sits on the strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhysicalSegment {
    /// Fibonacci value of the segment
    pub value: u8,
    /// Number of LEDs in the segment
    pub leds: u16,
}

/// Segments of the stock build, in wiring order
pub const DEFAULT_SEGMENTS: [PhysicalSegment; SEGMENT_COUNT] = [
    PhysicalSegment { value: 5, leds: 32 },
    PhysicalSegment { value: 3, leds: 12 },
    PhysicalSegment { value: 2, leds: 5 },
    PhysicalSegment { value: 1, leds: 2 },
    PhysicalSegment { value: 1, leds: 2 },
];

/// Mapping of logical segments to pixel ranges and output lines
///
/// Pixels are laid out in wiring order. A single-pin strip transmits the
/// whole buffer, a multi-pin strip transmits each segment's range on its
/// own line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripLayout {
    wiring: Wiring,
    /// Pixel range of each logical segment
    bounds: [SegmentBounds; SEGMENT_COUNT],
    /// Logical segment at each wiring position
    order: [usize; SEGMENT_COUNT],
    total: usize,
}

impl StripLayout {
    /// Build a layout from segments in wiring order
    ///
    /// The values must be a permutation of `1, 1, 2, 3, 5`. Segments with equal
    /// values map to logical segments in wiring order.
    pub fn new(
        wiring: Wiring,
        segments: &[PhysicalSegment; SEGMENT_COUNT],
    ) -> Result<Self, ConfigError> {
        let mut assigned = [false; SEGMENT_COUNT];
        let mut order = [0; SEGMENT_COUNT];
        let mut bounds = [SegmentBounds::default(); SEGMENT_COUNT];
        let mut offset = 0;

        for (position, segment) in segments.iter().enumerate() {
            if segment.leds == 0 {
                return Err(ConfigError::OutOfRange("layout.segments.leds"));
            }
            let logical = SEGMENT_VALUES
                .iter()
                .zip(assigned)
                .position(|(value, taken)| *value == segment.value && !taken)
                .ok_or(ConfigError::SegmentValues)?;
            assigned[logical] = true;
            order[position] = logical;

            let count = usize::from(segment.leds);
            bounds[logical] = SegmentBounds {
                start: offset,
                end: offset + count,
            };
            offset += count;
        }

        Ok(Self {
            wiring,
            bounds,
            order,
            total: offset,
        })
    }

    pub const fn wiring(&self) -> Wiring {
        self.wiring
    }

    /// Pixel range of a logical segment
    pub fn bounds(&self, logical: usize) -> SegmentBounds {
        self.bounds.get(logical).copied().unwrap_or_default()
    }

    /// Pixel range of the segment at a wiring position
    pub fn physical_bounds(&self, position: usize) -> SegmentBounds {
        self.order
            .get(position)
            .map(|logical| self.bounds(*logical))
            .unwrap_or_default()
    }

    /// Logical segments in wiring order
    pub const fn physical_order(&self) -> [usize; SEGMENT_COUNT] {
        self.order
    }

    pub const fn total_pixels(&self) -> usize {
        self.total
    }
}
