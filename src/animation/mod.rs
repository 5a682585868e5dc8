//! Boot animations with compile-time known variants
//!
//! Animations are lazy iterators of [`ColorMap`] frames, one frame per tick.
//! They only know color math and frame indices.

mod connecting;
mod failure;

pub use connecting::ConnectingFrames;
pub use failure::FailureFrames;
use heapless::Vec;

use crate::color::{BLUE, ColorMap, GREEN, RED, Rgb, YELLOW};
use crate::encoder::SEGMENT_COUNT;

/// Maximum number of sweep colors
pub const MAX_SWEEP_COLORS: usize = 8;

/// Default sweep colors
pub const DEFAULT_SWEEP_COLORS: [Rgb; 3] = [RED, GREEN, BLUE];

/// Default warning color of the failure pulse
pub const DEFAULT_FAILURE_COLOR: Rgb = YELLOW;

/// Default number of failure pulses
pub const DEFAULT_FAILURE_PULSES: u8 = 3;

/// Frames per failure pulse
pub const FAILURE_PULSE_FRAMES: usize = 8;

pub type SweepColors = Vec<Rgb, MAX_SWEEP_COLORS>;

const ANIMATION_NAME_CONNECTING: &str = "connecting";
const ANIMATION_NAME_FAILURE: &str = "failure";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    /// Endless sweep while the network comes up
    Connecting,
    /// Short warning pulse after a failed sync
    Failure,
}

impl AnimationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => ANIMATION_NAME_CONNECTING,
            Self::Failure => ANIMATION_NAME_FAILURE,
        }
    }
}

/// Frame sequence of one animation
#[derive(Debug, Clone)]
pub enum Frames {
    Connecting(ConnectingFrames),
    Failure(FailureFrames),
}

impl Frames {
    pub const fn kind(&self) -> AnimationKind {
        match self {
            Self::Connecting(_) => AnimationKind::Connecting,
            Self::Failure(_) => AnimationKind::Failure,
        }
    }
}

impl Iterator for Frames {
    type Item = ColorMap;

    fn next(&mut self) -> Option<ColorMap> {
        match self {
            Self::Connecting(frames) => frames.next(),
            Self::Failure(frames) => frames.next(),
        }
    }
}

/// Builds animation frame sequences
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    sweep_colors: SweepColors,
    sweep_order: [usize; SEGMENT_COUNT],
    failure_color: Rgb,
    failure_pulses: u8,
}

impl AnimationPlayer {
    /// Create a player sweeping segments in `sweep_order`
    ///
    /// An empty color list falls back to [`DEFAULT_SWEEP_COLORS`].
    pub fn new(sweep_colors: SweepColors, sweep_order: [usize; SEGMENT_COUNT]) -> Self {
        let sweep_colors = if sweep_colors.is_empty() {
            Vec::from_slice(&DEFAULT_SWEEP_COLORS).unwrap_or_default()
        } else {
            sweep_colors
        };
        Self {
            sweep_colors,
            sweep_order,
            failure_color: DEFAULT_FAILURE_COLOR,
            failure_pulses: DEFAULT_FAILURE_PULSES,
        }
    }

    /// Set the warning color and pulse count of the failure animation
    #[must_use]
    pub const fn with_failure(mut self, color: Rgb, pulses: u8) -> Self {
        self.failure_color = color;
        self.failure_pulses = pulses;
        self
    }

    pub fn frames(&self, kind: AnimationKind) -> Frames {
        match kind {
            AnimationKind::Connecting => Frames::Connecting(ConnectingFrames::new(
                self.sweep_colors.clone(),
                self.sweep_order,
            )),
            AnimationKind::Failure => Frames::Failure(FailureFrames::new(
                self.failure_color,
                self.failure_pulses,
            )),
        }
    }
}
