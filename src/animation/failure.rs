use crate::animation::FAILURE_PULSE_FRAMES;
use crate::color::{BLACK, ColorMap, Rgb, blend_colors};
use crate::encoder::SEGMENT_COUNT;
use crate::math8::{ease_in_out_quad, ratio8, triangle8};

/// All segments pulse a warning color a fixed number of times
#[derive(Debug, Clone)]
pub struct FailureFrames {
    color: Rgb,
    frame: usize,
    total: usize,
}

impl FailureFrames {
    pub(crate) fn new(color: Rgb, pulses: u8) -> Self {
        Self {
            color,
            frame: 0,
            total: usize::from(pulses) * FAILURE_PULSE_FRAMES,
        }
    }

    pub const fn remaining(&self) -> usize {
        self.total - self.frame
    }
}

impl Iterator for FailureFrames {
    type Item = ColorMap;

    fn next(&mut self) -> Option<ColorMap> {
        if self.frame >= self.total {
            return None;
        }
        let phase = ratio8(self.frame % FAILURE_PULSE_FRAMES, FAILURE_PULSE_FRAMES);
        let level = ease_in_out_quad(triangle8(phase));
        self.frame += 1;

        Some([blend_colors(BLACK, self.color, level); SEGMENT_COUNT])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FailureFrames {}
