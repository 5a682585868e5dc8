use crate::animation::SweepColors;
use crate::color::{BLACK, ColorMap};
use crate::encoder::SEGMENT_COUNT;

/// Color sweep, one segment per frame, cycling through the sweep colors
///
/// Each color paints over the previous one segment by segment. The sequence
/// never ends; the caller stops pulling frames.
#[derive(Debug, Clone)]
pub struct ConnectingFrames {
    colors: SweepColors,
    order: [usize; SEGMENT_COUNT],
    frame: usize,
    canvas: ColorMap,
}

impl ConnectingFrames {
    pub(crate) fn new(colors: SweepColors, order: [usize; SEGMENT_COUNT]) -> Self {
        Self {
            colors,
            order,
            frame: 0,
            canvas: [BLACK; SEGMENT_COUNT],
        }
    }

    /// Start over from a dark strip
    pub fn restart(&mut self) {
        self.frame = 0;
        self.canvas = [BLACK; SEGMENT_COUNT];
    }

    /// Number of frames in one pass over every color
    pub fn cycle_len(&self) -> usize {
        SEGMENT_COUNT * self.colors.len()
    }
}

impl Iterator for ConnectingFrames {
    type Item = ColorMap;

    fn next(&mut self) -> Option<ColorMap> {
        if self.colors.is_empty() {
            return Some(self.canvas);
        }
        let color = self.colors[(self.frame / SEGMENT_COUNT) % self.colors.len()];
        let segment = self.order[self.frame % SEGMENT_COUNT];
        if let Some(slot) = self.canvas.get_mut(segment) {
            *slot = color;
        }
        self.frame = (self.frame + 1) % self.cycle_len();

        Some(self.canvas)
    }
}
