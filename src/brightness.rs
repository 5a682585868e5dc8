use crate::input::{Button, ButtonEdge};
use crate::logging::debug;

/// Default brightness applied at boot
pub const DEFAULT_BRIGHTNESS: f32 = 0.8;

/// Default change per button press
pub const DEFAULT_STEP: f32 = 0.1;

const MIN_BRIGHTNESS: f32 = 0.0;
const MAX_BRIGHTNESS: f32 = 1.0;

/// Resolution brightness levels are rounded to, so repeated steps do not drift
const QUANTUM: f32 = 1000.0;

/// Smallest step that still changes the level after rounding
pub const MIN_STEP: f32 = 1.0 / QUANTUM;

/// Owner of the process-wide brightness level
///
/// The level is always within `0.0..=1.0`. Pressing past a bound is a no-op.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightnessController {
    level: f32,
    step: f32,
}

impl BrightnessController {
    pub fn new(initial: f32, step: f32) -> Self {
        Self {
            level: quantize(initial),
            step: libm::fabsf(step),
        }
    }

    pub const fn level(&self) -> f32 {
        self.level
    }

    pub const fn step(&self) -> f32 {
        self.step
    }

    /// Raise the level by one step, returns whether it changed
    pub fn increase(&mut self) -> bool {
        self.set(self.level + self.step)
    }

    /// Lower the level by one step, returns whether it changed
    pub fn decrease(&mut self) -> bool {
        self.set(self.level - self.step)
    }

    /// Apply a debounced button press
    pub fn apply(&mut self, edge: ButtonEdge) -> bool {
        let changed = match edge.button() {
            Button::Decrease => self.decrease(),
            Button::Increase => self.increase(),
        };
        if changed {
            debug!("brightness: {:.1}", self.level);
        }
        changed
    }

    fn set(&mut self, level: f32) -> bool {
        let level = quantize(level);
        if libm::fabsf(level - self.level) < f32::EPSILON {
            return false;
        }
        self.level = level;
        true
    }
}

impl Default for BrightnessController {
    fn default() -> Self {
        Self::new(DEFAULT_BRIGHTNESS, DEFAULT_STEP)
    }
}

fn quantize(level: f32) -> f32 {
    if level.is_nan() {
        return MIN_BRIGHTNESS;
    }
    let level = level.clamp(MIN_BRIGHTNESS, MAX_BRIGHTNESS);
    libm::roundf(level * QUANTUM) / QUANTUM
}
