use crate::color::{BLACK, BLUE, ColorMap, GREEN, RED, Rgb};
use crate::encoder::{Role, SegmentSet};

/// Colors used for each segment role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub hour: Rgb,
    pub minute: Rgb,
    pub both: Rgb,
    pub off: Rgb,
}

impl Palette {
    pub const fn color_for(&self, role: Role) -> Rgb {
        match role {
            Role::Off => self.off,
            Role::Hour => self.hour,
            Role::Minute => self.minute,
            Role::Both => self.both,
        }
    }

    /// Unscaled colors of every segment in the set
    pub fn color_map(&self, set: &SegmentSet) -> ColorMap {
        set.roles().map(|role| self.color_for(role))
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            hour: RED,
            minute: BLUE,
            both: GREEN,
            off: BLACK,
        }
    }
}
