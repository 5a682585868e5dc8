mod palette;
mod utils;

pub use palette::Palette;
use smart_leds::RGB8;
pub use utils::{blend_colors, rgb_from_u32};

use crate::encoder::SEGMENT_COUNT;

pub type Rgb = RGB8;

/// Color of every logical segment, indexed like [`crate::encoder::SEGMENT_VALUES`]
pub type ColorMap = [Rgb; SEGMENT_COUNT];

pub const BLACK: Rgb = rgb_from_u32(0x00_00_00);
pub const RED: Rgb = rgb_from_u32(0xFF_00_00);
pub const GREEN: Rgb = rgb_from_u32(0x00_FF_00);
pub const BLUE: Rgb = rgb_from_u32(0x00_00_FF);
pub const YELLOW: Rgb = rgb_from_u32(0xFF_FF_00);
pub const MAGENTA: Rgb = rgb_from_u32(0xFF_00_FF);
pub const WHITE: Rgb = rgb_from_u32(0xFF_FF_FF);
