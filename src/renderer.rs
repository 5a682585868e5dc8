use crate::StripDriver;
use crate::color::{ColorMap, Palette, Rgb};
use crate::encoder::{SEGMENT_COUNT, SegmentSet};
use crate::error::ConfigError;
use crate::layout::{StripLayout, bounded};
use crate::math8::scale_linear;

/// Scale every channel of a color by a brightness in `0.0..=1.0`
pub fn scale_color(color: Rgb, brightness: f32) -> Rgb {
    Rgb {
        r: scale_linear(color.r, brightness),
        g: scale_linear(color.g, brightness),
        b: scale_linear(color.b, brightness),
    }
}

/// Turns segment roles and brightness into a pixel buffer
///
/// Rendering is stateless apart from the buffer itself, so the same inputs
/// always produce the same pixels.
pub struct ClockRenderer<const MAX_PIXELS: usize> {
    layout: StripLayout,
    palette: Palette,
    frame_buffer: [Rgb; MAX_PIXELS],
}

impl<const MAX_PIXELS: usize> ClockRenderer<MAX_PIXELS> {
    pub fn new(layout: StripLayout, palette: Palette) -> Result<Self, ConfigError> {
        if layout.total_pixels() > MAX_PIXELS {
            return Err(ConfigError::TooManyPixels {
                needed: layout.total_pixels(),
                capacity: MAX_PIXELS,
            });
        }
        Ok(Self {
            layout,
            palette,
            frame_buffer: [Rgb::default(); MAX_PIXELS],
        })
    }

    pub const fn layout(&self) -> &StripLayout {
        &self.layout
    }

    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Render the clock face
    pub fn render(&mut self, set: &SegmentSet, brightness: f32) -> &[Rgb] {
        let colors = self.palette.color_map(set);
        self.render_colors(&colors, brightness)
    }

    /// Render arbitrary per-segment colors, used for animation frames
    pub fn render_colors(&mut self, colors: &ColorMap, brightness: f32) -> &[Rgb] {
        for (logical, color) in colors.iter().enumerate() {
            let scaled = scale_color(*color, brightness);
            bounded(&mut self.frame_buffer, self.layout.bounds(logical)).fill(scaled);
        }
        self.frame()
    }

    /// Render every segment in one color
    pub fn render_solid(&mut self, color: Rgb, brightness: f32) -> &[Rgb] {
        self.render_colors(&[color; SEGMENT_COUNT], brightness)
    }

    /// Last rendered buffer
    pub fn frame(&self) -> &[Rgb] {
        &self.frame_buffer[..self.layout.total_pixels()]
    }
}

/// Drivers for the output lines of the strip
pub enum StripOutputs<D: StripDriver> {
    /// One driver for a daisy-chained strip
    Single(D),
    /// One driver per segment, in wiring order
    Multi([D; SEGMENT_COUNT]),
}

impl<D: StripDriver> StripOutputs<D> {
    pub const fn line_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multi(_) => SEGMENT_COUNT,
        }
    }

    /// Transmit a rendered frame over every line
    pub fn transmit(&mut self, layout: &StripLayout, frame: &[Rgb]) -> Result<(), D::Error> {
        match self {
            Self::Single(driver) => driver.write(frame),
            Self::Multi(drivers) => {
                for (position, driver) in drivers.iter_mut().enumerate() {
                    let bounds = layout.physical_bounds(position);
                    driver.write(frame.get(bounds.range()).unwrap_or_default())?;
                }
                Ok(())
            }
        }
    }

    /// Write the same pixels to the start of every line
    pub fn write_each(&mut self, pixels: &[Rgb]) -> Result<(), D::Error> {
        match self {
            Self::Single(driver) => driver.write(pixels),
            Self::Multi(drivers) => drivers.iter_mut().try_for_each(|driver| driver.write(pixels)),
        }
    }
}
