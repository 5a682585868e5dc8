/// Scale an 8-bit value by a factor (0-255 = 0.0-1.0)
///
/// Uses integer math for efficiency on embedded systems.
#[inline]
#[allow(clippy::cast_lossless)]
pub const fn scale8(value: u8, scale: u8) -> u8 {
    ((value as u16 * (1 + scale as u16)) >> 8) as u8
}

/// Blend two 8-bit values
#[inline]
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub const fn blend8(a: u8, b: u8, amount_of_b: u8) -> u8 {
    let delta = b as i16 - a as i16;

    let mut partial: u32 = (a as u32) << 16; // a * 65536
    partial = partial.wrapping_add(
        (delta as u32)
            .wrapping_mul(amount_of_b as u32)
            .wrapping_mul(257),
    ); // (b - a) * amount_of_b * 257
    partial = partial.wrapping_add(0x8000); // + 32768 for rounding

    (partial >> 16) as u8
}

/// Position of `part` within `whole` mapped onto 0-255
///
/// Frame-index counterpart of a time-based progress value.
#[allow(clippy::cast_possible_truncation)]
#[inline]
pub const fn ratio8(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    if part >= whole {
        return 255;
    }

    ((part * 256) / whole) as u8
}

/// Triangle wave over a 0-255 phase, peaking at the middle
#[inline]
pub const fn triangle8(phase: u8) -> u8 {
    if phase < 128 {
        phase * 2
    } else {
        (255 - phase) * 2
    }
}

/// Ease in out quadratic
pub fn ease_in_out_quad(i: u8) -> u8 {
    let j = if i & 0x80 != 0 { 255 - i } else { i };
    let jj = scale8(j, j);
    let jj2 = jj << 1;
    if i & 0x80 == 0 { jj2 } else { 255 - jj2 }
}

/// Scale an 8-bit channel by a linear factor in `0.0..=1.0`
///
/// The result is truncated and clamped to the channel range. `NaN` scales to zero.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn scale_linear(value: u8, factor: f32) -> u8 {
    let scaled = f32::from(value) * factor;
    if scaled.is_nan() {
        return 0;
    }
    scaled.clamp(0.0, 255.0) as u8
}
