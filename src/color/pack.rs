//! Wire packing for the LED transmitter

use smart_leds::RGB8;

use super::{Rgb, RgbCct};

#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn to_byte(fraction: f64) -> u8 {
    // Saturating float cast, NaN becomes 0
    (fraction * 255.0) as u8
}

/// Quantize a color to 8 bits per channel
pub fn to_rgb8(color: Rgb) -> RGB8 {
    RGB8::new(to_byte(color.r), to_byte(color.g), to_byte(color.b))
}

/// Pack a color as `0xBBRRGG`
pub fn to_brg8(color: Rgb) -> u32 {
    let RGB8 { r, g, b } = to_rgb8(color);
    (u32::from(b) << 16) | (u32::from(r) << 8) | u32::from(g)
}

/// Pack a color with white channels as `0xCCWWBBRRGG`
pub fn to_cwwwbrg8(color: RgbCct) -> u64 {
    let cold = u64::from(to_byte(color.cold));
    let warm = u64::from(to_byte(color.warm));
    (cold << 32) | (warm << 24) | u64::from(to_brg8(color.color))
}
