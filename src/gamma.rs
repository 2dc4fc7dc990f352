//! Gamma correction
//!
//! Maps a linear 8-bit intensity to the value the LED has to be driven with
//! for a perceptually linear response (γ = 2.8).

use crate::color::pack::to_byte;
use crate::color::{Rgb, RgbCct};

/// Gamma lookup table, γ = 2.8
#[rustfmt::skip]
pub const GAMMA8: [u8; 256] = [
      0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   1,   1,   1,   1,
      1,   1,   1,   1,   1,   1,   1,   1,   1,   2,   2,   2,   2,   2,   2,   2,
      2,   3,   3,   3,   3,   3,   3,   3,   4,   4,   4,   4,   4,   5,   5,   5,
      5,   6,   6,   6,   6,   7,   7,   7,   7,   8,   8,   8,   9,   9,   9,  10,
     10,  10,  11,  11,  11,  12,  12,  13,  13,  13,  14,  14,  15,  15,  16,  16,
     17,  17,  18,  18,  19,  19,  20,  20,  21,  21,  22,  22,  23,  24,  24,  25,
     25,  26,  27,  27,  28,  29,  29,  30,  31,  32,  32,  33,  34,  35,  35,  36,
     37,  38,  39,  39,  40,  41,  42,  43,  44,  45,  46,  47,  48,  49,  50,  50,
     51,  52,  54,  55,  56,  57,  58,  59,  60,  61,  62,  63,  64,  66,  67,  68,
     69,  70,  72,  73,  74,  75,  77,  78,  79,  81,  82,  83,  85,  86,  87,  89,
     90,  92,  93,  95,  96,  98,  99, 101, 102, 104, 105, 107, 109, 110, 112, 114,
    115, 117, 119, 120, 122, 124, 126, 127, 129, 131, 133, 135, 137, 138, 140, 142,
    144, 146, 148, 150, 152, 154, 156, 158, 160, 162, 164, 167, 169, 171, 173, 175,
    177, 180, 182, 184, 186, 189, 191, 193, 196, 198, 200, 203, 205, 208, 210, 213,
    215, 218, 220, 223, 225, 228, 231, 233, 236, 239, 241, 244, 247, 249, 252, 255,
];

/// Gamma-correct a single channel fraction
///
/// The fraction is quantized to 8 bits (saturating, NaN maps to 0) and the
/// corrected byte is normalized back to `[0, 1]`.
#[inline]
pub fn gamma_correct(fraction: f64) -> f64 {
    f64::from(GAMMA8[usize::from(to_byte(fraction))]) / 255.0
}

/// Gamma-correct every channel of a color
pub fn gamma_correct_rgb(color: Rgb) -> Rgb {
    Rgb::new(
        gamma_correct(color.r),
        gamma_correct(color.g),
        gamma_correct(color.b),
    )
}

/// Gamma-correct the color and both white channels
pub fn gamma_correct_rgbcct(color: RgbCct) -> RgbCct {
    RgbCct {
        color: gamma_correct_rgb(color.color),
        warm: gamma_correct(color.warm),
        cold: gamma_correct(color.cold),
    }
}
