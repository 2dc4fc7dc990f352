//! Color model
//!
//! Channels are fractions in `[0, 1]` stored as `f64`, hue is in degrees.
//! The white extension carries independent warm and cold channels (CCT).

mod cct;
mod hsv;
pub(crate) mod pack;

use smart_leds::RGB;

pub use cct::{
    COLD_TEMPERATURE, WARM_TEMPERATURE, WhiteBalance, hsvcct2rgbcct, max_white_brightness,
    rgbcct2hsvcct, set_max_white_brightness,
};
pub use hsv::{hsv2rgb, rgb2hsv};
pub use pack::{to_brg8, to_cwwwbrg8, to_rgb8};

/// RGB color with fractional channels
pub type Rgb = RGB<f64>;

pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
pub const BLUE: Rgb = Rgb::new(0.0, 0.0, 1.0);
pub const AMBER: Rgb = Rgb::new(1.0, 1.0, 0.0);

/// HSV color, hue in degrees `[0, 360)`, saturation and value in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsv {
    pub hue: f64,
    pub sat: f64,
    pub val: f64,
}

impl Hsv {
    pub const fn new(hue: f64, sat: f64, val: f64) -> Self {
        Self { hue, sat, val }
    }
}

/// RGB color plus warm and cold white channels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RgbCct {
    pub color: Rgb,
    pub warm: f64,
    pub cold: f64,
}

impl RgbCct {
    pub const fn new(color: Rgb, warm: f64, cold: f64) -> Self {
        Self { color, warm, cold }
    }

    /// Color without any white contribution
    pub const fn from_rgb(color: Rgb) -> Self {
        Self {
            color,
            warm: 0.0,
            cold: 0.0,
        }
    }
}

/// HSV color plus a white value and its color temperature in Kelvin
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HsvCct {
    pub color: Hsv,
    pub temperature: f64,
    pub white: f64,
}

impl HsvCct {
    pub const fn new(color: Hsv, temperature: f64, white: f64) -> Self {
        Self {
            color,
            temperature,
            white,
        }
    }
}
