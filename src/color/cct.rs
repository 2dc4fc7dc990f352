use core::cell::Cell;

use critical_section::Mutex;

use super::{HsvCct, RgbCct, hsv2rgb, rgb2hsv};

/// Temperature of the warm white channel in Kelvin
pub const WARM_TEMPERATURE: f64 = 3000.0;
/// Temperature of the cold white channel in Kelvin
pub const COLD_TEMPERATURE: f64 = 6500.0;

/// How a requested white value is split across the two white channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhiteBalance {
    /// Cold and warm add up to the white value; brightness stays constant
    /// across temperatures.
    #[default]
    Constant,
    /// The stronger channel is driven to the white value; brightest output
    /// at every temperature, peaking in the middle of the range.
    Maximum,
}

static MAX_WHITE_BRIGHTNESS: Mutex<Cell<bool>> = Mutex::new(Cell::new(false));

/// Switch every light in the process between constant and maximum white
pub fn set_max_white_brightness(max: bool) {
    critical_section::with(|cs| MAX_WHITE_BRIGHTNESS.borrow(cs).set(max));
}

/// Current process-wide white balance
pub fn max_white_brightness() -> WhiteBalance {
    let max = critical_section::with(|cs| MAX_WHITE_BRIGHTNESS.borrow(cs).get());
    if max {
        WhiteBalance::Maximum
    } else {
        WhiteBalance::Constant
    }
}

/// Convert RGB+CCT to HSV+CCT
///
/// The temperature is the fraction-weighted mean of the two channel
/// temperatures and is NaN when both white channels are off.
pub fn rgbcct2hsvcct(input: RgbCct) -> HsvCct {
    let total = input.cold + input.warm;
    let temperature = (COLD_TEMPERATURE * input.cold + WARM_TEMPERATURE * input.warm) / total;

    HsvCct {
        color: rgb2hsv(input.color),
        temperature,
        white: total.min(1.0),
    }
}

/// Convert HSV+CCT to RGB+CCT
///
/// The temperature is mapped linearly onto the warm..cold range. Values
/// outside of it are passed through unclamped.
pub fn hsvcct2rgbcct(input: HsvCct, balance: WhiteBalance) -> RgbCct {
    let range = COLD_TEMPERATURE - WARM_TEMPERATURE;
    let mut cold = (input.temperature - WARM_TEMPERATURE) / range;
    let mut warm = (COLD_TEMPERATURE - input.temperature) / range;

    if balance == WhiteBalance::Maximum {
        let peak = cold.max(warm);
        if peak > 0.0 {
            cold /= peak;
            warm /= peak;
        }
    }

    RgbCct {
        color: hsv2rgb(input.color),
        warm: warm * input.white,
        cold: cold * input.white,
    }
}
