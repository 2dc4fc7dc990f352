use super::{Hsv, Rgb};

/// Below this spread between the largest and smallest channel a color is gray
const GRAY_THRESHOLD: f64 = 0.000_01;

/// Convert RGB to HSV
///
/// Gray inputs (channel spread below `1e-5`) yield zero saturation and zero
/// hue. A zero maximum cannot reach the division, but is still mapped to
/// zero saturation with a NaN hue.
pub fn rgb2hsv(rgb: Rgb) -> Hsv {
    let min = rgb.r.min(rgb.g).min(rgb.b);
    let max = rgb.r.max(rgb.g).max(rgb.b);
    let delta = max - min;

    if delta < GRAY_THRESHOLD {
        return Hsv::new(0.0, 0.0, max);
    }
    if max <= 0.0 {
        return Hsv::new(f64::NAN, 0.0, max);
    }

    let sat = delta / max;

    // Ties resolve red first, then green
    let sector = if rgb.r >= max {
        (rgb.g - rgb.b) / delta
    } else if rgb.g >= max {
        2.0 + (rgb.b - rgb.r) / delta
    } else {
        4.0 + (rgb.r - rgb.g) / delta
    };

    let mut hue = sector * 60.0;
    if hue < 0.0 {
        hue += 360.0;
    }

    Hsv::new(hue, sat, max)
}

/// Convert HSV to RGB over six 60° sectors
#[allow(clippy::cast_possible_truncation)]
pub fn hsv2rgb(hsv: Hsv) -> Rgb {
    let Hsv { hue, sat, val } = hsv;

    if sat <= 0.0 {
        return Rgb::new(val, val, val);
    }

    let hh = if hue >= 360.0 { 0.0 } else { hue } / 60.0;
    let sector = hh as i64;
    let ff = hh - sector as f64;

    let p = val * (1.0 - sat);
    let q = val * (1.0 - sat * ff);
    let t = val * (1.0 - sat * (1.0 - ff));

    match sector {
        0 => Rgb::new(val, t, p),
        1 => Rgb::new(q, val, p),
        2 => Rgb::new(p, val, t),
        3 => Rgb::new(p, q, val),
        4 => Rgb::new(t, p, val),
        _ => Rgb::new(val, p, q),
    }
}
