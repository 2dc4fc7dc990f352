//! Turn signal and hazard sweep

/// Active turn-signal mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlinkerMode {
    #[default]
    Off,
    Left,
    Right,
    Hazard,
}

/// Timing of the amber sweep
#[derive(Debug, Clone, Copy)]
pub struct BlinkerConfig {
    /// Band width as a fraction of the strip
    pub width: f64,
    /// Sweep speed in strip widths per second
    pub speed: f64,
    /// Dark time between two sweeps in seconds
    pub pause: f64,
}

impl Default for BlinkerConfig {
    fn default() -> Self {
        Self {
            width: 0.2,
            speed: 0.4,
            pause: 0.3,
        }
    }
}

/// Half-open pixel index range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub start: usize,
    pub end: usize,
}

impl Band {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[inline]
    pub const fn contains(self, index: usize) -> bool {
        index >= self.start && index < self.end
    }

    pub const fn is_empty(self) -> bool {
        self.end <= self.start
    }
}

/// Pixel ranges lit by the blinker in the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkerBands {
    None,
    One(Band),
    Both(Band, Band),
}

impl BlinkerBands {
    #[inline]
    pub const fn contains(self, index: usize) -> bool {
        match self {
            Self::None => false,
            Self::One(band) => band.contains(index),
            Self::Both(first, second) => first.contains(index) || second.contains(index),
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn covered(phase: f64, count: usize) -> usize {
    let covered = libm::round(phase * count as f64);
    if covered <= 0.0 {
        0
    } else {
        (covered as usize).min(count)
    }
}

/// Band growing from the first pixel toward the center
fn leading_band(phase: f64, count: usize) -> Band {
    Band::new(0, covered(phase, count))
}

/// Band growing from the last pixel toward the center
fn trailing_band(phase: f64, count: usize) -> Band {
    Band::new(count - covered(phase, count), count)
}

impl BlinkerMode {
    /// Pixel ranges covered at `phase` on a strip of `count` pixels
    pub fn bands(self, phase: f64, count: usize) -> BlinkerBands {
        match self {
            Self::Off => BlinkerBands::None,
            Self::Left => BlinkerBands::One(trailing_band(phase, count)),
            Self::Right => BlinkerBands::One(leading_band(phase, count)),
            Self::Hazard => {
                BlinkerBands::Both(leading_band(phase, count), trailing_band(phase, count))
            }
        }
    }
}

/// Sweep state of the turn signal
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Blinker {
    mode: BlinkerMode,
    phase: f64,
    paused: f64,
    off_when_done: bool,
}

impl Blinker {
    pub(crate) const fn mode(&self) -> BlinkerMode {
        self.mode
    }

    pub(crate) const fn phase(&self) -> f64 {
        self.phase
    }

    pub(crate) const fn is_turning_off(&self) -> bool {
        self.off_when_done
    }

    /// Switch to an active mode, a fresh sweep starts when coming from off
    pub(crate) fn activate(&mut self, mode: BlinkerMode) {
        if self.mode == BlinkerMode::Off {
            self.phase = 0.0;
            self.paused = 0.0;
        }
        self.mode = mode;
        self.off_when_done = false;
    }

    /// Clear the mode once the running sweep has finished
    pub(crate) fn deactivate(&mut self) {
        self.off_when_done = true;
    }

    /// Advance the sweep by one tick of `step_time` seconds
    pub(crate) fn advance(&mut self, step_time: f64, config: &BlinkerConfig) {
        if self.paused > config.pause {
            self.phase += config.speed * step_time;
        } else {
            self.paused += step_time;
        }

        if self.phase > config.width {
            if self.off_when_done {
                self.mode = BlinkerMode::Off;
                self.off_when_done = false;
            }
            self.phase = 0.0;
            self.paused = 0.0;
        }
    }

    pub(crate) fn bands(&self, count: usize) -> BlinkerBands {
        self.mode.bands(self.phase, count)
    }
}
