//! Police strobe overlay

use super::blinker::Band;

/// Strobe on/off half period in milliseconds
const STROBE_PERIOD_MS: u64 = 100;
/// Side switch period in milliseconds
const SIDE_PERIOD_MS: u64 = 400;

/// Strobe timing, owned by every engine instance
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PoliceOverlay {
    enabled: bool,
    tick: u64,
    on_phase: bool,
    left_phase: bool,
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn scaled_index(fraction: f64, count: usize) -> usize {
    libm::round(fraction * count as f64) as usize
}

impl PoliceOverlay {
    pub(crate) const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) const fn on_phase(&self) -> bool {
        self.on_phase
    }

    pub(crate) const fn left_phase(&self) -> bool {
        self.left_phase
    }

    /// Recompute the phases from the free-running tick, then advance it
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub(crate) fn advance(&mut self, step_time: f64) {
        let millis = libm::round(self.tick as f64 * step_time * 1000.0) as u64;
        self.on_phase = (millis / STROBE_PERIOD_MS) % 2 == 0;
        self.left_phase = (millis / SIDE_PERIOD_MS) % 2 == 0;
        self.tick = self.tick.wrapping_add(1);
    }

    /// Range painted blue in the current frame
    pub(crate) fn band(&self, count: usize) -> Option<Band> {
        if !self.enabled || !self.on_phase {
            return None;
        }
        let band = if self.left_phase {
            Band::new(scaled_index(0.5, count), scaled_index(0.7, count))
        } else {
            Band::new(scaled_index(0.3, count), scaled_index(0.5, count))
        };
        Some(band)
    }
}
