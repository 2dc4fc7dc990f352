//! Emergency brake strobe

/// Square wave between brake and normal brightness
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct EmergencyBrake {
    tick: u32,
}

impl EmergencyBrake {
    pub(crate) fn reset(&mut self) {
        self.tick = 0;
    }

    /// Brightness for the current tick, then advance one tick
    ///
    /// The first half of every period is at `brake`, the second at `normal`.
    pub(crate) fn level(&mut self, step_time: f64, frequency: f64, normal: f64, brake: f64) -> f64 {
        let half_period = 1.0 / (frequency * 2.0);
        let level = if f64::from(self.tick) * step_time > half_period {
            normal
        } else {
            brake
        };

        self.tick += 1;
        if f64::from(self.tick) * step_time > 2.0 * half_period {
            self.tick = 0;
        }

        level
    }
}
