//! Car light animation engine
//!
//! Turns mode flags and timers into a composited pixel frame. Every call to
//! [`CarLight::step`] represents one fixed tick; command methods only set
//! flags and targets and never touch the pixel buffer.

mod blinker;
mod brake;
mod police;

use embassy_time::Duration;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::color::{
    AMBER, BLUE, Hsv, HsvCct, Rgb, RgbCct, hsvcct2rgbcct, max_white_brightness, rgb2hsv,
    rgbcct2hsvcct,
};
use crate::filter::{Filter, RcFilter, RcParameters};
use crate::gamma::gamma_correct_rgbcct;

pub use blinker::{Band, BlinkerBands, BlinkerConfig, BlinkerMode};
use blinker::Blinker;
use brake::EmergencyBrake;
use police::PoliceOverlay;

/// Filtered and raw values closer than this are considered converged
pub const CONVERGENCE_EPSILON: f64 = 1e-3;

/// White temperature used when the base color carries no white
pub const DEFAULT_WHITE_TEMPERATURE: f64 = 4000.0;

/// Configuration for a car light
#[derive(Debug, Clone, Copy)]
pub struct CarLightConfig {
    /// Duration of one `step()` in seconds
    pub step_time: f64,
    /// Base color and white channels
    pub color: RgbCct,
    /// Color brightness while not braking
    pub normal_brightness: f64,
    /// Color brightness while braking
    pub brake_brightness: f64,
    /// Emergency brake strobe frequency in Hz
    pub emergency_brake_frequency: f64,
    /// Turn signal timing
    pub blinker: BlinkerConfig,
    /// Network of the power on/off sweep filter
    pub sweep_filter: RcParameters,
    /// Network of the per-pixel brightness filters
    pub pixel_filter: RcParameters,
}

impl Default for CarLightConfig {
    fn default() -> Self {
        Self {
            step_time: 0.02,
            color: RgbCct::from_rgb(Rgb::new(1.0, 0.0, 0.0)),
            normal_brightness: 0.3,
            brake_brightness: 1.0,
            emergency_brake_frequency: 5.0,
            blinker: BlinkerConfig::default(),
            sweep_filter: RcParameters::new(200.0, 0.001),
            pixel_filter: RcParameters::new(100.0, 0.001),
        }
    }
}

impl CarLightConfig {
    /// Set the step time from a frame duration
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn with_step(mut self, step: Duration) -> Self {
        self.step_time = step.as_micros() as f64 / 1_000_000.0;
        self
    }

    /// Set the base color
    #[must_use]
    pub fn with_color(mut self, color: RgbCct) -> Self {
        self.color = color;
        self
    }
}

/// Smoothing filters of one pixel
#[derive(Debug, Clone, Copy)]
struct PixelFilter {
    color: RcFilter,
    white: RcFilter,
}

impl PixelFilter {
    fn new(step_time: f64, parameters: RcParameters) -> Self {
        Self {
            color: RcFilter::new(step_time, parameters),
            white: RcFilter::new(step_time, parameters),
        }
    }
}

/// Value waiting for the sweep to settle before it is applied
#[derive(Debug, Clone, Copy, Default)]
struct Deferred {
    color_brightness: Option<f64>,
    white_brightness: Option<f64>,
}

/// Automotive light animation for a strip of `N` pixels
pub struct CarLight<const N: usize> {
    config: CarLightConfig,

    // Mode flags
    on: bool,
    braking: bool,
    emergency_braking: bool,

    // Targets
    color: Rgb,
    white_temperature: f64,
    normal_brightness: f64,
    white_brightness: f64,
    brightness: f64,
    deferred: Deferred,

    // Smoothing
    smoothing: bool,
    pending_smoothing: Option<bool>,

    // Timers
    emergency_brake: EmergencyBrake,
    blinker: Blinker,
    police: PoliceOverlay,

    // Filters and output
    sweep: RcFilter,
    sweep_position: f64,
    pixel_filters: [PixelFilter; N],
    pixels: [RgbCct; N],
}

impl<const N: usize> CarLight<N> {
    /// Create a light, powered off, with all filters at rest
    pub fn new(config: &CarLightConfig) -> Self {
        let base = rgbcct2hsvcct(config.color);
        let white_temperature = if base.temperature.is_nan() {
            DEFAULT_WHITE_TEMPERATURE
        } else {
            base.temperature
        };

        Self {
            config: *config,
            on: false,
            braking: false,
            emergency_braking: false,
            color: config.color.color,
            white_temperature,
            normal_brightness: config.normal_brightness,
            white_brightness: base.white,
            brightness: config.normal_brightness,
            deferred: Deferred::default(),
            smoothing: true,
            pending_smoothing: None,
            emergency_brake: EmergencyBrake::default(),
            blinker: Blinker::default(),
            police: PoliceOverlay::default(),
            sweep: RcFilter::new(config.step_time, config.sweep_filter),
            sweep_position: 0.0,
            pixel_filters: [PixelFilter::new(config.step_time, config.pixel_filter); N],
            pixels: [RgbCct::default(); N],
        }
    }

    /// Advance the animation by one tick and render the frame
    pub fn step(&mut self) -> &[RgbCct; N] {
        let step_time = self.config.step_time;

        let sweep_target = self.sweep_target();
        self.sweep_position = self.sweep.step(sweep_target);
        if self.is_sweep_settled() {
            self.apply_deferred();
        }

        self.blinker.advance(step_time, &self.config.blinker);
        self.police.advance(step_time);

        let base = rgb2hsv(self.color);

        if self.emergency_braking {
            self.brightness = self.emergency_brake.level(
                step_time,
                self.config.emergency_brake_frequency,
                self.normal_brightness,
                self.config.brake_brightness,
            );
        }

        let balance = max_white_brightness();
        let (lit_low, lit_high) = self.lit_bounds();
        let police_band = self.police.band(N);
        let blinker_bands = self.blinker.bands(N);
        let mut converged = true;

        for (index, (pixel, filter)) in self
            .pixels
            .iter_mut()
            .zip(self.pixel_filters.iter_mut())
            .enumerate()
        {
            #[allow(clippy::cast_precision_loss)]
            let position = index as f64;
            let lit = position < lit_low || position > lit_high;
            let (color_target, white_target) = if lit {
                (self.brightness, self.white_brightness)
            } else {
                (0.0, 0.0)
            };

            let color_filtered = filter.color.step(color_target);
            let white_filtered = filter.white.step(white_target);
            converged &= libm::fabs(color_filtered - color_target) < CONVERGENCE_EPSILON
                && libm::fabs(white_filtered - white_target) < CONVERGENCE_EPSILON;

            let (value, white) = if self.smoothing {
                (color_filtered, white_filtered)
            } else {
                (color_target, white_target)
            };

            let mut output = hsvcct2rgbcct(
                HsvCct::new(
                    Hsv::new(base.hue, base.sat, value),
                    self.white_temperature,
                    white,
                ),
                balance,
            );

            if police_band.is_some_and(|band| band.contains(index)) {
                output = RgbCct::from_rgb(BLUE);
            }
            if blinker_bands.contains(index) {
                output = RgbCct::from_rgb(AMBER);
            }

            *pixel = gamma_correct_rgbcct(output);
        }

        // Smoothing stays off while any brake is held
        let blocked = self.pending_smoothing == Some(true) && self.is_brake_held();
        if converged && !blocked {
            if let Some(smoothing) = self.pending_smoothing.take() {
                self.smoothing = smoothing;
            }
        }

        &self.pixels
    }

    /// Pixel `i` is lit when `i < low` or `i > high`
    #[allow(clippy::cast_precision_loss)]
    fn lit_bounds(&self) -> (f64, f64) {
        let position = self.sweep_position;
        (libm::floor(position), N as f64 - libm::ceil(position))
    }

    fn apply_deferred(&mut self) {
        if let Some(brightness) = self.deferred.color_brightness.take() {
            self.set_color_brightness(brightness);
        }
        if let Some(brightness) = self.deferred.white_brightness.take() {
            self.set_white_brightness(brightness);
        }
    }

    /// Target of the sweep filter
    #[allow(clippy::cast_precision_loss)]
    pub fn sweep_target(&self) -> f64 {
        if self.on { N as f64 / 2.0 + 1.0 } else { 0.0 }
    }

    /// Sweep within one pixel of its target
    pub fn is_sweep_settled(&self) -> bool {
        libm::fabs(self.sweep_position - self.sweep_target()) < 1.0
    }

    pub fn turn_on(&mut self) {
        #[cfg(feature = "esp32-log")]
        println!("[CarLight.turn_on]");
        self.on = true;
    }

    pub fn turn_off(&mut self) {
        #[cfg(feature = "esp32-log")]
        println!("[CarLight.turn_off]");
        self.on = false;
    }

    /// Jump to brake brightness with smoothing disabled
    pub fn turn_on_brake(&mut self) {
        #[cfg(feature = "esp32-log")]
        println!("[CarLight.turn_on_brake]");
        self.braking = true;
        self.brightness = self.config.brake_brightness;
        self.smoothing = false;
        self.pending_smoothing = None;
    }

    /// Restore normal brightness, smoothing resumes once the filters caught up
    pub fn turn_off_brake(&mut self) {
        #[cfg(feature = "esp32-log")]
        println!("[CarLight.turn_off_brake]");
        self.braking = false;
        if !self.emergency_braking {
            self.brightness = self.normal_brightness;
            self.pending_smoothing = Some(true);
        }
    }

    pub fn turn_on_emergency_brake(&mut self) {
        #[cfg(feature = "esp32-log")]
        println!("[CarLight.turn_on_emergency_brake]");
        self.emergency_braking = true;
        self.emergency_brake.reset();
        self.smoothing = false;
        self.pending_smoothing = None;
    }

    pub fn turn_off_emergency_brake(&mut self) {
        #[cfg(feature = "esp32-log")]
        println!("[CarLight.turn_off_emergency_brake] braking: {}", self.braking);
        self.emergency_braking = false;
        if self.braking {
            self.brightness = self.config.brake_brightness;
        } else {
            self.brightness = self.normal_brightness;
            self.pending_smoothing = Some(true);
        }
    }

    pub fn turn_on_left(&mut self) {
        self.activate_blinker(BlinkerMode::Left);
    }

    pub fn turn_on_right(&mut self) {
        self.activate_blinker(BlinkerMode::Right);
    }

    pub fn turn_on_hazard(&mut self) {
        self.activate_blinker(BlinkerMode::Hazard);
    }

    fn activate_blinker(&mut self, mode: BlinkerMode) {
        #[cfg(feature = "esp32-log")]
        println!("[CarLight.activate_blinker] {:?} -> {:?}", self.blinker.mode(), mode);
        self.blinker.activate(mode);
    }

    /// Let the running sweep finish, then switch the blinker off
    pub fn turn_off_blinker(&mut self) {
        #[cfg(feature = "esp32-log")]
        println!("[CarLight.turn_off_blinker] mode: {:?}", self.blinker.mode());
        self.blinker.deactivate();
    }

    pub fn turn_on_police(&mut self) {
        #[cfg(feature = "esp32-log")]
        println!("[CarLight.turn_on_police]");
        self.police.set_enabled(true);
    }

    pub fn turn_off_police(&mut self) {
        #[cfg(feature = "esp32-log")]
        println!("[CarLight.turn_off_police]");
        self.police.set_enabled(false);
    }

    /// Set the base color, only its hue and saturation are used
    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    /// Set the white color temperature in Kelvin
    pub fn set_white_temperature(&mut self, temperature: f64) {
        self.white_temperature = temperature;
    }

    /// Set the normal color brightness
    pub fn set_color_brightness(&mut self, brightness: f64) {
        self.normal_brightness = brightness;
        if !self.braking && !self.emergency_braking {
            self.brightness = brightness;
        }
    }

    /// Set the normal color brightness once the sweep has settled
    pub fn set_color_brightness_after(&mut self, brightness: f64) {
        self.deferred.color_brightness = Some(brightness);
    }

    pub fn set_white_brightness(&mut self, brightness: f64) {
        self.white_brightness = brightness;
    }

    /// Set the white brightness once the sweep has settled
    pub fn set_white_brightness_after(&mut self, brightness: f64) {
        self.deferred.white_brightness = Some(brightness);
    }

    /// Enable or disable per-pixel smoothing once the filters have converged
    ///
    /// An enable while braking is dropped; releasing the brake re-enables
    /// smoothing.
    pub fn set_smoothing(&mut self, enabled: bool) {
        if enabled && self.is_brake_held() {
            #[cfg(feature = "esp32-log")]
            println!("[CarLight.set_smoothing] ignored while braking");
            return;
        }
        self.pending_smoothing = Some(enabled);
    }

    const fn is_brake_held(&self) -> bool {
        self.braking || self.emergency_braking
    }

    /// Retune every pixel filter, history is kept
    pub fn set_filter_values(&mut self, parameters: RcParameters) {
        for filter in &mut self.pixel_filters {
            filter.color.reconfigure(parameters);
            filter.white.reconfigure(parameters);
        }
    }

    /// Seed the brightness history of every pixel filter
    pub fn set_initial_filter_values(&mut self, input: f64, output: f64) {
        for filter in &mut self.pixel_filters {
            filter.color.set_initial_values(input, output);
        }
    }

    /// Frame rendered by the last `step()`
    pub const fn pixels(&self) -> &[RgbCct; N] {
        &self.pixels
    }

    pub const fn is_on(&self) -> bool {
        self.on
    }

    pub const fn is_braking(&self) -> bool {
        self.braking
    }

    pub const fn is_emergency_braking(&self) -> bool {
        self.emergency_braking
    }

    pub const fn blinker_mode(&self) -> BlinkerMode {
        self.blinker.mode()
    }

    /// Fraction of the strip covered by the running turn-signal sweep
    pub const fn blinker_phase(&self) -> f64 {
        self.blinker.phase()
    }

    /// Blinker waits for the running sweep to finish before turning off
    pub const fn is_blinker_turning_off(&self) -> bool {
        self.blinker.is_turning_off()
    }

    pub const fn is_police_on(&self) -> bool {
        self.police.is_enabled()
    }

    /// Police strobe is in its lit half
    pub const fn police_on_phase(&self) -> bool {
        self.police.on_phase()
    }

    /// Police strobe is on its left side
    pub const fn police_left_phase(&self) -> bool {
        self.police.left_phase()
    }

    pub const fn sweep_position(&self) -> f64 {
        self.sweep_position
    }

    /// Color brightness currently targeted by the pixels
    pub const fn brightness(&self) -> f64 {
        self.brightness
    }

    /// Color brightness used outside of braking
    pub const fn normal_brightness(&self) -> f64 {
        self.normal_brightness
    }

    pub const fn white_brightness(&self) -> f64 {
        self.white_brightness
    }

    pub const fn white_temperature(&self) -> f64 {
        self.white_temperature
    }

    pub const fn color(&self) -> Rgb {
        self.color
    }

    pub const fn is_smoothing(&self) -> bool {
        self.smoothing
    }

    pub const fn config(&self) -> &CarLightConfig {
        &self.config
    }
}
