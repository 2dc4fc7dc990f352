//! Frame scheduling and timing utilities.
//!
//! Provides portable frame pacing without async/await or platform-specific timers.
//! The caller is responsible for sleeping/waiting between frames.

use embassy_time::{Duration, Instant};

use crate::color::{RgbCct, to_brg8, to_cwwwbrg8};
use crate::{OutputDriver, Renderer};

/// Default target frame rate (50 FPS).
pub const DEFAULT_FPS: u32 = 50;

/// Default frame duration based on target FPS.
pub const DEFAULT_FRAME_DURATION: Duration = Duration::from_millis(1000 / DEFAULT_FPS as u64);

/// Unchanged frames after which the strip is rewritten anyway.
pub const DEFAULT_REFRESH_INTERVAL: u32 = DEFAULT_FPS;

/// Wire layout of a packed pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// `0xBBRRGG`
    Brg,
    /// `0xCCWWBBRRGG`
    #[default]
    Cwwwbrg,
}

impl PixelFormat {
    /// Pack a pixel in this layout
    pub fn pack(self, pixel: &RgbCct) -> u64 {
        match self {
            Self::Brg => u64::from(to_brg8(pixel.color)),
            Self::Cwwwbrg => to_cwwwbrg8(*pixel),
        }
    }
}

/// Configuration for the frame scheduler
#[derive(Debug, Clone, Copy)]
pub struct FrameSchedulerConfig {
    pub frame_duration: Duration,
    pub refresh_interval: u32,
    pub format: PixelFormat,
}

impl Default for FrameSchedulerConfig {
    fn default() -> Self {
        Self {
            frame_duration: DEFAULT_FRAME_DURATION,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            format: PixelFormat::default(),
        }
    }
}

/// Result of a frame tick operation.
#[derive(Debug, Clone, Copy)]
pub struct FrameResult {
    /// The deadline for the next frame.
    pub next_deadline: Instant,
    /// How long to wait until the next frame (may be zero if behind schedule).
    pub sleep_duration: Duration,
    /// Whether the frame was written to the driver.
    pub written: bool,
}

/// Portable frame scheduler that manages timing without async.
///
/// This scheduler:
/// - Tracks frame timing with drift correction
/// - Renders one light step per frame and packs the pixels
/// - Writes to the driver only when a pixel changed, or after
///   `refresh_interval` unchanged frames
///
/// # Usage
///
/// ```ignore
/// let mut scheduler = FrameScheduler::new(renderer, driver);
///
/// loop {
///     let now = get_current_time_ms();
///     let result = scheduler.tick(Instant::from_millis(now));
///
///     // Platform-specific sleep
///     sleep_ms(result.sleep_duration.as_millis() as u64);
/// }
/// ```
pub struct FrameScheduler<'a, O: OutputDriver, const N: usize, const COMMAND_CHANNEL_SIZE: usize> {
    output: O,
    renderer: Renderer<'a, N, COMMAND_CHANNEL_SIZE>,
    config: FrameSchedulerConfig,
    next_frame: Instant,
    packed: [u64; N],
    unchanged_frames: u32,
    first_frame: bool,
}

impl<'a, O: OutputDriver, const N: usize, const COMMAND_CHANNEL_SIZE: usize>
    FrameScheduler<'a, O, N, COMMAND_CHANNEL_SIZE>
{
    /// Create a new frame scheduler with the default configuration.
    pub fn new(renderer: Renderer<'a, N, COMMAND_CHANNEL_SIZE>, driver: O) -> Self {
        Self::with_config(renderer, driver, FrameSchedulerConfig::default())
    }

    /// Create a new frame scheduler with custom timing and pixel format.
    pub fn with_config(
        renderer: Renderer<'a, N, COMMAND_CHANNEL_SIZE>,
        driver: O,
        config: FrameSchedulerConfig,
    ) -> Self {
        Self {
            output: driver,
            renderer,
            config,
            next_frame: Instant::from_millis(0),
            packed: [0; N],
            unchanged_frames: 0,
            first_frame: true,
        }
    }

    /// Process one frame and return timing information.
    ///
    /// This method:
    /// 1. Applies drift correction if we've fallen too far behind
    /// 2. Renders the current frame
    /// 3. Writes to the output driver if anything changed
    /// 4. Returns the deadline for the next frame
    pub fn tick(&mut self, now: Instant) -> FrameResult {
        // Drift correction: if we've fallen too far behind, reset to now
        let max_drift = self.config.frame_duration.as_millis() * 2;
        if now.as_millis() > self.next_frame.as_millis() + max_drift {
            self.next_frame = now;
        }

        let format = self.config.format;
        let frame = self.renderer.render();
        let mut changed = self.first_frame;
        for (packed, pixel) in self.packed.iter_mut().zip(frame.iter()) {
            let word = format.pack(pixel);
            changed |= *packed != word;
            *packed = word;
        }

        let written = changed || self.unchanged_frames > self.config.refresh_interval;
        if written {
            self.output.write(&self.packed);
            self.unchanged_frames = 0;
            self.first_frame = false;
        } else {
            self.unchanged_frames += 1;
        }

        self.next_frame += self.config.frame_duration;

        let sleep_duration = if self.next_frame.as_millis() > now.as_millis() {
            Duration::from_millis(self.next_frame.as_millis() - now.as_millis())
        } else {
            Duration::from_millis(0)
        };

        FrameResult {
            next_deadline: self.next_frame,
            sleep_duration,
            written,
        }
    }

    /// Last packed frame.
    pub fn packed(&self) -> &[u64; N] {
        &self.packed
    }

    /// Get a reference to the renderer.
    pub fn renderer(&self) -> &Renderer<'a, N, COMMAND_CHANNEL_SIZE> {
        &self.renderer
    }

    /// Get a mutable reference to the renderer.
    pub fn renderer_mut(&mut self) -> &mut Renderer<'a, N, COMMAND_CHANNEL_SIZE> {
        &mut self.renderer
    }

    /// Get a reference to the output driver.
    pub fn output(&self) -> &O {
        &self.output
    }
}
