#![no_std]

pub mod color;
pub mod command;
pub mod engine;
pub mod filter;
pub mod frame_scheduler;
pub mod gamma;
pub mod protocol;
pub mod renderer;

pub use color::{Hsv, HsvCct, Rgb, RgbCct};
pub use command::{Command, CommandChannel, CommandProcessor, CommandReceiver, CommandSender};
pub use engine::{BlinkerMode, CarLight, CarLightConfig};
pub use filter::{Filter, IirSecondOrder, RcFilter, RcParameters};
pub use frame_scheduler::{FrameScheduler, FrameSchedulerConfig, PixelFormat};
pub use protocol::{MqttProtocol, ProtocolError, UdpProtocol};
pub use renderer::Renderer;
pub use embassy_time::{Duration, Instant};

/// Abstract LED driver trait
///
/// Implement this trait to support different hardware platforms.
/// Receives one packed word per pixel in the layout chosen by
/// [`PixelFormat`].
pub trait OutputDriver {
    /// Write packed pixels to the LED strip
    fn write(&mut self, pixels: &[u64]);
}
