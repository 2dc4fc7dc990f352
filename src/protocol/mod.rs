//! Command decoders for the network links
//!
//! Both decoders turn wire messages into [`Command`](crate::Command)s and
//! push them into the command queue of the addressed light. Malformed input
//! is logged and dropped; it never reaches the engine.

pub mod mqtt;
pub mod udp;

pub use mqtt::MqttProtocol;
pub use udp::UdpProtocol;

/// Reasons a network message is dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame shorter than the 4-byte message id
    TooShort { len: usize },
    /// Message id not known
    UnknownId(u32),
    /// Payload shorter than the message layout requires
    Truncated { id: u32 },
    /// Message is known but has no effect
    Unimplemented(u32),
    /// No light registered for the channel byte
    UnknownChannel(u8),
    /// Topic does not match `LED/<device>/<command>`
    InvalidTopic,
    /// No light registered under the device name
    UnknownDevice,
    /// Command segment of the topic not known
    UnknownCommand,
    /// JSON payload missing fields or malformed
    InvalidPayload,
    /// Device table has no free slot or the name is too long
    DeviceTableFull,
    /// Command queue of the light is full
    QueueFull,
}

impl core::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TooShort { len } => write!(f, "message too short ({len} bytes)"),
            Self::UnknownId(id) => write!(f, "unknown message id {id:#x}"),
            Self::Truncated { id } => write!(f, "truncated payload for message {id:#x}"),
            Self::Unimplemented(id) => write!(f, "message {id:#x} is not implemented"),
            Self::UnknownChannel(channel) => write!(f, "no light on channel {channel}"),
            Self::InvalidTopic => write!(f, "invalid topic"),
            Self::UnknownDevice => write!(f, "unknown device"),
            Self::UnknownCommand => write!(f, "unknown command"),
            Self::InvalidPayload => write!(f, "invalid payload"),
            Self::DeviceTableFull => write!(f, "device table full"),
            Self::QueueFull => write!(f, "command queue full"),
        }
    }
}
