//! Binary UDP command frames
//!
//! Every frame starts with a little-endian `u32` message id followed by a
//! `u8` channel and the message payload. All multi-byte fields are
//! little-endian and packed without padding.
//!
//! | id | payload after the channel byte |
//! |---|---|
//! | `0x100` | red, green, blue: `u16` (full scale `0xFFFF`) |
//! | `0x101` | color brightness: `f64` |
//! | `0x102` | red, green, blue: `u16`, raw: `u8` (bit 0) |
//! | `0x103` | smoothing enable: `u8` (bit 0) |
//! | `0x104` | [`FilterValuesRecord`] |
//! | `0x105` | [`FilterSeedRecord`] |
//! | `0x106` | white brightness: `f64` |
//! | `0x107` | white temperature in Kelvin: `f64` |
//! | `0x108` | power: `u8` (`1` = on) |
//! | `0x109` | max white brightness: `u8` (`1` = on) |

#[cfg(feature = "esp32-log")]
use esp_println::println;

use super::ProtocolError;
use crate::color::Rgb;
use crate::command::{Command, CommandSender, FilterSample};
use crate::filter::RcParameters;

pub const MSG_SET_COLOR: u32 = 0x100;
pub const MSG_SET_COLOR_BRIGHTNESS: u32 = 0x101;
pub const MSG_SET_VALUE: u32 = 0x102;
pub const MSG_SET_SMOOTHING: u32 = 0x103;
pub const MSG_SET_FILTER_VALUES: u32 = 0x104;
pub const MSG_SET_FILTER_VALUES_AND_SEED: u32 = 0x105;
pub const MSG_SET_WHITE_BRIGHTNESS: u32 = 0x106;
pub const MSG_SET_WHITE_TEMPERATURE: u32 = 0x107;
pub const MSG_SET_POWER: u32 = 0x108;
pub const MSG_SET_MAX_WHITE_BRIGHTNESS: u32 = 0x109;

const ID_LENGTH: usize = 4;
const COLOR_FULL_SCALE: f64 = 65_535.0;

/// Filter network layout: capacitance then resistance, both `f64`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterValuesRecord {
    /// Capacitance in farads
    pub capacitance: f64,
    /// Resistance in ohms
    pub resistance: f64,
}

impl FilterValuesRecord {
    pub const fn parameters(self) -> RcParameters {
        RcParameters::new(self.resistance, self.capacitance)
    }
}

/// Filter network followed by the seed sample: previous input `x1` then
/// previous output `y1`, both `f64`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSeedRecord {
    pub values: FilterValuesRecord,
    pub sample: FilterSample,
}

/// A decoded frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UdpFrame {
    /// Index of the addressed light
    pub channel: u8,
    pub command: Command,
}

/// Cursor over a frame payload
struct Payload<'a> {
    id: u32,
    bytes: &'a [u8],
}

impl<'a> Payload<'a> {
    const fn new(id: u32, bytes: &'a [u8]) -> Self {
        Self { id, bytes }
    }

    fn take<const LEN: usize>(&mut self) -> Result<[u8; LEN], ProtocolError> {
        let Some((head, rest)) = self.bytes.split_first_chunk::<LEN>() else {
            return Err(ProtocolError::Truncated { id: self.id });
        };
        self.bytes = rest;
        Ok(*head)
    }

    fn u8(&mut self) -> Result<u8, ProtocolError> {
        self.take::<1>().map(|[byte]| byte)
    }

    fn flag(&mut self) -> Result<bool, ProtocolError> {
        self.u8().map(|byte| byte & 0x01 != 0)
    }

    fn u16(&mut self) -> Result<u16, ProtocolError> {
        self.take().map(u16::from_le_bytes)
    }

    fn f64(&mut self) -> Result<f64, ProtocolError> {
        self.take().map(f64::from_le_bytes)
    }

    fn color(&mut self) -> Result<Rgb, ProtocolError> {
        let red = self.u16()?;
        let green = self.u16()?;
        let blue = self.u16()?;
        Ok(Rgb::new(
            f64::from(red) / COLOR_FULL_SCALE,
            f64::from(green) / COLOR_FULL_SCALE,
            f64::from(blue) / COLOR_FULL_SCALE,
        ))
    }

    fn filter_values(&mut self) -> Result<FilterValuesRecord, ProtocolError> {
        Ok(FilterValuesRecord {
            capacitance: self.f64()?,
            resistance: self.f64()?,
        })
    }

    fn filter_seed(&mut self) -> Result<FilterSeedRecord, ProtocolError> {
        let values = self.filter_values()?;
        let sample = FilterSample {
            input: self.f64()?,
            output: self.f64()?,
        };
        Ok(FilterSeedRecord { values, sample })
    }
}

/// Decode a single frame
pub fn decode(buffer: &[u8]) -> Result<UdpFrame, ProtocolError> {
    let Some((id, payload)) = buffer.split_first_chunk::<ID_LENGTH>() else {
        return Err(ProtocolError::TooShort { len: buffer.len() });
    };
    let id = u32::from_le_bytes(*id);
    if !(MSG_SET_COLOR..=MSG_SET_MAX_WHITE_BRIGHTNESS).contains(&id) {
        return Err(ProtocolError::UnknownId(id));
    }

    let mut payload = Payload::new(id, payload);
    let channel = payload.u8()?;

    let command = match id {
        MSG_SET_COLOR => Command::SetColor(payload.color()?),
        MSG_SET_COLOR_BRIGHTNESS => Command::SetColorBrightness {
            brightness: payload.f64()?,
            after_sweep: false,
        },
        MSG_SET_VALUE => {
            let _color = payload.color()?;
            let _raw = payload.flag()?;
            return Err(ProtocolError::Unimplemented(id));
        }
        MSG_SET_SMOOTHING => Command::SetSmoothing(payload.flag()?),
        MSG_SET_FILTER_VALUES => Command::SetFilterValues {
            parameters: payload.filter_values()?.parameters(),
            initial: None,
        },
        MSG_SET_FILTER_VALUES_AND_SEED => {
            let record = payload.filter_seed()?;
            Command::SetFilterValues {
                parameters: record.values.parameters(),
                initial: Some(record.sample),
            }
        }
        MSG_SET_WHITE_BRIGHTNESS => Command::SetWhiteBrightness {
            brightness: payload.f64()?,
            after_sweep: false,
        },
        MSG_SET_WHITE_TEMPERATURE => Command::SetWhiteTemperature(payload.f64()?),
        MSG_SET_POWER => Command::power(payload.u8()? == 1),
        MSG_SET_MAX_WHITE_BRIGHTNESS => Command::SetMaxWhiteBrightness(payload.u8()? == 1),
        _ => return Err(ProtocolError::UnknownId(id)),
    };

    Ok(UdpFrame { channel, command })
}

/// Routes UDP frames to the lights addressed by their channel byte
pub struct UdpProtocol<'a, const SIZE: usize> {
    lights: &'a [CommandSender<'a, SIZE>],
}

impl<'a, const SIZE: usize> UdpProtocol<'a, SIZE> {
    /// `lights[n]` receives the frames for channel `n`
    pub const fn new(lights: &'a [CommandSender<'a, SIZE>]) -> Self {
        Self { lights }
    }

    /// Decode a datagram and queue its command
    ///
    /// Invalid frames are logged and dropped.
    pub fn handle(&self, buffer: &[u8]) -> Result<(), ProtocolError> {
        let result = self.dispatch(buffer);
        #[cfg(feature = "esp32-log")]
        if let Err(err) = result {
            println!("[UdpProtocol.handle] dropped frame: {}", err);
        }
        result
    }

    fn dispatch(&self, buffer: &[u8]) -> Result<(), ProtocolError> {
        let frame = decode(buffer)?;
        let light = self
            .lights
            .get(usize::from(frame.channel))
            .ok_or(ProtocolError::UnknownChannel(frame.channel))?;

        #[cfg(feature = "esp32-log")]
        println!(
            "[UdpProtocol.handle] channel {} {:?}",
            frame.channel, frame.command
        );

        light
            .try_send(frame.command)
            .map_err(|_| ProtocolError::QueueFull)
    }
}
