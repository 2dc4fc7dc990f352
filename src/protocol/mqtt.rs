//! MQTT topic and JSON payload decoding
//!
//! Topics have the form `LED/<device>/<command>`; the payload is a JSON
//! object whose fields depend on the command.

use heapless::{String, Vec};
use serde::Deserialize;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use super::ProtocolError;
use crate::color::Rgb;
use crate::command::{Command, CommandSender, FilterSample};
use crate::filter::RcParameters;

pub const TOPIC_PREFIX: &str = "LED/";
/// Maximum length of a device name
pub const DEVICE_NAME_LENGTH: usize = 32;
/// Maximum length of a subscription filter
pub const TOPIC_FILTER_LENGTH: usize = DEVICE_NAME_LENGTH + 8;

const COMMAND_COLOR: &str = "color";
const COMMAND_COLOR_DIM: &str = "colorDim";
const COMMAND_WHITE_DIM: &str = "whiteDim";
const COMMAND_WHITE_TEMP: &str = "whiteTemp";
const COMMAND_MAX_WHITE_BRIGHTNESS: &str = "maxWhiteBrightness";
const COMMAND_FILTER_VALUES: &str = "filterValues";
const COMMAND_FILTER_VALUES_AND_DELAYED: &str = "filterValuesAndDelayed";
const COMMAND_POWER_STATE: &str = "powerState";

/// Full scale of the color fields
const COLOR_FULL_SCALE: f64 = 65_280.0;

#[derive(Deserialize)]
struct ColorPayload {
    red: f64,
    green: f64,
    blue: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColorDimPayload {
    color_dim: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WhiteDimPayload {
    white_dim: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WhiteTempPayload {
    white_temp: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaxWhiteBrightnessPayload {
    max_white_brightness: bool,
}

#[derive(Deserialize)]
struct FilterValuesPayload {
    capacitance: f64,
    impedance: f64,
}

#[derive(Deserialize)]
struct FilterValuesAndDelayedPayload {
    capacitance: f64,
    impedance: f64,
    x1: f64,
    y1: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PowerStatePayload {
    power_state: bool,
}

fn parse<'de, T: Deserialize<'de>>(payload: &'de [u8]) -> Result<T, ProtocolError> {
    serde_json_core::from_slice(payload)
        .map(|(value, _)| value)
        .map_err(|_| ProtocolError::InvalidPayload)
}

/// Split `LED/<device>/<command>` into device and command
pub fn parse_topic(topic: &str) -> Result<(&str, &str), ProtocolError> {
    topic
        .strip_prefix(TOPIC_PREFIX)
        .and_then(|rest| rest.split_once('/'))
        .ok_or(ProtocolError::InvalidTopic)
}

/// Decode the JSON payload of a command
pub fn decode_command(command: &str, payload: &[u8]) -> Result<Command, ProtocolError> {
    let command = match command {
        COMMAND_COLOR => {
            let color: ColorPayload = parse(payload)?;
            Command::SetColor(Rgb::new(
                color.red / COLOR_FULL_SCALE,
                color.green / COLOR_FULL_SCALE,
                color.blue / COLOR_FULL_SCALE,
            ))
        }
        COMMAND_COLOR_DIM => Command::SetColorBrightness {
            brightness: parse::<ColorDimPayload>(payload)?.color_dim,
            after_sweep: false,
        },
        COMMAND_WHITE_DIM => Command::SetWhiteBrightness {
            brightness: parse::<WhiteDimPayload>(payload)?.white_dim,
            after_sweep: false,
        },
        COMMAND_WHITE_TEMP => {
            Command::SetWhiteTemperature(parse::<WhiteTempPayload>(payload)?.white_temp)
        }
        COMMAND_MAX_WHITE_BRIGHTNESS => Command::SetMaxWhiteBrightness(
            parse::<MaxWhiteBrightnessPayload>(payload)?.max_white_brightness,
        ),
        COMMAND_FILTER_VALUES => {
            let values: FilterValuesPayload = parse(payload)?;
            Command::SetFilterValues {
                parameters: RcParameters::new(values.impedance, values.capacitance),
                initial: None,
            }
        }
        COMMAND_FILTER_VALUES_AND_DELAYED => {
            let values: FilterValuesAndDelayedPayload = parse(payload)?;
            Command::SetFilterValues {
                parameters: RcParameters::new(values.impedance, values.capacitance),
                initial: Some(FilterSample {
                    input: values.x1,
                    output: values.y1,
                }),
            }
        }
        COMMAND_POWER_STATE => Command::power(parse::<PowerStatePayload>(payload)?.power_state),
        _ => return Err(ProtocolError::UnknownCommand),
    };
    Ok(command)
}

struct Device<'a, const SIZE: usize> {
    name: String<DEVICE_NAME_LENGTH>,
    light: CommandSender<'a, SIZE>,
}

/// Routes MQTT messages to the lights registered by device name
pub struct MqttProtocol<'a, const SIZE: usize, const DEVICES: usize> {
    devices: Vec<Device<'a, SIZE>, DEVICES>,
}

impl<'a, const SIZE: usize, const DEVICES: usize> MqttProtocol<'a, SIZE, DEVICES> {
    pub const fn new() -> Self {
        Self {
            devices: Vec::new(),
        }
    }

    /// Register a light under `name`
    pub fn add_device(
        &mut self,
        name: &str,
        light: CommandSender<'a, SIZE>,
    ) -> Result<(), ProtocolError> {
        let name = String::try_from(name).map_err(|()| ProtocolError::DeviceTableFull)?;
        self.devices
            .push(Device { name, light })
            .map_err(|_| ProtocolError::DeviceTableFull)
    }

    /// Topic filters to subscribe to, one per registered device
    pub fn subscriptions(&self) -> impl Iterator<Item = String<TOPIC_FILTER_LENGTH>> + '_ {
        self.devices.iter().map(|device| {
            let mut topic = String::new();
            // Capacity covers prefix, the longest name and the wildcard
            let _ = topic.push_str(TOPIC_PREFIX);
            let _ = topic.push_str(&device.name);
            let _ = topic.push_str("/#");
            topic
        })
    }

    /// Decode a message and queue its command
    ///
    /// Invalid messages are logged and dropped.
    pub fn handle(&self, topic: &str, payload: &[u8]) -> Result<(), ProtocolError> {
        let result = self.dispatch(topic, payload);
        #[cfg(feature = "esp32-log")]
        if let Err(err) = result {
            println!("[MqttProtocol.handle] dropped message on {}: {}", topic, err);
        }
        result
    }

    fn dispatch(&self, topic: &str, payload: &[u8]) -> Result<(), ProtocolError> {
        let (name, command) = parse_topic(topic)?;
        let device = self
            .devices
            .iter()
            .find(|device| device.name.as_str() == name)
            .ok_or(ProtocolError::UnknownDevice)?;
        let command = decode_command(command, payload)?;

        #[cfg(feature = "esp32-log")]
        println!("[MqttProtocol.handle] {} {:?}", name, command);

        device
            .light
            .try_send(command)
            .map_err(|_| ProtocolError::QueueFull)
    }
}

impl<const SIZE: usize, const DEVICES: usize> Default for MqttProtocol<'_, SIZE, DEVICES> {
    fn default() -> Self {
        Self::new()
    }
}
