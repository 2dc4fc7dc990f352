//! Commands and the queue that carries them into the engine
//!
//! Network tasks never touch the engine directly. They push [`Command`]s
//! into a [`CommandChannel`]; the render loop drains it at the start of every
//! frame, so each command is applied atomically between two steps.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::color::{Rgb, set_max_white_brightness};
use crate::engine::CarLight;
use crate::filter::RcParameters;

/// Known operating point of a filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSample {
    /// Previous input
    pub input: f64,
    /// Previous output
    pub output: f64,
}

/// Operations that can be requested from a car light
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    TurnOn,
    TurnOff,
    TurnOnBrake,
    TurnOffBrake,
    TurnOnEmergencyBrake,
    TurnOffEmergencyBrake,
    TurnOnLeft,
    TurnOnRight,
    TurnOnHazard,
    TurnOffBlinker,
    TurnOnPolice,
    TurnOffPolice,
    /// Set the base color
    SetColor(Rgb),
    /// Set the white temperature in Kelvin
    SetWhiteTemperature(f64),
    /// Set the color brightness, immediately or once the sweep settled
    SetColorBrightness { brightness: f64, after_sweep: bool },
    /// Set the white brightness, immediately or once the sweep settled
    SetWhiteBrightness { brightness: f64, after_sweep: bool },
    /// Enable or disable per-pixel smoothing
    SetSmoothing(bool),
    /// Retune the pixel filters and optionally seed their history
    SetFilterValues {
        parameters: RcParameters,
        initial: Option<FilterSample>,
    },
    /// Switch the process-wide white balance
    SetMaxWhiteBrightness(bool),
}

impl Command {
    /// Apply the command to a light
    pub fn apply<const N: usize>(self, light: &mut CarLight<N>) {
        match self {
            Self::TurnOn => light.turn_on(),
            Self::TurnOff => light.turn_off(),
            Self::TurnOnBrake => light.turn_on_brake(),
            Self::TurnOffBrake => light.turn_off_brake(),
            Self::TurnOnEmergencyBrake => light.turn_on_emergency_brake(),
            Self::TurnOffEmergencyBrake => light.turn_off_emergency_brake(),
            Self::TurnOnLeft => light.turn_on_left(),
            Self::TurnOnRight => light.turn_on_right(),
            Self::TurnOnHazard => light.turn_on_hazard(),
            Self::TurnOffBlinker => light.turn_off_blinker(),
            Self::TurnOnPolice => light.turn_on_police(),
            Self::TurnOffPolice => light.turn_off_police(),
            Self::SetColor(color) => light.set_color(color),
            Self::SetWhiteTemperature(temperature) => light.set_white_temperature(temperature),
            Self::SetColorBrightness {
                brightness,
                after_sweep,
            } => {
                if after_sweep {
                    light.set_color_brightness_after(brightness);
                } else {
                    light.set_color_brightness(brightness);
                }
            }
            Self::SetWhiteBrightness {
                brightness,
                after_sweep,
            } => {
                if after_sweep {
                    light.set_white_brightness_after(brightness);
                } else {
                    light.set_white_brightness(brightness);
                }
            }
            Self::SetSmoothing(enabled) => light.set_smoothing(enabled),
            Self::SetFilterValues {
                parameters,
                initial,
            } => {
                light.set_filter_values(parameters);
                if let Some(sample) = initial {
                    light.set_initial_filter_values(sample.input, sample.output);
                }
            }
            Self::SetMaxWhiteBrightness(max) => set_max_white_brightness(max),
        }
    }

    /// Shorthand for a power command
    pub const fn power(on: bool) -> Self {
        if on { Self::TurnOn } else { Self::TurnOff }
    }
}

/// Type alias for command sender
pub type CommandSender<'a, const SIZE: usize> =
    Sender<'a, CriticalSectionRawMutex, Command, SIZE>;

/// Type alias for command receiver
pub type CommandReceiver<'a, const SIZE: usize> =
    Receiver<'a, CriticalSectionRawMutex, Command, SIZE>;

/// Type alias for the command channel
pub type CommandChannel<const SIZE: usize> = Channel<CriticalSectionRawMutex, Command, SIZE>;

/// Drains queued commands into a light
pub struct CommandProcessor<'a, const SIZE: usize> {
    commands: CommandReceiver<'a, SIZE>,
}

impl<'a, const SIZE: usize> CommandProcessor<'a, SIZE> {
    /// Create a new command processor
    pub const fn new(commands: CommandReceiver<'a, SIZE>) -> Self {
        Self { commands }
    }

    /// Apply all pending commands (non-blocking)
    ///
    /// Returns the number of commands applied.
    pub fn process_pending<const N: usize>(&mut self, light: &mut CarLight<N>) -> usize {
        let mut applied = 0;
        while let Ok(command) = self.commands.try_receive() {
            #[cfg(feature = "esp32-log")]
            println!("[CommandProcessor.process_pending] {:?}", command);
            command.apply(light);
            applied += 1;
        }
        applied
    }
}
