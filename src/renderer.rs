use crate::color::RgbCct;
use crate::command::{CommandProcessor, CommandReceiver};
use crate::engine::{CarLight, CarLightConfig};

/// Single writer of a car light
///
/// Owns the light and the receiving end of its command queue. Commands are
/// only applied at the start of [`Renderer::render`], so the engine state is
/// never mutated concurrently with a step.
pub struct Renderer<'a, const N: usize, const COMMAND_CHANNEL_SIZE: usize> {
    commands: CommandProcessor<'a, COMMAND_CHANNEL_SIZE>,
    light: CarLight<N>,
}

impl<'a, const N: usize, const COMMAND_CHANNEL_SIZE: usize> Renderer<'a, N, COMMAND_CHANNEL_SIZE> {
    /// Create a renderer for a new light
    pub fn new(commands: CommandReceiver<'a, COMMAND_CHANNEL_SIZE>, config: &CarLightConfig) -> Self {
        Self::with_light(commands, CarLight::new(config))
    }

    /// Create a renderer around an existing light
    pub const fn with_light(
        commands: CommandReceiver<'a, COMMAND_CHANNEL_SIZE>,
        light: CarLight<N>,
    ) -> Self {
        Self {
            commands: CommandProcessor::new(commands),
            light,
        }
    }

    /// Process one frame
    ///
    /// Applies every queued command, then steps the light once.
    pub fn render(&mut self) -> &[RgbCct; N] {
        self.commands.process_pending(&mut self.light);
        self.light.step()
    }

    /// Frame rendered by the last call to `render`
    pub const fn pixels(&self) -> &[RgbCct; N] {
        self.light.pixels()
    }

    pub const fn light(&self) -> &CarLight<N> {
        &self.light
    }

    pub fn light_mut(&mut self) -> &mut CarLight<N> {
        &mut self.light
    }
}
