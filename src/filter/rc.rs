use super::{Filter, IirCoefficients, IirSecondOrder};

/// Electrical parameters of the modelled RC network
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RcParameters {
    /// Resistance in ohms
    pub resistance: f64,
    /// Capacitance in farads
    pub capacitance: f64,
}

impl RcParameters {
    pub const fn new(resistance: f64, capacitance: f64) -> Self {
        Self {
            resistance,
            capacitance,
        }
    }

    /// Time constant τ = R·C in seconds
    pub fn time_constant(self) -> f64 {
        self.resistance * self.capacitance
    }
}

/// First-order RC low-pass
///
/// Bilinear transform of `1 / (1 + sτ)` at sample time `Δt`:
/// `c1 = c0 = Δt/(Δt+2τ)`, `d0 = (Δt−2τ)/(Δt+2τ)`, `c2 = d1 = 0`.
/// Requires `Δt + 2τ ≠ 0`.
#[derive(Debug, Clone, Copy)]
pub struct RcFilter {
    step_time: f64,
    parameters: RcParameters,
    inner: IirSecondOrder,
}

impl RcFilter {
    /// Create a low-pass for sample time `step_time` (seconds)
    pub fn new(step_time: f64, parameters: RcParameters) -> Self {
        Self {
            step_time,
            parameters,
            inner: IirSecondOrder::new(Self::coefficients(step_time, parameters)),
        }
    }

    /// Compute the discrete coefficients for the given network
    pub fn coefficients(step_time: f64, parameters: RcParameters) -> IirCoefficients {
        let two_tau = 2.0 * parameters.time_constant();
        let denominator = step_time + two_tau;
        let gain = step_time / denominator;
        IirCoefficients {
            c0: gain,
            c1: gain,
            c2: 0.0,
            d0: (step_time - two_tau) / denominator,
            d1: 0.0,
        }
    }

    /// Retune the network in place without touching the signal history
    pub fn reconfigure(&mut self, parameters: RcParameters) {
        self.parameters = parameters;
        self.inner
            .set_coefficients(Self::coefficients(self.step_time, parameters));
    }

    /// Jump to a known operating point without a startup ramp
    pub fn set_initial_values(&mut self, input: f64, output: f64) {
        self.inner.set_initial_values(input, output);
    }

    pub const fn parameters(&self) -> RcParameters {
        self.parameters
    }

    pub const fn step_time(&self) -> f64 {
        self.step_time
    }
}

impl Filter for RcFilter {
    #[inline]
    fn step(&mut self, input: f64) -> f64 {
        self.inner.step(input)
    }

    #[inline]
    fn output(&self) -> f64 {
        self.inner.output()
    }
}
