use super::Filter;

/// Coefficients of a second-order IIR section
///
/// The difference equation is
/// `y = c2·x + c1·x₋₁ − d1·y₋₁ + c0·x₋₂ − d0·y₋₂`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IirCoefficients {
    pub c0: f64,
    pub c1: f64,
    pub c2: f64,
    pub d0: f64,
    pub d1: f64,
}

/// Generic second-order IIR filter with explicit history
#[derive(Debug, Clone, Copy)]
pub struct IirSecondOrder {
    coefficients: IirCoefficients,
    last_input: f64,
    last_output: f64,
    last_last_input: f64,
    last_last_output: f64,
}

impl IirSecondOrder {
    /// Create a filter with zeroed history
    pub const fn new(coefficients: IirCoefficients) -> Self {
        Self {
            coefficients,
            last_input: 0.0,
            last_output: 0.0,
            last_last_input: 0.0,
            last_last_output: 0.0,
        }
    }

    /// Seed all history slots with a known operating point
    pub fn set_initial_values(&mut self, input: f64, output: f64) {
        self.last_input = input;
        self.last_last_input = input;
        self.last_output = output;
        self.last_last_output = output;
    }

    /// Replace coefficients, history is left untouched
    pub fn set_coefficients(&mut self, coefficients: IirCoefficients) {
        self.coefficients = coefficients;
    }

    pub const fn coefficients(&self) -> IirCoefficients {
        self.coefficients
    }
}

impl Filter for IirSecondOrder {
    fn step(&mut self, input: f64) -> f64 {
        let IirCoefficients { c0, c1, c2, d0, d1 } = self.coefficients;
        let output = c2 * input + c1 * self.last_input - d1 * self.last_output
            + c0 * self.last_last_input
            - d0 * self.last_last_output;

        self.last_last_input = self.last_input;
        self.last_input = input;

        self.last_last_output = self.last_output;
        self.last_output = output;

        output
    }

    fn output(&self) -> f64 {
        self.last_output
    }
}
