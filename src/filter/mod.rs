//! Discrete-time smoothing filters
//!
//! Both the sweep position and the per-pixel brightness are smoothed by a
//! first-order RC low-pass, discretized with the bilinear transform and kept
//! in the general second-order IIR form.

mod iir;
mod rc;

pub use iir::{IirCoefficients, IirSecondOrder};
pub use rc::{RcFilter, RcParameters};

/// A filter that consumes one sample per tick
pub trait Filter {
    /// Feed one input sample and return the filtered output
    fn step(&mut self, input: f64) -> f64;

    /// Last produced output
    fn output(&self) -> f64;
}
