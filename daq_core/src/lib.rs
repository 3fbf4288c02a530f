#![cfg_attr(not(test), no_std)]

use thiserror_no_std::Error;

pub mod aero;
pub mod application;
pub mod pitot;
pub mod ports;
pub mod weight;

pub use application::{Application, DaqConfig, LoopState};

/// Represents errors raised inside one acquisition cycle. None of these
/// halt the loop; each degrades a single field for the current cycle.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionError {
    /// The pitot ADC did not produce a sample this cycle.
    #[error("Failed to read the pitot ADC.")]
    PitotReadFailure,

    /// A formatted line did not fit the output buffer.
    #[error("Line exceeded the output buffer.")]
    LineOverflow,
}
