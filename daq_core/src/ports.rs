use common::physical::Temperature;
use thiserror_no_std::Error;

/// This trait allows separation of the analog front end for the
/// differential-pressure sensor from the conversion pipeline, which makes
/// the pipeline easier to unit test.
pub trait PitotAdc {
    /// Take one synchronous sample of the pitot channel.
    /// Returns raw converter counts, or `None` if the converter did not
    /// answer. No averaging or filtering is applied here.
    fn read_pitot_raw(&mut self) -> Option<u16>;
}

/// Represents the ways the digital thermal sensor can fail a read.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ThermalFault {
    /// The sensor did not answer within its protocol deadline.
    #[error("Thermal sensor timed out.")]
    Timeout,

    /// The sensor answered with a frame that failed validation.
    #[error("Thermal sensor returned a malformed frame.")]
    InvalidFrame,
}

/// This trait wraps the digital temperature/humidity sensor.
pub trait ThermalProbe {
    /// One blocking read of the sensor. Blocks until the underlying
    /// protocol completes or times out.
    fn read_temperature(&mut self) -> Result<Temperature, ThermalFault>;
}

/// Outbound line stream toward the external recorder.
/// Contract: write one line of text, reliably ordered, no acknowledgment.
/// The rig never reads from this stream.
pub trait StreamPort {
    fn emit_line(&mut self, line: &str);
}
