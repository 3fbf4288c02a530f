use core::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use super::KELVIN_OFFSET;

/// Store physical unit value of a temperature in degrees Celsius.
///
/// The valid range covers everything the rig's thermal sensor can
/// physically report, including the failure sentinel.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, PartialOrd)]
pub struct Temperature {
    celsius: f32,
}

/// Represents errors in creating a Temperature.
#[derive(Debug, Error)]
pub enum TemperatureError {
    /// The value was below absolute zero and cannot represent a
    /// physical temperature.
    #[error("Temperature below absolute zero!")]
    BelowAbsoluteZero,

    /// The value was above anything the sensor hardware can produce.
    #[error("Temperature above sensor range!")]
    AboveSensorRange,
}

impl Temperature {
    /// Upper bound of the representable range. The digital sensor on the
    /// rig saturates well below this.
    pub const MAX_CELSIUS: f32 = 125.0;

    /// Construct a Temperature from degrees Celsius.
    /// Will return an error if the value is below absolute zero or above
    /// the sensor range.
    pub fn new(celsius: f32) -> Result<Self, TemperatureError> {
        if celsius < -KELVIN_OFFSET {
            return Err(TemperatureError::BelowAbsoluteZero);
        }
        if celsius > Self::MAX_CELSIUS {
            return Err(TemperatureError::AboveSensorRange);
        }
        Ok(Self { celsius })
    }

    /// Get the temperature in degrees Celsius.
    pub fn celsius(&self) -> f32 {
        self.celsius
    }

    /// Get the temperature in kelvin.
    pub fn kelvin(&self) -> f32 {
        self.celsius + KELVIN_OFFSET
    }
}

impl TryFrom<f32> for Temperature {
    type Error = TemperatureError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Temperature::new(value)
    }
}

impl Display for Temperature {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({} degC)", self.celsius())
    }
}

impl From<Temperature> for f32 {
    fn from(value: Temperature) -> f32 {
        value.celsius
    }
}
