//! Physical constants shared by the acquisition core and the host harness.

/// Offset between the Celsius and Kelvin scales.
pub const KELVIN_OFFSET: f32 = 273.15;

/// Standard atmospheric pressure at sea level in pascals.
/// The rig does not carry a barometer, so this is used as the static
/// pressure term in the density calculation and is never re-measured.
pub const ATMOSPHERIC_PRESSURE_PA: f32 = 101_325.0;

/// Specific gas constant for dry air in J/(kg*K).
pub const GAS_CONSTANT_DRY_AIR: f32 = 287.05;

/// Temperature reported when the thermal sensor fails to answer.
/// Deliberately outside the plausible range of the test section so
/// stream consumers can detect the failure by range-checking alone.
pub const FALLBACK_TEMPERATURE_C: f32 = -99.0;
