//! Aerodynamic derivation: dynamic pressure plus temperature in, air
//! density and wind speed out. Pure functions, no internal state.

use common::physical::{ATMOSPHERIC_PRESSURE_PA, GAS_CONSTANT_DRY_AIR, KELVIN_OFFSET};

/// Fixed atmosphere model inputs. Process-wide constants, never
/// re-measured while the rig runs.
#[derive(Debug, Clone, Copy)]
pub struct AeroConstants {
    pub atmospheric_pressure_pa: f32,
    pub gas_constant_dry_air: f32,
}

impl Default for AeroConstants {
    fn default() -> Self {
        Self {
            atmospheric_pressure_pa: ATMOSPHERIC_PRESSURE_PA,
            gas_constant_dry_air: GAS_CONSTANT_DRY_AIR,
        }
    }
}

/// Ideal-gas air density in kg/m^3 from the static pressure left after
/// removing the dynamic component, at the current temperature.
pub fn air_density(
    dynamic_pressure_pa: f32,
    temperature_c: f32,
    constants: &AeroConstants,
) -> f32 {
    (constants.atmospheric_pressure_pa - dynamic_pressure_pa)
        / (constants.gas_constant_dry_air * (temperature_c + KELVIN_OFFSET))
}

/// Incompressible-flow speed in m/s from dynamic pressure and density.
/// Valid for subsonic flow only; no compressibility correction.
/// A zero or negative density cannot feed the square root, so the speed
/// reads as zero rather than emitting a non-finite value downstream.
pub fn wind_speed(dynamic_pressure_pa: f32, air_density: f32) -> f32 {
    if air_density <= 0.0 {
        return 0.0;
    }
    let speed = libm::sqrtf(2.0 * dynamic_pressure_pa / air_density);
    if speed.is_finite() {
        speed
    } else {
        0.0
    }
}
