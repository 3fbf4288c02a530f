//! Conversion pipeline from raw pitot converter counts to a dynamic
//! pressure, including the one-shot zero baseline.

/// Electrical parameters of the differential-pressure channel.
#[derive(Debug, Clone, Copy)]
pub struct PitotConfig {
    /// Highest count the converter can report.
    pub adc_max: u16,

    /// Converter reference / sensor supply in volts.
    pub supply_voltage: f32,

    /// Differential span of the sensor in kilopascals.
    pub full_scale_kpa: f32,

    /// Sensor output at zero differential pressure, in volts.
    pub zero_offset_v: f32,
}

impl Default for PitotConfig {
    fn default() -> Self {
        Self {
            adc_max: 1023,
            supply_voltage: 5.0,
            full_scale_kpa: 2.0,
            zero_offset_v: 0.5,
        }
    }
}

/// Convert raw converter counts to the sampled voltage.
/// One sample, no averaging or filtering. Smoothing the channel is a
/// candidate improvement, not a defect.
pub fn raw_to_voltage(raw: u16, config: &PitotConfig) -> f32 {
    raw as f32 / config.adc_max as f32 * config.supply_voltage
}

/// Convert a sampled voltage to a pressure differential in pascals.
/// The sensor's transfer function is linear between the zero offset and
/// the supply rail minus the same offset.
pub fn voltage_to_pascals(voltage: f32, config: &PitotConfig) -> f32 {
    (voltage - config.zero_offset_v)
        * (config.full_scale_kpa / (config.supply_voltage - 2.0 * config.zero_offset_v))
        * 1000.0
}

/// Zero reference for the pressure channel, captured once per power-up
/// from the first non-zero conversion and immutable afterwards.
///
/// A reference of exactly 0.0 doubles as "not yet captured", so capture
/// is retried until a non-zero conversion arrives. A legitimate all-zero
/// reading is indistinguishable from an uncaptured reference in this
/// scheme; known quirk, kept as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PressureBaseline {
    reference_pa: f32,
}

impl PressureBaseline {
    pub const fn new() -> Self {
        Self { reference_pa: 0.0 }
    }

    pub fn is_captured(&self) -> bool {
        self.reference_pa != 0.0
    }

    /// Correct one conversion against the reference, capturing the
    /// reference first if it is still unset. The capture cycle itself
    /// therefore reports zero corrected pressure.
    pub fn apply(&mut self, pressure_pa: f32) -> f32 {
        if !self.is_captured() && pressure_pa != 0.0 {
            self.reference_pa = pressure_pa;
        }
        pressure_pa - self.reference_pa
    }
}

/// Clamp a baseline-corrected pressure to the domain of the derivation
/// formulas. Negative excursions (sensor noise, reversed flow) read as
/// zero dynamic pressure.
pub fn clamp_dynamic_pressure(corrected_pa: f32) -> f32 {
    if corrected_pa > 0.0 {
        corrected_pa
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uncorrected_pascals(raw: u16, config: &PitotConfig) -> f32 {
        voltage_to_pascals(raw_to_voltage(raw, config), config)
    }

    #[test]
    fn test_conversion_monotonic_in_raw() {
        let config = PitotConfig::default();

        let mut previous = uncorrected_pascals(0, &config);
        for raw in 1..=config.adc_max {
            let current = uncorrected_pascals(raw, &config);
            assert!(
                current >= previous,
                "conversion not monotonic at raw={}",
                raw
            );
            previous = current;
        }
    }

    #[test]
    fn test_mid_scale_conversion() {
        // 512 counts on a 10-bit converter with a 5.0 V supply, 2 kPa
        // span and 0.5 V zero offset lands on ~1 kPa.
        let config = PitotConfig::default();
        let pascals = uncorrected_pascals(512, &config);

        assert!((pascals - 1000.0).abs() < 2.0, "got {} Pa", pascals);
    }

    #[test]
    fn test_baseline_captured_exactly_once() {
        let mut baseline = PressureBaseline::new();
        assert!(!baseline.is_captured());

        // Capture cycle reports zero corrected pressure.
        assert_eq!(baseline.apply(1000.25), 0.0);
        assert!(baseline.is_captured());

        // Unchanged input keeps reporting zero.
        assert_eq!(baseline.apply(1000.25), 0.0);

        // Later cycles are corrected against the first capture.
        let corrected = baseline.apply(1250.5);
        assert!((corrected - 250.25).abs() < 1e-3);
    }

    #[test]
    fn test_zero_reading_retries_capture() {
        let mut baseline = PressureBaseline::new();

        assert_eq!(baseline.apply(0.0), 0.0);
        assert!(!baseline.is_captured());

        assert_eq!(baseline.apply(800.0), 0.0);
        assert!(baseline.is_captured());
    }

    #[test]
    fn test_clamp_never_negative() {
        assert_eq!(clamp_dynamic_pressure(-125.5), 0.0);
        assert_eq!(clamp_dynamic_pressure(0.0), 0.0);
        assert_eq!(clamp_dynamic_pressure(42.0), 42.0);
    }
}
