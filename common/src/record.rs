use core::fmt::{Display, Write};

use serde::{Deserialize, Serialize};

/// Represents one complete acquisition cycle's worth of output fields.
/// This is the only externally observable artifact of the rig besides
/// the startup banner.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct TunnelRecord {
    /// Derived airflow speed in m/s. Never negative.
    pub wind_speed_ms: f32,

    /// Derived air density in kg/m^3.
    pub air_density: f32,

    /// Calibrated force readings of the four load cells, in the order
    /// they are wired on the rig. Channels that were not ready this
    /// cycle contribute 0.0.
    pub loads: [f32; 4],

    /// Test-section temperature in degrees Celsius, or the failure
    /// sentinel when the thermal sensor did not answer.
    pub temperature_c: f32,
}

impl TunnelRecord {
    /// Header line emitted once at startup, naming the seven columns in
    /// the order `write_csv` produces them.
    pub const CSV_HEADER: &'static str =
        "WindSpeed(m/s),Density(kg/m^3),Load1,Load2,Load3,Load4,Temperature(C)";

    /// Write the record as one CSV row. Wind speed and loads carry two
    /// decimals, density three, temperature one.
    pub fn write_csv<W: Write>(&self, out: &mut W) -> core::fmt::Result {
        write!(
            out,
            "{:.2},{:.3},{:.2},{:.2},{:.2},{:.2},{:.1}",
            self.wind_speed_ms,
            self.air_density,
            self.loads[0],
            self.loads[1],
            self.loads[2],
            self.loads[3],
            self.temperature_c,
        )
    }
}

impl Display for TunnelRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "(TunnelRecord: v={:.2} m/s, rho={:.3} kg/m^3, loads=[{:.2}, {:.2}, {:.2}, {:.2}], t={:.1} degC)",
            self.wind_speed_ms,
            self.air_density,
            self.loads[0],
            self.loads[1],
            self.loads[2],
            self.loads[3],
            self.temperature_c,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_record() -> TunnelRecord {
        TunnelRecord {
            wind_speed_ms: 12.3456,
            air_density: 1.2249,
            loads: [0.5, -0.25, 1.0, 0.0],
            temperature_c: 21.57,
        }
    }

    #[test]
    fn test_csv_field_count_matches_header() {
        let mut row = String::new();
        example_record()
            .write_csv(&mut row)
            .expect("Failed to format record.");

        assert_eq!(row.split(',').count(), 7);
        assert_eq!(TunnelRecord::CSV_HEADER.split(',').count(), 7);
    }

    #[test]
    fn test_csv_precision() {
        let mut row = String::new();
        example_record()
            .write_csv(&mut row)
            .expect("Failed to format record.");

        assert_eq!(row, "12.35,1.225,0.50,-0.25,1.00,0.00,21.6");
    }

    #[test]
    fn test_csv_sentinel_temperature() {
        let mut record = example_record();
        record.temperature_c = -99.0;

        let mut row = String::new();
        record.write_csv(&mut row).expect("Failed to format record.");

        assert!(row.ends_with(",-99.0"));
    }
}
