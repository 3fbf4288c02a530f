use common::physical::FALLBACK_TEMPERATURE_C;
use common::record::TunnelRecord;
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::{InputPin, OutputPin};
use heapless::String;

use crate::aero::{air_density, wind_speed, AeroConstants};
use crate::pitot::{
    clamp_dynamic_pressure, raw_to_voltage, voltage_to_pascals, PitotConfig, PressureBaseline,
};
use crate::ports::{PitotAdc, StreamPort, ThermalFault, ThermalProbe};
use crate::weight::WeightChannel;
use crate::AcquisitionError;

/// Number of balance channels on the rig.
pub const WEIGHT_CHANNEL_COUNT: usize = 4;

/// Human-readable banner emitted before the CSV header at startup.
pub const STARTUP_BANNER: [&str; 2] = [
    "Wind tunnel acquisition rig",
    "Taring balance channels, keep the test section clear.",
];

/// Immutable process-wide configuration. Passed in once at construction
/// so the conversion and derivation stages stay pure functions of their
/// inputs.
#[derive(Debug, Clone, Copy)]
pub struct DaqConfig {
    pub pitot: PitotConfig,
    pub aero: AeroConstants,

    /// Amplifier counts per calibrated output unit, applied uniformly
    /// to all balance channels.
    pub load_scale: f32,

    /// Conversions averaged when taring a balance channel.
    pub tare_samples: u8,

    /// Idle time between finishing initialization and the first cycle.
    pub settle_ms: u16,

    /// Inter-cycle idle; sets the sampling cadence of the whole rig.
    pub cycle_interval_ms: u16,
}

impl Default for DaqConfig {
    fn default() -> Self {
        Self {
            pitot: PitotConfig::default(),
            aero: AeroConstants::default(),
            load_scale: 2280.0,
            tare_samples: 10,
            settle_ms: 2000,
            cycle_interval_ms: 250,
        }
    }
}

/// The two states of the acquisition loop. Initializing is entered once
/// at power-up and left unconditionally; Running never exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Initializing,
    Running,
}

/// The acquisition orchestrator: polls every channel once per cycle,
/// runs the derivation, and emits exactly one CSV line per cycle.
/// Owns all channel state for the life of the process.
pub struct Application<Dout, Sck, PAdc, Probe, Port, D>
where
    Dout: InputPin,
    Sck: OutputPin,
    PAdc: PitotAdc,
    Probe: ThermalProbe,
    Port: StreamPort,
    D: DelayMs<u16>,
{
    channels: [WeightChannel<Dout, Sck>; WEIGHT_CHANNEL_COUNT],
    padc: PAdc,
    probe: Probe,
    port: Port,
    delay: D,
    config: DaqConfig,
    baseline: PressureBaseline,
    state: LoopState,
}

impl<Dout, Sck, PAdc, Probe, Port, D> Application<Dout, Sck, PAdc, Probe, Port, D>
where
    Dout: InputPin,
    Sck: OutputPin,
    PAdc: PitotAdc,
    Probe: ThermalProbe,
    Port: StreamPort,
    D: DelayMs<u16>,
{
    /// Bind the four balance channel line pairs and the remaining
    /// hardware ports. Binding always succeeds; hardware that never
    /// answers shows up as all-zero/fallback fields, not as an error.
    pub fn new(
        lines: [(Dout, Sck); WEIGHT_CHANNEL_COUNT],
        padc: PAdc,
        probe: Probe,
        port: Port,
        delay: D,
        config: DaqConfig,
    ) -> Self {
        Self {
            channels: lines.map(|(dout, sck)| WeightChannel::new(dout, sck, config.load_scale)),
            padc,
            probe,
            port,
            delay,
            config,
            baseline: PressureBaseline::new(),
            state: LoopState::Initializing,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn config(&self) -> &DaqConfig {
        &self.config
    }

    /// One-time startup sequence: banner, tare of every balance
    /// channel, CSV header, settle delay. Transitions unconditionally
    /// to Running.
    pub fn initialize(&mut self) {
        self.state = LoopState::Initializing;

        for line in STARTUP_BANNER {
            self.port.emit_line(line);
        }

        for channel in self.channels.iter_mut() {
            channel.tare(&mut self.delay, self.config.tare_samples);
        }

        self.port.emit_line(TunnelRecord::CSV_HEADER);
        self.delay.delay_ms(self.config.settle_ms);

        self.state = LoopState::Running;
    }

    /// One acquisition cycle: poll all channels, derive, emit one CSV
    /// line. Every field of the returned record comes from reads taken
    /// inside this call. Never fails; per-channel trouble degrades the
    /// affected field for this cycle only.
    pub fn run_cycle(&mut self) -> TunnelRecord {
        let mut loads = [0f32; WEIGHT_CHANNEL_COUNT];
        for (slot, channel) in loads.iter_mut().zip(self.channels.iter_mut()) {
            // An unready bridge contributes zero this cycle rather than
            // a stale frame.
            if channel.is_ready() {
                if let Some(units) = channel.read_units() {
                    *slot = units;
                }
            }
        }

        let dynamic_pressure = match self.sample_dynamic_pressure() {
            Ok(pascals) => pascals,
            Err(_) => 0.0,
        };

        let temperature_c = match self.probe.read_temperature() {
            Ok(temperature) => temperature.celsius(),
            Err(fault) => {
                self.emit_thermal_notice(fault);
                FALLBACK_TEMPERATURE_C
            }
        };

        let density = air_density(dynamic_pressure, temperature_c, &self.config.aero);
        let record = TunnelRecord {
            wind_speed_ms: wind_speed(dynamic_pressure, density),
            air_density: density,
            loads,
            temperature_c,
        };

        // Formatting cannot realistically overflow the buffer; if it
        // ever does, the cycle is dropped from the stream but the loop
        // carries on.
        let _ = self.emit_record(&record);
        record
    }

    /// Sample the pitot channel and run the conversion pipeline.
    /// The baseline is only consulted when a conversion exists, so a
    /// dead converter cannot pollute the zero reference.
    fn sample_dynamic_pressure(&mut self) -> Result<f32, AcquisitionError> {
        let raw = self
            .padc
            .read_pitot_raw()
            .ok_or(AcquisitionError::PitotReadFailure)?;

        let voltage = raw_to_voltage(raw, &self.config.pitot);
        let pressure_pa = voltage_to_pascals(voltage, &self.config.pitot);
        let corrected = self.baseline.apply(pressure_pa);

        Ok(clamp_dynamic_pressure(corrected))
    }

    fn emit_record(&mut self, record: &TunnelRecord) -> Result<(), AcquisitionError> {
        use core::fmt::Write;

        let mut line: String<96> = String::new();
        record
            .write_csv(&mut line)
            .map_err(|_| AcquisitionError::LineOverflow)?;

        self.port.emit_line(line.as_str());
        Ok(())
    }

    /// Diagnostic notice for a failed thermal read. Free text on the
    /// same stream; readers filter non-CSV lines.
    fn emit_thermal_notice(&mut self, fault: ThermalFault) {
        use core::fmt::Write;

        let mut line: String<96> = String::new();
        match write!(
            line,
            "thermal probe fault: {} Falling back to {:.1} degC.",
            fault, FALLBACK_TEMPERATURE_C
        ) {
            Ok(()) => self.port.emit_line(line.as_str()),
            Err(_) => self.port.emit_line("thermal probe fault"),
        }
    }
}
