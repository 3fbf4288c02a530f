//! Host-side stand-ins for the rig hardware. Each adapter implements the
//! same port the real part would, so the acquisition core runs unchanged.

use std::convert::Infallible;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};

use daq_core::application::WEIGHT_CHANNEL_COUNT;
use daq_core::ports::{PitotAdc, StreamPort, ThermalFault, ThermalProbe};
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::{InputPin, OutputPin};

use common::physical::Temperature;
use rand::Rng;
use tokio::sync::broadcast::Sender;
use tracing::warn;

/// Behavioral model of one bridge amplifier's serial interface: data
/// line low while a conversion is ready, frame bits shifted MSB-first
/// on clock pulses, 25th pulse ends the frame.
pub struct BridgeState {
    pub counts: i32,
    pub ready: bool,
    pulse: u8,
    bit: bool,
    in_frame: bool,
}

impl BridgeState {
    pub fn new() -> Self {
        Self {
            counts: 0,
            ready: true,
            pulse: 0,
            bit: false,
            in_frame: false,
        }
    }

    fn clock_high(&mut self) {
        self.in_frame = true;
        if self.pulse < 24 {
            let frame = (self.counts as u32) & 0x00FF_FFFF;
            self.bit = frame >> (23 - self.pulse) & 1 == 1;
        }
    }

    fn clock_low(&mut self) {
        self.pulse += 1;
        if self.pulse >= 25 {
            self.pulse = 0;
            self.in_frame = false;
        }
    }

    fn data_is_high(&self) -> bool {
        if self.in_frame {
            self.bit
        } else {
            !self.ready
        }
    }
}

impl Default for BridgeState {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedBridge = Arc<Mutex<BridgeState>>;

/// Data line of one simulated bridge amplifier.
pub struct SimBridgeData(pub SharedBridge);

/// Clock line of one simulated bridge amplifier.
pub struct SimBridgeClock(pub SharedBridge);

impl InputPin for SimBridgeData {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        let state = self.0.lock().unwrap_or_else(|e| e.into_inner());
        Ok(state.data_is_high())
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        let state = self.0.lock().unwrap_or_else(|e| e.into_inner());
        Ok(!state.data_is_high())
    }
}

impl OutputPin for SimBridgeClock {
    type Error = Infallible;

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clock_high();
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clock_low();
        Ok(())
    }
}

/// Simulated analog front end for the pitot channel. The signal service
/// stores the current raw counts; reads never fail.
pub struct SimPitotAdc {
    pub raw: Arc<AtomicU16>,
}

impl PitotAdc for SimPitotAdc {
    fn read_pitot_raw(&mut self) -> Option<u16> {
        Some(self.raw.load(Ordering::Relaxed))
    }
}

/// Simulated digital thermal sensor with a small injected fault rate to
/// exercise the sentinel path end to end.
pub struct SimThermalProbe {
    celsius: Arc<Mutex<f32>>,
    fault_rate: f64,
}

impl SimThermalProbe {
    pub fn new(celsius: Arc<Mutex<f32>>, fault_rate: f64) -> Self {
        Self {
            celsius,
            fault_rate,
        }
    }
}

impl ThermalProbe for SimThermalProbe {
    fn read_temperature(&mut self) -> Result<Temperature, ThermalFault> {
        if rand::thread_rng().gen_bool(self.fault_rate) {
            return Err(ThermalFault::Timeout);
        }

        let celsius = *self.celsius.lock().unwrap_or_else(|e| e.into_inner());
        Temperature::new(celsius).map_err(|_| ThermalFault::InvalidFrame)
    }
}

/// Forwards emitted stream lines into a broadcast queue for the output
/// task. Lines keep their emission order; a send failure means no
/// receiver is left, which is only worth a warning.
pub struct BroadcastStreamPort {
    pub tx_lines: Sender<String>,
}

impl StreamPort for BroadcastStreamPort {
    fn emit_line(&mut self, line: &str) {
        if let Err(e) = self.tx_lines.send(line.to_string()) {
            warn!("Failed to queue stream line. Error: {}", e);
        }
    }
}

/// Delay provider for simulated hardware. The tokio scheduler owns real
/// pacing, so settle delays collapse to nothing here.
pub struct SimDelay;

impl DelayMs<u16> for SimDelay {
    fn delay_ms(&mut self, _ms: u16) {}
}

/// Shared write handles the signal service uses to steer the rig.
pub struct SimRigHandles {
    pub bridges: [SharedBridge; WEIGHT_CHANNEL_COUNT],
    pub pitot_raw: Arc<AtomicU16>,
    pub thermal_c: Arc<Mutex<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use daq_core::weight::WeightChannel;

    #[test]
    fn test_simulated_bridge_round_trip() {
        let state = Arc::new(Mutex::new(BridgeState::new()));
        state.lock().expect("Failed to lock bridge.").counts = -1234;

        let mut channel =
            WeightChannel::new(SimBridgeData(state.clone()), SimBridgeClock(state.clone()), 1.0);

        assert!(channel.is_ready());
        let units = channel.read_units().expect("Failed to read units.");
        assert_eq!(units, -1234f32);
    }

    #[test]
    fn test_unready_bridge_reports_not_ready() {
        let state = Arc::new(Mutex::new(BridgeState::new()));
        state.lock().expect("Failed to lock bridge.").ready = false;

        let channel =
            WeightChannel::new(SimBridgeData(state.clone()), SimBridgeClock(state), 1.0);

        assert!(!channel.is_ready());
    }
}
