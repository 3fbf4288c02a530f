//! Signal generation for the simulated rig: a slow airflow sweep with
//! bridge and converter noise layered on top.

use std::f32::consts::TAU;
use std::sync::atomic::Ordering;

use daq_core::DaqConfig;
use rand::Rng;

use super::adapters::SimRigHandles;

/// Density assumed when translating the target airflow speed back into
/// a pitot voltage. Only the simulation uses this; the core derives its
/// own density from the stream it sees.
const NOMINAL_AIR_DENSITY: f32 = 1.2;

/// Load picked up by each balance channel per pascal of dynamic
/// pressure, in the rig's wiring order: front lift, front drag, back
/// lift, back drag.
const LOAD_GAINS: [f32; 4] = [0.85, 0.35, 0.80, 0.30];

/// Fraction of cycles on which a bridge reports a conversion in flight.
const BRIDGE_READY_RATE: f64 = 0.97;

/// This service owns the simulated physics of the tunnel so the task
/// driving the acquisition loop stays free of signal math.
pub struct RigSignalService {
    elapsed_s: f32,
}

impl RigSignalService {
    pub fn new() -> Self {
        Self { elapsed_s: 0.0 }
    }

    /// Advance simulated time by `dt_s` and refresh every shared input
    /// the acquisition core will sample on its next cycle.
    pub fn advance(&mut self, dt_s: f32, handles: &SimRigHandles, config: &DaqConfig) {
        self.elapsed_s += dt_s;
        let mut rng = rand::thread_rng();

        // Airflow sweeps 4..20 m/s over a minute so the stream shows
        // the whole operating range.
        let target_speed = 12.0 + 8.0 * (self.elapsed_s * TAU / 60.0).sin();
        let dynamic_pressure = 0.5 * NOMINAL_AIR_DENSITY * target_speed * target_speed;

        let voltage = config.pitot.zero_offset_v
            + dynamic_pressure * (config.pitot.supply_voltage - 2.0 * config.pitot.zero_offset_v)
                / (config.pitot.full_scale_kpa * 1000.0);
        let raw = (voltage / config.pitot.supply_voltage * config.pitot.adc_max as f32
            + rng.gen_range(-2.0..=2.0))
        .clamp(0.0, config.pitot.adc_max as f32) as u16;
        handles.pitot_raw.store(raw, Ordering::Relaxed);

        for (bridge, gain) in handles.bridges.iter().zip(LOAD_GAINS) {
            let units = gain * dynamic_pressure;
            let counts = (units * config.load_scale + rng.gen_range(-30.0..=30.0)) as i32;

            let mut state = bridge.lock().unwrap_or_else(|e| e.into_inner());
            state.counts = counts;
            state.ready = rng.gen_bool(BRIDGE_READY_RATE);
        }

        let mut celsius = handles.thermal_c.lock().unwrap_or_else(|e| e.into_inner());
        *celsius = 21.5
            + 1.2 * (self.elapsed_s * TAU / 300.0).sin()
            + rng.gen_range(-0.05..=0.05);
    }
}

impl Default for RigSignalService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::externals::rig::adapters::BridgeState;
    use std::sync::atomic::AtomicU16;
    use std::sync::{Arc, Mutex};

    fn test_handles() -> SimRigHandles {
        SimRigHandles {
            bridges: std::array::from_fn(|_| Arc::new(Mutex::new(BridgeState::new()))),
            pitot_raw: Arc::new(AtomicU16::new(0)),
            thermal_c: Arc::new(Mutex::new(21.5)),
        }
    }

    #[test]
    fn test_advance_keeps_signals_in_converter_range() {
        let handles = test_handles();
        let config = DaqConfig::default();
        let mut signals = RigSignalService::new();

        for _ in 0..600 {
            signals.advance(0.25, &handles, &config);

            let raw = handles.pitot_raw.load(Ordering::Relaxed);
            assert!(raw <= config.pitot.adc_max);

            let celsius = *handles
                .thermal_c
                .lock()
                .expect("Failed to lock thermal state.");
            assert!((15.0..30.0).contains(&celsius));
        }
    }
}
