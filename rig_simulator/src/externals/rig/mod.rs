use std::sync::atomic::AtomicU16;
use std::sync::{Arc, Mutex};

use daq_core::{Application, DaqConfig};
use tokio::sync::broadcast::Sender;

use self::adapters::{
    BridgeState, BroadcastStreamPort, SimBridgeClock, SimBridgeData, SimDelay, SimPitotAdc,
    SimRigHandles, SimThermalProbe,
};
use self::services::RigSignalService;

pub mod adapters;
pub mod services;
pub mod task;

/// Probability of one thermal read failing, to exercise the fallback
/// sentinel and its diagnostic notice in normal operation.
const THERMAL_FAULT_RATE: f64 = 0.02;

pub type SimApplication = Application<
    SimBridgeData,
    SimBridgeClock,
    SimPitotAdc,
    SimThermalProbe,
    BroadcastStreamPort,
    SimDelay,
>;

/// The complete simulated rig: the acquisition application wired to
/// simulated hardware, plus the handles and signal service that steer it.
pub struct RigModule {
    pub application: SimApplication,
    pub handles: SimRigHandles,
    pub signals: RigSignalService,
}

impl RigModule {
    pub fn initialize(tx_lines: Sender<String>, config: DaqConfig) -> Self {
        let bridges: [_; 4] = std::array::from_fn(|_| Arc::new(Mutex::new(BridgeState::new())));
        let pitot_raw = Arc::new(AtomicU16::new(0));
        let thermal_c = Arc::new(Mutex::new(21.5f32));

        let lines = bridges
            .clone()
            .map(|bridge| (SimBridgeData(bridge.clone()), SimBridgeClock(bridge)));

        let application = Application::new(
            lines,
            SimPitotAdc {
                raw: pitot_raw.clone(),
            },
            SimThermalProbe::new(thermal_c.clone(), THERMAL_FAULT_RATE),
            BroadcastStreamPort { tx_lines },
            SimDelay,
            config,
        );

        Self {
            application,
            handles: SimRigHandles {
                bridges,
                pitot_raw,
                thermal_c,
            },
            signals: RigSignalService::new(),
        }
    }
}
