use std::time::Duration;

use common::record::TunnelRecord;
use tokio::sync::broadcast::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::RigModule;

/// Task: Runs the acquisition loop at its fixed cadence against the
/// simulated rig, broadcasting each cycle's record. The periodic sleep
/// replaces the firmware's blocking inter-cycle idle while keeping all
/// reads of one record inside one iteration. Can be cancelled.
#[tracing::instrument(skip_all)]
pub async fn task_run_acquisition(
    token: CancellationToken,
    mut rig: RigModule,
    tx_records: Sender<TunnelRecord>,
) {
    info!("Started.");

    rig.application.initialize();
    let config = *rig.application.config();
    let cycle = Duration::from_millis(config.cycle_interval_ms as u64);

    loop {
        rig.signals
            .advance(cycle.as_secs_f32(), &rig.handles, &config);

        let record = rig.application.run_cycle();
        if let Err(e) = tx_records.send(record) {
            warn!("Failed to broadcast cycle record. Error: {}", e);
        }

        tokio::select! {
            _ = token.cancelled() => {
                warn!("Cancelled.");
                break;
            },
            _ = tokio::time::sleep(cycle) => {}
        };
    }
}
