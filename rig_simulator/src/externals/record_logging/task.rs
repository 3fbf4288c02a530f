use common::record::TunnelRecord;
use tokio::sync::broadcast::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Task: Logs every cycle record on the diagnostic side, leaving the
/// data stream untouched. Can be cancelled.
#[tracing::instrument(skip_all)]
pub async fn task_record_logging(token: CancellationToken, mut rx_records: Receiver<TunnelRecord>) {
    info!("Started.");
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                warn!("Cancelled.");
                break;
            },
            Ok(record) = rx_records.recv() => {
                info!("Cycle record: {}", record);
            }
        };
    }
}
