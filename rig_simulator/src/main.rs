pub mod externals;

use anyhow::Result;
use daq_core::DaqConfig;
use tokio::{signal, sync::broadcast};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::level_filters::LevelFilter;

use crate::externals::record_logging::task::task_record_logging;
use crate::externals::rig::task::task_run_acquisition;
use crate::externals::rig::RigModule;
use crate::externals::stream_output::task::task_write_stream;

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr so they never interleave with the CSV
    // stream on stdout.
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_max_level(LevelFilter::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Optional first argument names a serial port to stream to instead
    // of stdout.
    let stream_port_name = std::env::args().nth(1);

    let tracker = TaskTracker::new();
    let token = CancellationToken::new();

    let (tx_lines, rx_lines) = broadcast::channel(64);
    let (tx_records, rx_records) = broadcast::channel(64);

    let rig = RigModule::initialize(tx_lines.clone(), DaqConfig::default());

    let token_clone = token.clone();
    tracker.spawn(async move { task_run_acquisition(token_clone, rig, tx_records).await });

    let token_clone = token.clone();
    tracker.spawn(async move { task_write_stream(token_clone, rx_lines, stream_port_name).await });

    let token_clone = token.clone();
    tracker.spawn(async move { task_record_logging(token_clone, rx_records).await });

    let token_clone = token.clone();
    tokio::select! {
        _ = token_clone.cancelled() => {}
        res = signal::ctrl_c() => {
            match res {
                Ok(_) => {
                    token.cancel();
                },
                Err(e) => {
                    tracing::error!("Failed to listen for ctrl_c. Error: {}", e);
                    token.cancel();
                }
            };
        },
    }

    tracker.close();
    tracker.wait().await;

    Ok(())
}
