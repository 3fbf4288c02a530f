use std::io::{self, Write};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace, warn};

/// Baud rate of the outbound link when a real serial port is used.
const STREAM_BAUD: u32 = 115_200;

#[derive(Error, Debug)]
pub enum StreamOutputError {
    /// The named serial port could not be opened.
    #[error("Failed to open serial port '{0}'.")]
    OpenPort(String, #[source] serialport::Error),
}

/// Task: Drains the line queue to the outbound stream, in order, one
/// line at a time. Writes go to stdout unless a serial port name was
/// given. Write failures degrade to a warning; the stream has no
/// acknowledgment or retry. Can be cancelled.
#[tracing::instrument(skip_all)]
pub async fn task_write_stream(
    token: CancellationToken,
    mut rx_lines: Receiver<String>,
    port_name: Option<String>,
) {
    info!("Started.");

    let mut sink = match open_sink(port_name) {
        Ok(sink) => sink,
        Err(e) => {
            error!("Failed to open the outbound stream. Error: {}", e);
            token.cancel();
            return;
        }
    };

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                warn!("Cancelled.");
                break;
            },
            Ok(line) = rx_lines.recv() => {
                if let Err(e) = writeln!(sink, "{}", line) {
                    warn!("Failed to write line to stream. Error: {}", e);
                } else {
                    trace!("Wrote one line to stream.");
                    let _ = sink.flush();
                }
            },
        };
    }
}

fn open_sink(port_name: Option<String>) -> Result<Box<dyn Write + Send>, StreamOutputError> {
    match port_name {
        Some(name) => {
            let port = serialport::new(name.as_str(), STREAM_BAUD)
                .timeout(Duration::from_millis(1000))
                .open()
                .map_err(|e| StreamOutputError::OpenPort(name.clone(), e))?;
            info!("Streaming to serial port '{}'.", name);
            Ok(Box::new(port))
        }
        None => {
            info!("Streaming to stdout.");
            Ok(Box::new(io::stdout()))
        }
    }
}
