//! Background task loops.

use std::sync::Arc;
use std::time::Duration;

use display_link::{DisplayLink, SerialSink};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ConfigManager;

/// Time between reconnect attempts while the link is down.
const RETRY_INTERVAL: Duration = Duration::from_secs(5);

async fn sleep_or_cancel(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        _ = token.cancelled() => true,
        _ = sleep(duration) => false,
    }
}

/// Periodically re-open the serial port while the link is disconnected.
///
/// Frames keep flowing (best-effort skipped) the moment a fresh sink is
/// swapped in; nothing is replayed.
pub async fn serial_reconnect_loop(
    config: Arc<ConfigManager>,
    link: Arc<DisplayLink>,
    shutdown: CancellationToken,
) {
    loop {
        if sleep_or_cancel(&shutdown, RETRY_INTERVAL).await {
            info!("serial reconnect loop stopped (shutdown)");
            return;
        }

        if link.is_connected() {
            continue;
        }

        let config = config.current().await;
        if config.dry_run {
            continue;
        }

        match SerialSink::open(&config.serial_port, config.baud_rate) {
            Ok(sink) => {
                link.replace_sink(Box::new(sink));
                info!(port = %config.serial_port, "serial connection established");
            }
            Err(err) => {
                debug!(port = %config.serial_port, error = %err, "serial reconnect failed");
            }
        }
    }
}
