//! Mixdeck daemon: renders application icons and status images onto the
//! per-slider OLED displays of a hardware volume-mixer deck.

mod background;
mod config;
mod mapping;
mod poller;
mod providers;
mod router;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use display_link::{BufferSink, DisplayLink, SerialSink};
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ConfigManager;
use crate::poller::Poller;
use crate::providers::x11::X11Provider;
use crate::router::DisplayRouter;

#[derive(Parser, Debug)]
#[command(name = "mixdeck", about = "Secondary-display driver for a volume-mixer deck")]
struct Args {
    /// Path to the configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Capture frames instead of writing to the serial port.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let path = args.config.unwrap_or_else(config::default_config_path);
    info!(path = %path.display(), "starting mixdeck");

    let manager = Arc::new(ConfigManager::load(path)?);
    let config = manager.current().await;
    if !config.enabled {
        info!("displays disabled in configuration, nothing to do");
        return Ok(());
    }

    let link = Arc::new(open_link(&config, args.dry_run));
    let provider =
        Arc::new(X11Provider::connect().context("foreground-app provider unavailable")?);

    let shutdown = CancellationToken::new();
    spawn_signal_tasks(manager.clone(), shutdown.clone());
    tokio::spawn(background::serial_reconnect_loop(
        manager.clone(),
        link.clone(),
        shutdown.clone(),
    ));

    // Initial render; trackers follow once the poller observes a
    // foreground app.
    let router = DisplayRouter::from_config(&config, link.clone(), provider.clone());
    router.render_all();

    let poller = Poller::new(manager, provider.clone(), provider, link, shutdown);
    poller.run().await;

    info!("shutdown complete");
    Ok(())
}

fn open_link(config: &config::AppConfig, cli_dry_run: bool) -> DisplayLink {
    if cli_dry_run || config.dry_run {
        info!("dry-run mode: frames are captured, not transmitted");
        return DisplayLink::new(Box::new(BufferSink::new()));
    }

    match SerialSink::open(&config.serial_port, config.baud_rate) {
        Ok(sink) => DisplayLink::new(Box::new(sink)),
        Err(err) => {
            warn!(error = %err, "serial port unavailable, starting disconnected");
            DisplayLink::disconnected()
        }
    }
}

fn spawn_signal_tasks(manager: Arc<ConfigManager>, shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
        info!("termination signal received");
        shutdown.cancel();
    });

    tokio::spawn(async move {
        let mut sighup = match signal(SignalKind::hangup()) {
            Ok(stream) => stream,
            Err(err) => {
                error!(error = %err, "failed to install SIGHUP handler");
                return;
            }
        };
        while sighup.recv().await.is_some() {
            info!("SIGHUP received, reloading configuration");
            if let Err(err) = manager.reload().await {
                error!(error = %format!("{err:#}"), "config reload failed, keeping previous");
            }
        }
    });
}
