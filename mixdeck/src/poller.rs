//! Foreground-app polling loop.
//!
//! Samples the active application on a fixed tick, re-renders tracker
//! displays on change, rebuilds the whole display mapping on config reload,
//! and exits on shutdown. Renders run inline, so a tick is simply skipped
//! while a previous render is still in flight.

use std::sync::Arc;

use display_link::DisplayLink;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{interval, Duration, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ConfigManager;
use crate::providers::{ForegroundAppProvider, ProcessIconProvider};
use crate::router::DisplayRouter;

/// Change-detection state, owned by the poller for the lifetime of its
/// loop.
#[derive(Debug, Default)]
pub struct PollState {
    last_seen: String,
}

impl PollState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observation. Returns true when the foreground app changed
    /// since the previous tick.
    pub fn observe(&mut self, app: &str) -> bool {
        if app == self.last_seen {
            return false;
        }
        self.last_seen = app.to_string();
        true
    }
}

pub struct Poller {
    config: Arc<ConfigManager>,
    foreground: Arc<dyn ForegroundAppProvider>,
    icons: Arc<dyn ProcessIconProvider>,
    link: Arc<DisplayLink>,
    shutdown: CancellationToken,
}

impl Poller {
    pub fn new(
        config: Arc<ConfigManager>,
        foreground: Arc<dyn ForegroundAppProvider>,
        icons: Arc<dyn ProcessIconProvider>,
        link: Arc<DisplayLink>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            foreground,
            icons,
            link,
            shutdown,
        }
    }

    /// Drive the poll loop until shutdown.
    pub async fn run(self) {
        let mut reload_rx = self.config.subscribe();
        let mut state = PollState::new();

        let config = self.config.current().await;
        let mut router =
            DisplayRouter::from_config(&config, self.link.clone(), self.icons.clone());
        let mut ticker = poll_ticker(config.poll_interval_ms);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("poller stopped (shutdown)");
                    return;
                }
                _ = ticker.tick() => {
                    self.handle_tick(&mut state, &router);
                }
                result = reload_rx.recv() => match result {
                    Ok(()) => {
                        info!("rebuilding display mapping after config reload");
                        let config = self.config.current().await;
                        router = DisplayRouter::from_config(
                            &config,
                            self.link.clone(),
                            self.icons.clone(),
                        );
                        ticker = poll_ticker(config.poll_interval_ms);
                        router.render_all();
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "missed config reload notifications, rebuilding");
                        reload_rx = self.config.subscribe();
                        let config = self.config.current().await;
                        router = DisplayRouter::from_config(
                            &config,
                            self.link.clone(),
                            self.icons.clone(),
                        );
                        router.render_all();
                    }
                    Err(RecvError::Closed) => {
                        info!("config channel closed, poller stopped");
                        return;
                    }
                },
            }
        }
    }

    /// One poll iteration: sample the foreground app and re-render tracker
    /// displays when it changed.
    fn handle_tick(&self, state: &mut PollState, router: &DisplayRouter) {
        let app = match self.foreground.foreground_app() {
            Ok(app) => app,
            Err(err) => {
                debug!(error = %err, "foreground probe failed");
                return;
            }
        };

        if state.observe(&app) {
            info!(app = %state.last_seen, "foreground app changed");
            router.render_active_app(&app);
        }
    }
}

fn poll_ticker(interval_ms: u64) -> Interval {
    let mut ticker = interval(Duration::from_millis(interval_ms.max(50)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}
