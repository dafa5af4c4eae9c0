//! Daemon configuration: JSON file loading, defaults, and live reload.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

/// Env var overriding the config file location.
const CONFIG_ENV: &str = "MIXDECK_CONFIG";

const CONFIG_FILE: &str = "mixdeck/config.json";

/// Deck configuration, reloadable at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Master switch for the display feature.
    pub enabled: bool,

    /// Serial port the deck is attached to.
    pub serial_port: String,
    pub baud_rate: u32,

    /// Foreground-app poll cadence in milliseconds.
    pub poll_interval_ms: u64,

    /// Bias added to the computed Otsu threshold (saturating).
    pub threshold_bias: u8,

    /// Draw each display's index in the canvas corner.
    pub label_displays: bool,

    /// Capture frames instead of writing to hardware.
    pub dry_run: bool,

    /// Display index (string-encoded) to ordered target list; the last
    /// entry of each list is authoritative.
    pub display_mapping: HashMap<String, Vec<String>>,

    /// Slider index to ordered app list, consulted by `auto` display
    /// targets.
    pub slider_mapping: HashMap<String, Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            serial_port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
            poll_interval_ms: 500,
            threshold_bias: mono_render::options::DEFAULT_THRESHOLD_BIAS,
            label_displays: false,
            dry_run: false,
            display_mapping: HashMap::new(),
            slider_mapping: HashMap::new(),
        }
    }
}

/// Default config path: `$MIXDECK_CONFIG`, else the user config directory.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_FILE)
}

/// Owns the loaded configuration and notifies subscribers on reload.
pub struct ConfigManager {
    path: PathBuf,
    current: RwLock<AppConfig>,
    reload_tx: broadcast::Sender<()>,
}

impl ConfigManager {
    /// Load the config file, falling back to defaults when it is missing.
    pub fn load(path: PathBuf) -> Result<Self> {
        let config = read_config(&path)?;
        let (reload_tx, _) = broadcast::channel(4);
        Ok(Self {
            path,
            current: RwLock::new(config),
            reload_tx,
        })
    }

    /// Snapshot of the current configuration.
    pub async fn current(&self) -> AppConfig {
        self.current.read().await.clone()
    }

    /// Subscribe to reload notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.reload_tx.subscribe()
    }

    /// Re-read the config file, swap it in wholesale, and notify
    /// subscribers. On failure the previous configuration stays active.
    pub async fn reload(&self) -> Result<()> {
        let config = read_config(&self.path)?;
        *self.current.write().await = config;
        info!(path = %self.path.display(), "configuration reloaded");
        let _ = self.reload_tx.send(());
        Ok(())
    }
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(AppConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading config {}", path.display()));
        }
    };
    serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}
