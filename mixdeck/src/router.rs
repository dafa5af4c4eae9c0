//! Per-display render orchestration.

use std::sync::Arc;

use anyhow::{Context, Result};
use display_link::DisplayLink;
use mono_render::{to_display_bitmap, RenderOptions};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::mapping::{build_display_map, DisplayTarget, TargetKind};
use crate::providers::ProcessIconProvider;

/// Owns the configured display targets and renders them on demand.
///
/// A failing target is logged and skipped; it never blocks the others.
pub struct DisplayRouter {
    targets: Vec<DisplayTarget>,
    link: Arc<DisplayLink>,
    icons: Arc<dyn ProcessIconProvider>,
    threshold_bias: u8,
    label_displays: bool,
}

impl DisplayRouter {
    /// Build the router (and its target set) from the current config.
    pub fn from_config(
        config: &AppConfig,
        link: Arc<DisplayLink>,
        icons: Arc<dyn ProcessIconProvider>,
    ) -> Self {
        let targets = build_display_map(&config.display_mapping, &config.slider_mapping);
        info!(targets = targets.len(), "display mapping built");
        Self {
            targets,
            link,
            icons,
            threshold_bias: config.threshold_bias,
            label_displays: config.label_displays,
        }
    }

    pub fn targets(&self) -> &[DisplayTarget] {
        &self.targets
    }

    /// Render every configured target once (startup and config reload).
    pub fn render_all(&self) {
        for target in &self.targets {
            self.render_target(target);
        }
    }

    /// Render one target. Foreground trackers are driven exclusively by the
    /// poller and do nothing here.
    pub fn render_target(&self, target: &DisplayTarget) {
        let result = match target.kind {
            TargetKind::StaticImage => self.send_image_file(&target.value, target.display_index),
            TargetKind::Process => self.send_process_icon(&target.value, target.display_index),
            TargetKind::ActiveApp => return,
        };

        if let Err(err) = result {
            warn!(
                display_index = target.display_index,
                target = %target.value,
                error = %format!("{err:#}"),
                "render failed, skipping display"
            );
        }
    }

    /// Push the new foreground app's icon to every tracker display.
    pub fn render_active_app(&self, app: &str) {
        for target in &self.targets {
            if !target.tracks_active_app() {
                continue;
            }
            if let Err(err) = self.send_process_icon(app, target.display_index) {
                warn!(
                    display_index = target.display_index,
                    app,
                    error = %format!("{err:#}"),
                    "foreground render failed"
                );
            }
        }
    }

    fn send_image_file(&self, path: &str, display_index: u8) -> Result<()> {
        debug!(path, display_index, "rendering static image");
        let img = image::open(path).with_context(|| format!("loading image {path}"))?;

        // Status images ship pre-sized for the panel; no resample.
        let bitmap = to_display_bitmap(&img, &self.options(display_index).with_resize(false));
        self.link
            .send(display_index, &bitmap)
            .context("sending frame")
    }

    fn send_process_icon(&self, name: &str, display_index: u8) -> Result<()> {
        debug!(name, display_index, "rendering process icon");
        let pid = self.icons.pid_by_name(name)?;
        let icon = self
            .icons
            .icon_for_pid(pid)
            .with_context(|| format!("fetching icon for pid {pid}"))?;

        let bitmap = to_display_bitmap(&icon.into(), &self.options(display_index));
        self.link
            .send(display_index, &bitmap)
            .context("sending frame")
    }

    fn options(&self, display_index: u8) -> RenderOptions {
        let opts = RenderOptions::new().with_threshold_bias(self.threshold_bias);
        if self.label_displays {
            opts.with_label(display_index)
        } else {
            opts
        }
    }
}
