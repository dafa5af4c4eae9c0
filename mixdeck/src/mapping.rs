//! Display-target mapping built from the raw configuration.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

/// Slider-mapping values that mark a display as tracking the foreground
/// app. Retained verbatim for compatibility with existing deck config
/// files.
const ACTIVE_APP_SENTINELS: &[&str] = &["deej.current", "deej.unmapped"];

/// What a display renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    /// A static image file, drawn as-is.
    StaticImage,
    /// The icon of a running process, looked up by executable name.
    Process,
    /// Follows whatever application currently holds the foreground.
    ActiveApp,
}

/// One configured display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTarget {
    pub display_index: u8,
    pub kind: TargetKind,
    /// File path or lowercased process name; unused for `ActiveApp`.
    pub value: String,
}

impl DisplayTarget {
    pub fn tracks_active_app(&self) -> bool {
        self.kind == TargetKind::ActiveApp
    }
}

/// Build the display-target set from the raw config mappings.
///
/// The last element of each target list is authoritative. Keys are
/// processed in sorted order so a duplicated display index resolves
/// last-write-wins deterministically. Unrecognized targets are dropped.
pub fn build_display_map(
    display_mapping: &HashMap<String, Vec<String>>,
    slider_mapping: &HashMap<String, Vec<String>>,
) -> Vec<DisplayTarget> {
    let mut by_index: BTreeMap<u8, DisplayTarget> = BTreeMap::new();

    let mut keys: Vec<&String> = display_mapping.keys().collect();
    keys.sort();

    for raw_index in keys {
        let Ok(display_index) = raw_index.parse::<u8>() else {
            warn!(%raw_index, "ignoring non-numeric display index");
            continue;
        };
        let Some(target) = display_mapping[raw_index].last() else {
            continue;
        };

        let resolved = if target.ends_with(".exe") {
            Some(DisplayTarget {
                display_index,
                kind: TargetKind::Process,
                value: target.to_lowercase(),
            })
        } else if target.ends_with(".png") {
            Some(DisplayTarget {
                display_index,
                kind: TargetKind::StaticImage,
                value: target.clone(),
            })
        } else if target == "auto" {
            resolve_auto(display_index, slider_mapping)
        } else {
            debug!(display_index, %target, "dropping unrecognized display target");
            None
        };

        if let Some(resolved) = resolved {
            by_index.insert(display_index, resolved);
        }
    }

    by_index.into_values().collect()
}

/// An `auto` display follows its slider's own mapping: a concrete app name
/// renders that app's icon, the tracker sentinels follow the foreground
/// app.
fn resolve_auto(
    display_index: u8,
    slider_mapping: &HashMap<String, Vec<String>>,
) -> Option<DisplayTarget> {
    let mapped = slider_mapping
        .get(&display_index.to_string())
        .and_then(|targets| targets.last());
    let Some(app) = mapped else {
        warn!(display_index, "auto display has no slider mapping, skipping");
        return None;
    };

    if ACTIVE_APP_SENTINELS.contains(&app.as_str()) {
        Some(DisplayTarget {
            display_index,
            kind: TargetKind::ActiveApp,
            value: app.clone(),
        })
    } else {
        Some(DisplayTarget {
            display_index,
            kind: TargetKind::Process,
            value: app.to_lowercase(),
        })
    }
}
