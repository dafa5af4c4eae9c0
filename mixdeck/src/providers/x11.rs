//! X11 implementation of the capability providers.
//!
//! Identity comes from `_NET_ACTIVE_WINDOW`, `_NET_WM_PID`, and `WM_CLASS`;
//! icons from the `_NET_WM_ICON` window property.

use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use image::RgbaImage;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{Atom, AtomEnum, ConnectionExt, Window};
use x11rb::rust_connection::RustConnection;

use super::{ForegroundAppProvider, ProcessIconProvider, ProcessInfo};

/// Pre-cached X11 atoms to avoid repeated roundtrips.
struct CachedAtoms {
    net_active_window: Atom,
    net_client_list: Atom,
    net_wm_pid: Atom,
    net_wm_icon: Atom,
}

impl CachedAtoms {
    fn new(conn: &RustConnection) -> Result<Self> {
        Ok(Self {
            net_active_window: intern(conn, "_NET_ACTIVE_WINDOW")?,
            net_client_list: intern(conn, "_NET_CLIENT_LIST")?,
            net_wm_pid: intern(conn, "_NET_WM_PID")?,
            net_wm_icon: intern(conn, "_NET_WM_ICON")?,
        })
    }
}

fn intern(conn: &RustConnection, name: &str) -> Result<Atom> {
    Ok(conn
        .intern_atom(false, name.as_bytes())
        .with_context(|| format!("failed to intern {name} atom"))?
        .reply()
        .with_context(|| format!("failed to get reply for {name} atom"))?
        .atom)
}

/// Capability provider backed by a live X server connection.
pub struct X11Provider {
    conn: RustConnection,
    root: Window,
    atoms: CachedAtoms,
}

impl X11Provider {
    /// Connect to the X server and cache the atoms the providers need.
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None).context("failed to connect to X server")?;
        let root = conn.setup().roots[screen_num].root;
        let atoms = CachedAtoms::new(&conn)?;
        Ok(Self { conn, root, atoms })
    }

    fn active_window(&self) -> Result<Option<Window>> {
        let prop = self
            .conn
            .get_property(
                false,
                self.root,
                self.atoms.net_active_window,
                AtomEnum::WINDOW,
                0,
                1,
            )
            .context("failed to query _NET_ACTIVE_WINDOW")?
            .reply()
            .context("failed to get _NET_ACTIVE_WINDOW reply")?;
        Ok(prop
            .value32()
            .and_then(|mut values| values.next())
            .filter(|&window| window != 0))
    }

    fn client_windows(&self) -> Result<Vec<Window>> {
        let prop = self
            .conn
            .get_property(
                false,
                self.root,
                self.atoms.net_client_list,
                AtomEnum::WINDOW,
                0,
                u32::MAX,
            )
            .context("failed to query _NET_CLIENT_LIST")?
            .reply()
            .context("failed to get _NET_CLIENT_LIST reply")?;
        Ok(prop
            .value32()
            .map(|values| values.collect())
            .unwrap_or_default())
    }

    fn window_pid(&self, window: Window) -> Result<Option<u32>> {
        let prop = self
            .conn
            .get_property(false, window, self.atoms.net_wm_pid, AtomEnum::CARDINAL, 0, 1)
            .with_context(|| format!("failed to query _NET_WM_PID for window {window}"))?
            .reply()
            .with_context(|| format!("failed to get _NET_WM_PID reply for window {window}"))?;
        Ok(prop.value32().and_then(|mut values| values.next()))
    }

    fn window_class(&self, window: Window) -> Result<Option<String>> {
        let prop = self
            .conn
            .get_property(false, window, AtomEnum::WM_CLASS, AtomEnum::STRING, 0, 1024)
            .with_context(|| format!("failed to query WM_CLASS for window {window}"))?
            .reply()
            .with_context(|| format!("failed to get WM_CLASS reply for window {window}"))?;

        // WM_CLASS holds "instance\0class\0"; the instance name names the app.
        let instance = prop.value.split(|&b| b == 0).next().unwrap_or(&[]);
        if instance.is_empty() {
            Ok(None)
        } else {
            Ok(Some(String::from_utf8_lossy(instance).to_lowercase()))
        }
    }

    fn window_icon(&self, window: Window) -> Result<Option<RgbaImage>> {
        let prop = self
            .conn
            .get_property(
                false,
                window,
                self.atoms.net_wm_icon,
                AtomEnum::CARDINAL,
                0,
                u32::MAX,
            )
            .with_context(|| format!("failed to query _NET_WM_ICON for window {window}"))?
            .reply()
            .with_context(|| format!("failed to get _NET_WM_ICON reply for window {window}"))?;

        let values: Vec<u32> = match prop.value32() {
            Some(values) => values.collect(),
            None => return Ok(None),
        };
        Ok(decode_icon_property(&values))
    }
}

impl ForegroundAppProvider for X11Provider {
    fn foreground_app(&self) -> Result<String> {
        let Some(window) = self.active_window()? else {
            return Ok(String::new());
        };
        Ok(self.window_class(window)?.unwrap_or_default())
    }
}

impl ProcessIconProvider for X11Provider {
    fn list_processes(&self) -> Result<Vec<ProcessInfo>> {
        let mut by_pid: HashMap<u32, String> = HashMap::new();
        for window in self.client_windows()? {
            let Some(pid) = self.window_pid(window)? else {
                continue;
            };
            let Some(name) = self.window_class(window)? else {
                continue;
            };
            by_pid.entry(pid).or_insert(name);
        }
        Ok(by_pid
            .into_iter()
            .map(|(pid, name)| ProcessInfo { pid, name })
            .collect())
    }

    fn icon_for_pid(&self, pid: u32) -> Result<RgbaImage> {
        for window in self.client_windows()? {
            if self.window_pid(window)? != Some(pid) {
                continue;
            }
            if let Some(icon) = self.window_icon(window)? {
                return Ok(icon);
            }
        }
        Err(anyhow!("no window icon found for pid {pid}"))
    }
}

/// Decode a `_NET_WM_ICON` property: a sequence of `(width, height,
/// width*height ARGB words)` blocks, one per advertised size. Picks the
/// largest.
fn decode_icon_property(values: &[u32]) -> Option<RgbaImage> {
    let mut best: Option<(u32, u32, &[u32])> = None;
    let mut rest = values;
    loop {
        let [width, height, tail @ ..] = rest else {
            break;
        };
        let (width, height) = (*width, *height);
        let Some(count) = (width as usize).checked_mul(height as usize) else {
            break;
        };
        if count == 0 || tail.len() < count {
            break;
        }
        let (pixels, next) = tail.split_at(count);
        if best.is_none_or(|(_, _, current)| pixels.len() > current.len()) {
            best = Some((width, height, pixels));
        }
        rest = next;
    }

    let (width, height, pixels) = best?;
    let mut rgba = Vec::with_capacity(pixels.len() * 4);
    for &argb in pixels {
        rgba.extend_from_slice(&[
            (argb >> 16) as u8,
            (argb >> 8) as u8,
            argb as u8,
            (argb >> 24) as u8,
        ]);
    }
    RgbaImage::from_raw(width, height, rgba)
}
