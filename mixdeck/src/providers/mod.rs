//! Platform capability providers.
//!
//! The rendering side depends only on these traits; the X11 implementation
//! lives in [`x11`] and tests substitute fakes.

pub mod x11;

use anyhow::Result;
use image::RgbaImage;

/// A running process with a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
}

/// Reports which application currently holds the foreground.
pub trait ForegroundAppProvider: Send + Sync {
    /// Lowercased name of the app owning the focused window; empty when
    /// none can be determined.
    fn foreground_app(&self) -> Result<String>;
}

/// Enumerates processes and fetches their window icons.
pub trait ProcessIconProvider: Send + Sync {
    fn list_processes(&self) -> Result<Vec<ProcessInfo>>;

    fn icon_for_pid(&self, pid: u32) -> Result<RgbaImage>;

    /// Resolve a pid by executable name, case-insensitively and with or
    /// without a trailing `.exe`.
    fn pid_by_name(&self, name: &str) -> Result<u32> {
        let needle = normalize_app_name(name);
        self.list_processes()?
            .into_iter()
            .find(|p| normalize_app_name(&p.name) == needle)
            .map(|p| p.pid)
            .ok_or_else(|| anyhow::anyhow!("no process found with name: {name}"))
    }
}

/// Lowercase and drop a trailing `.exe` so config entries written for
/// either platform convention match.
pub fn normalize_app_name(name: &str) -> String {
    let lower = name.to_lowercase();
    lower.strip_suffix(".exe").unwrap_or(&lower).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticProcesses(Vec<ProcessInfo>);

    impl ProcessIconProvider for StaticProcesses {
        fn list_processes(&self) -> Result<Vec<ProcessInfo>> {
            Ok(self.0.clone())
        }

        fn icon_for_pid(&self, pid: u32) -> Result<RgbaImage> {
            anyhow::bail!("no icon for {pid}")
        }
    }

    #[test]
    fn normalize_strips_one_exe_suffix() {
        assert_eq!(normalize_app_name("Firefox.EXE"), "firefox");
        assert_eq!(normalize_app_name("firefox"), "firefox");
        assert_eq!(normalize_app_name("weird.exe.exe"), "weird.exe");
    }

    #[test]
    fn pid_lookup_matches_across_conventions() {
        let provider = StaticProcesses(vec![
            ProcessInfo {
                pid: 11,
                name: "firefox".to_string(),
            },
            ProcessInfo {
                pid: 22,
                name: "spotify".to_string(),
            },
        ]);

        assert_eq!(provider.pid_by_name("Firefox.exe").unwrap(), 11);
        assert_eq!(provider.pid_by_name("spotify").unwrap(), 22);
        assert!(provider.pid_by_name("mumble.exe").is_err());
    }
}
