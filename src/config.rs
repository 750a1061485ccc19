//! Engine configuration.
//!
//! `PatchConfig` carries everything a patch run needs: where the Steam UI
//! scripts live, where cached artifacts go, the per-run auth token, and the
//! scan window bounds. The window bounds are empirically tuned against
//! observed Steam builds; they live here as named configuration validated by
//! fixture tests, overridable from a JSON file for quick experiments when a
//! Steam update moves things around.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Engine version, part of the cache key identity: patch logic changes
/// between releases, so patched output is never compared across versions.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default port of the local JSON-RPC front door the injected hooks call.
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Configuration for one patch run.
#[derive(Debug, Clone)]
pub struct PatchConfig {
    /// Directory holding the Steam UI script bundles.
    pub steamui_dir: PathBuf,
    /// Directory for cached patched artifacts.
    pub cache_dir: PathBuf,
    /// Port of the local RPC front door baked into injected hooks.
    pub server_port: u16,
    /// Per-run authorization token baked into injected hooks. Randomly
    /// generated each process start, never cached.
    pub auth_token: String,
    /// Engine version tag, part of every cache key.
    pub version_tag: String,
    /// Skip cache reads and writes entirely (development).
    pub no_cache: bool,
    /// Bounded-scan window sizes used by the patch steps.
    pub windows: ScanWindows,
}

impl PatchConfig {
    pub fn new(steamui_dir: impl Into<PathBuf>, auth_token: impl Into<String>) -> Self {
        Self {
            steamui_dir: steamui_dir.into(),
            cache_dir: default_cache_dir(),
            server_port: DEFAULT_SERVER_PORT,
            auth_token: auth_token.into(),
            version_tag: VERSION.to_owned(),
            no_cache: false,
            windows: ScanWindows::default(),
        }
    }
}

/// Default Steam UI directory on Linux.
pub fn default_steamui_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".steam/steam/steamui")
}

/// Default cache directory: `{platform_cache_dir}/crankshaft`.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("crankshaft")
}

/// Default location of the scan window override file.
pub fn default_windows_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("crankshaft/scan-windows.json")
}

// ---------------------------------------------------------------------------
// Scan windows
// ---------------------------------------------------------------------------

/// Line-count bounds for every landmark-relative scan in the patch steps.
///
/// The defaults are tuned against captured Steam builds and exercised by the
/// fixture tests. A failed scan is never retried with a larger window: a miss
/// means the host layout changed and the engine needs updating.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanWindows {
    /// Backward from the known library-controller method to its constructor.
    pub constructor_lookback: usize,
    /// Backward from the power menu item to its element-construction call.
    pub create_element_lookback: usize,
    /// Forward from the settings tab label to the menu splice point.
    pub menu_splice_lookahead: usize,
    /// Backward from the settings tab label to the UI-library alias.
    pub react_alias_lookback: usize,
    /// Backward from the settings tab label to the route prop table.
    pub route_prop_lookback: usize,
    /// Forward from the route prop table to the `active:` property.
    pub active_prop_lookahead: usize,
    /// Forward from the quick-access settings title to its tab component.
    pub tab_component_lookahead: usize,
    /// Forward from the quick-access settings title to the tabs-array
    /// terminator.
    pub tabs_terminator_lookahead: usize,
    /// Backward from the app-properties title to the app-overview accessor.
    pub app_id_lookback: usize,
    /// Backward from the app-properties title to the nearest return.
    pub return_lookback: usize,
}

impl Default for ScanWindows {
    fn default() -> Self {
        Self {
            constructor_lookback: 400,
            create_element_lookback: 10,
            menu_splice_lookahead: 10,
            react_alias_lookback: 50,
            route_prop_lookback: 500,
            active_prop_lookahead: 20,
            tab_component_lookahead: 4,
            tabs_terminator_lookahead: 40,
            app_id_lookback: 15,
            return_lookback: 10,
        }
    }
}

impl ScanWindows {
    /// Load window overrides from a JSON file, falling back to the defaults
    /// when the file is absent or unparsable. Absent fields keep defaults.
    pub fn load_or_default(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&contents) {
            Ok(windows) => windows,
            Err(e) => {
                warn!("Ignoring invalid scan window config {}: {e}", path.display());
                Self::default()
            }
        }
    }
}
