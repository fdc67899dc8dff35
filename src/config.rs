//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--api-url`, `--demo`, `--view`, etc.)
//! 2. `--config FILE`
//! 3. `$FB_CONFIG` environment variable (path to config file)
//! 4. Project-local `.fb.toml` in the current working directory
//! 5. Global `~/.config/folder-browser/config.toml`
//! 6. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

// ── Section configs ──────────────────────────────────────────────────────────

/// General application settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Namespace root; navigation never leaves it.
    pub root_path: Option<String>,
    /// Folder shown at startup (overridden by CLI positional arg).
    pub start_path: Option<String>,
    /// Enable mouse support.
    pub mouse: Option<bool>,
    /// Confirm before delete operations.
    pub confirm_delete: Option<bool>,
}

/// Backend connection settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    /// Use the built-in in-memory backend instead of HTTP.
    pub demo: Option<bool>,
}

/// Listing presentation.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct BrowserConfig {
    /// "grid", "list" or "tree".
    pub view: Option<String>,
    /// "name", "created" or "updated".
    pub sort_by: Option<String>,
    pub folders_first: Option<bool>,
    /// Width of one grid cell in columns.
    pub grid_cell_width: Option<u16>,
    /// Use nerd font icons (false = ASCII fallback).
    pub use_icons: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SelectionConfig {
    /// How long the drag box lingers after release.
    pub drag_clear_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: Option<String>,
    /// Log file path. Defaults to the platform data directory.
    pub file: Option<String>,
}

/// Color settings for a single theme palette.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeColorsConfig {
    pub item_fg: Option<String>,
    pub selected_bg: Option<String>,
    pub selected_fg: Option<String>,
    pub focus_bg: Option<String>,
    pub folder_fg: Option<String>,
    pub file_fg: Option<String>,
    pub address_bg: Option<String>,
    pub status_bg: Option<String>,
    pub status_fg: Option<String>,
    pub border_fg: Option<String>,
    pub dialog_bg: Option<String>,
    pub dialog_border_fg: Option<String>,
    pub drag_box_fg: Option<String>,
}

/// Theme configuration section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Color scheme: "dark", "light", "custom".
    pub scheme: Option<String>,
    /// Custom color overrides.
    pub custom: Option<ThemeColorsConfig>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub api: ApiConfig,
    pub browser: BrowserConfig,
    pub selection: SelectionConfig,
    pub logging: LoggingConfig,
    pub theme: ThemeConfig,
}

// ── Default constants ────────────────────────────────────────────────────────

pub const DEFAULT_ROOT_PATH: &str = "/Organizations";
pub const DEFAULT_GRID_CELL_WIDTH: u16 = 18;
pub const DEFAULT_DRAG_CLEAR_DELAY_MS: u64 = 150;
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path; that is handled separately.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("FB_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".fb.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("folder-browser").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed (with a warning printed to stderr).
///
/// Config loads before logging is up, so problems go to stderr.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            eprintln!(
                "Warning: failed to parse config file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`; `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                root_path: other.general.root_path.clone().or(self.general.root_path),
                start_path: other.general.start_path.clone().or(self.general.start_path),
                mouse: other.general.mouse.or(self.general.mouse),
                confirm_delete: other.general.confirm_delete.or(self.general.confirm_delete),
            },
            api: ApiConfig {
                base_url: other.api.base_url.clone().or(self.api.base_url),
                demo: other.api.demo.or(self.api.demo),
            },
            browser: BrowserConfig {
                view: other.browser.view.clone().or(self.browser.view),
                sort_by: other.browser.sort_by.clone().or(self.browser.sort_by),
                folders_first: other.browser.folders_first.or(self.browser.folders_first),
                grid_cell_width: other
                    .browser
                    .grid_cell_width
                    .or(self.browser.grid_cell_width),
                use_icons: other.browser.use_icons.or(self.browser.use_icons),
            },
            selection: SelectionConfig {
                drag_clear_delay_ms: other
                    .selection
                    .drag_clear_delay_ms
                    .or(self.selection.drag_clear_delay_ms),
            },
            logging: LoggingConfig {
                level: other.logging.level.clone().or(self.logging.level),
                file: other.logging.file.clone().or(self.logging.file),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
                custom: other.theme.custom.clone().or(self.theme.custom),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Lowest priority first so later files overwrite.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    pub fn root_path(&self) -> &str {
        self.general
            .root_path
            .as_deref()
            .unwrap_or(DEFAULT_ROOT_PATH)
    }

    /// Startup folder; the root unless configured.
    pub fn start_path(&self) -> &str {
        self.general
            .start_path
            .as_deref()
            .unwrap_or_else(|| self.root_path())
    }

    /// Whether mouse support is enabled.
    pub fn mouse_enabled(&self) -> bool {
        self.general.mouse.unwrap_or(true)
    }

    /// Whether to confirm before delete.
    pub fn confirm_delete(&self) -> bool {
        self.general.confirm_delete.unwrap_or(true)
    }

    pub fn base_url(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .unwrap_or(crate::api::http::DEFAULT_BASE_URL)
    }

    pub fn demo(&self) -> bool {
        self.api.demo.unwrap_or(false)
    }

    /// View mode: "grid", "list" or "tree".
    pub fn view(&self) -> &str {
        self.browser.view.as_deref().unwrap_or("grid")
    }

    /// Sort key: "name", "created" or "updated".
    pub fn sort_by(&self) -> &str {
        self.browser.sort_by.as_deref().unwrap_or("name")
    }

    /// Whether folders are listed before files.
    pub fn folders_first(&self) -> bool {
        self.browser.folders_first.unwrap_or(true)
    }

    pub fn grid_cell_width(&self) -> u16 {
        self.browser
            .grid_cell_width
            .unwrap_or(DEFAULT_GRID_CELL_WIDTH)
            .max(8)
    }

    /// Whether to use nerd font icons.
    pub fn use_icons(&self) -> bool {
        self.browser.use_icons.unwrap_or(true)
    }

    pub fn drag_clear_delay(&self) -> Duration {
        Duration::from_millis(
            self.selection
                .drag_clear_delay_ms
                .unwrap_or(DEFAULT_DRAG_CLEAR_DELAY_MS),
        )
    }

    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Configured log file, or `fb.log` under the platform data directory.
    pub fn log_file(&self) -> Option<PathBuf> {
        match &self.logging.file {
            Some(file) => Some(PathBuf::from(file)),
            None => dirs::data_local_dir().map(|dir| {
                dir.join("folder-browser")
                    .join("logs")
                    .join("fb.log")
            }),
        }
    }

    /// Theme scheme: "dark", "light", or "custom".
    pub fn theme_scheme(&self) -> &str {
        self.theme.scheme.as_deref().unwrap_or("dark")
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
