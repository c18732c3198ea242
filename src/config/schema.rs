use std::path::PathBuf;

use log::LevelFilter;
use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/nspotify/config.toml` or `~/.config/nspotify/config.toml`
///
/// Precedence (highest wins):
/// 1) Command line flags (applied by the runtime after loading)
/// 2) Environment variables (prefix `NSPOTIFY__`, `__` as nested separator)
/// 3) Config file (if present)
/// 4) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub pipeline: PipelineSettings,
    pub spotify: SpotifySettings,
    pub logging: LoggingSettings,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Number of fetched tracks buffered between the fetcher and the listing.
    pub fetching_buffer: usize,
    /// How often the fetch supervisor rechecks its worker (milliseconds).
    pub fetching_timeout_ms: u64,
    /// Number of tracks loaded before the UI is shown.
    pub load_eager: usize,
    /// Number of rows kept loaded ahead of the cursor.
    pub load_lookahead: usize,
    /// How often the listing loader rechecks the cursor (milliseconds).
    pub load_timeout_ms: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            fetching_buffer: 100,
            fetching_timeout_ms: 3000,
            load_eager: 50,
            load_lookahead: 50,
            load_timeout_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpotifySettings {
    /// Application client id registered with the Spotify developer dashboard.
    pub client_id: String,
    /// Application client secret.
    pub client_secret: String,
    /// Device that receives playback commands. Without one, devices are listed.
    pub device: Option<String>,
    /// Port of the `http://localhost:<port>` redirect URI.
    pub auth_port: u16,
    /// Token cache directory. Defaults to `~/.local/nspotify`.
    pub cache_dir: Option<PathBuf>,
    /// Neither read nor write the token cache.
    pub no_cache: bool,
    /// Saved tracks requested per page (the API allows 1..=50).
    pub page_size: u32,
}

impl Default for SpotifySettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            device: None,
            auth_port: 8080,
            cache_dir: None,
            no_cache: false,
            page_size: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// One of `trace`, `debug`, `info`, `warn`, `error`, `fatal`, `panic`, `off`.
    pub level: String,
    /// Colorize log levels.
    pub color: bool,
    /// Number of log lines kept for the logs page.
    pub capacity: usize,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "error".to_string(),
            color: true,
            capacity: 1000,
        }
    }
}

impl LoggingSettings {
    /// Parsed `level`, or `None` when it names no known level.
    pub fn level_filter(&self) -> Option<LevelFilter> {
        parse_level(&self.level)
    }
}

/// Parse a log level name. `fatal` maps to errors only, `panic` silences logging.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.trim().to_ascii_lowercase().as_str() {
        "fatal" => Some(LevelFilter::Error),
        "panic" => Some(LevelFilter::Off),
        "warning" => Some(LevelFilter::Warn),
        other => other.parse().ok(),
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Page shown when the UI starts.
    pub start_page: StartPage,
    /// Rows skipped by PageUp / PageDown.
    pub page_step: usize,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " your saved tracks ".to_string(),
            start_page: StartPage::Listing,
            page_step: 20,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartPage {
    #[serde(alias = "tracks")]
    Listing,
    #[serde(alias = "log")]
    Logs,
}
