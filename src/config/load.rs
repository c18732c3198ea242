use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `NSPOTIFY__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("NSPOTIFY")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        let p = &self.pipeline;
        if p.fetching_buffer == 0 {
            return Err("pipeline.fetching_buffer must be >= 1".to_string());
        }
        if p.load_lookahead == 0 {
            return Err("pipeline.load_lookahead must be >= 1".to_string());
        }
        if p.fetching_timeout_ms == 0 || p.load_timeout_ms == 0 {
            return Err("pipeline timeouts must be >= 1ms".to_string());
        }
        if !(1..=50).contains(&self.spotify.page_size) {
            return Err("spotify.page_size must be within 1..=50".to_string());
        }
        if self.logging.level_filter().is_none() {
            return Err(format!("unknown logging.level {:?}", self.logging.level));
        }
        if self.logging.capacity == 0 {
            return Err("logging.capacity must be >= 1".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `NSPOTIFY_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("NSPOTIFY_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/nspotify/config.toml`
/// or `~/.config/nspotify/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("nspotify").join("config.toml"))
}

/// Default token cache directory, `~/.local/nspotify`.
pub fn default_cache_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".local").join("nspotify"))
}
