use super::load::{default_config_path, resolve_config_path};
use log::LevelFilter;
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_nspotify_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("NSPOTIFY_CONFIG_PATH", "/tmp/nspotify-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/nspotify-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("nspotify")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("nspotify")
            .join("config.toml")
    );
}

#[test]
fn defaults_match_pipeline_constants() {
    let s = Settings::default();
    assert_eq!(s.pipeline.fetching_buffer, 100);
    assert_eq!(s.pipeline.fetching_timeout_ms, 3000);
    assert_eq!(s.pipeline.load_eager, 50);
    assert_eq!(s.pipeline.load_lookahead, 50);
    assert_eq!(s.pipeline.load_timeout_ms, 3000);
    assert_eq!(s.spotify.auth_port, 8080);
    assert_eq!(s.logging.level_filter(), Some(LevelFilter::Error));
    assert!(s.validate().is_ok());
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[pipeline]
fetching_buffer = 10
fetching_timeout_ms = 250
load_eager = 5
load_lookahead = 7
load_timeout_ms = 100

[spotify]
client_id = "abc"
client_secret = "shh"
device = "living-room"
auth_port = 9090
no_cache = true
page_size = 20

[logging]
level = "debug"
color = false
capacity = 42

[ui]
header_text = "hello"
start_page = "logs"
page_step = 5
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("NSPOTIFY_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("NSPOTIFY__PIPELINE__FETCHING_BUFFER");

    let s = Settings::load().unwrap();
    assert_eq!(s.pipeline.fetching_buffer, 10);
    assert_eq!(s.pipeline.fetching_timeout_ms, 250);
    assert_eq!(s.pipeline.load_eager, 5);
    assert_eq!(s.pipeline.load_lookahead, 7);
    assert_eq!(s.pipeline.load_timeout_ms, 100);
    assert_eq!(s.spotify.client_id, "abc");
    assert_eq!(s.spotify.client_secret, "shh");
    assert_eq!(s.spotify.device.as_deref(), Some("living-room"));
    assert_eq!(s.spotify.auth_port, 9090);
    assert!(s.spotify.no_cache);
    assert_eq!(s.spotify.page_size, 20);
    assert_eq!(s.logging.level_filter(), Some(LevelFilter::Debug));
    assert!(!s.logging.color);
    assert_eq!(s.logging.capacity, 42);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.start_page, StartPage::Logs);
    assert_eq!(s.ui.page_step, 5);
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[pipeline]
fetching_buffer = 250
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("NSPOTIFY_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("NSPOTIFY__PIPELINE__FETCHING_BUFFER", "12");

    let s = Settings::load().unwrap();
    assert_eq!(s.pipeline.fetching_buffer, 12);
}

#[test]
fn validate_rejects_degenerate_pipeline_sizes() {
    let mut s = Settings::default();
    s.pipeline.fetching_buffer = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.pipeline.load_lookahead = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.pipeline.load_timeout_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.spotify.page_size = 51;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.logging.level = "chatty".into();
    assert!(s.validate().is_err());
}

#[test]
fn parse_level_accepts_legacy_names() {
    assert_eq!(parse_level("trace"), Some(LevelFilter::Trace));
    assert_eq!(parse_level("WARN"), Some(LevelFilter::Warn));
    assert_eq!(parse_level("fatal"), Some(LevelFilter::Error));
    assert_eq!(parse_level("panic"), Some(LevelFilter::Off));
    assert_eq!(parse_level("off"), Some(LevelFilter::Off));
    assert_eq!(parse_level("warning"), Some(LevelFilter::Warn));
    assert_eq!(parse_level("loud"), None);
}
