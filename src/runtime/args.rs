//! Command line flags. They override settings from the config file and environment.

use std::path::PathBuf;

use log::LevelFilter;
use thiserror::Error;

use crate::config::{Settings, parse_level};

pub const USAGE: &str = "\
Usage: nspotify [flags]

Flags:
  --verbose            show debugging messages (same as --log-level=trace)
  --quiet              suppress messages (same as --log-level=panic)
  --log-level=LEVEL    trace, debug, info, warn, error, fatal or panic
  --color[=BOOL]       display in color (default true)
  --no-color           same as --color=false
  --port=PORT          port of the login redirect (default 8080)
  --cache=DIR          token cache directory (default ~/.local/nspotify)
  --no-cache           neither read nor write the token cache
  --device=ID          device receiving playback commands
  --list-devices       list available devices and exit
  --help               show this message
";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    #[error("unknown flag: {0}")]
    Unknown(String),
    #[error("flag needs a value: {0}")]
    MissingValue(String),
    #[error("invalid value {value:?} for flag {flag}")]
    InvalidValue { flag: String, value: String },
    #[error("unexpected argument: {0}")]
    Unexpected(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    pub verbose: bool,
    pub quiet: bool,
    pub log_level: Option<LevelFilter>,
    pub color: Option<bool>,
    pub port: Option<u16>,
    pub cache: Option<PathBuf>,
    pub no_cache: bool,
    pub device: Option<String>,
    pub list_devices: bool,
    pub help: bool,
}

fn parse_bool(flag: &str, value: &str) -> Result<bool, ArgsError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "yes" | "on" => Ok(true),
        "0" | "f" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(flag, value)),
    }
}

fn invalid(flag: &str, value: &str) -> ArgsError {
    ArgsError::InvalidValue {
        flag: flag.to_string(),
        value: value.to_string(),
    }
}

/// Parse flags (without the program name). Flags take one or two leading
/// dashes; values follow `=` or come as the next argument.
pub fn parse<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = Args::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let Some(flag) = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-')) else {
            return Err(ArgsError::Unexpected(arg.clone()));
        };
        let (name, inline) = match flag.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (flag, None),
        };

        // Boolean flags only take a value after `=`.
        let switch = |inline: &Option<String>| match inline {
            Some(value) => parse_bool(name, value),
            None => Ok(true),
        };
        let mut value = || {
            inline
                .clone()
                .or_else(|| args.next())
                .ok_or_else(|| ArgsError::MissingValue(name.to_string()))
        };

        match name {
            "verbose" => parsed.verbose = switch(&inline)?,
            "quiet" => parsed.quiet = switch(&inline)?,
            "color" => parsed.color = Some(switch(&inline)?),
            "no-color" => parsed.color = Some(!switch(&inline)?),
            "no-cache" => parsed.no_cache = switch(&inline)?,
            "list-devices" => parsed.list_devices = switch(&inline)?,
            "help" | "h" => parsed.help = true,
            "log-level" => {
                let level = value()?;
                parsed.log_level = Some(parse_level(&level).ok_or_else(|| invalid(name, &level))?);
            }
            "port" => {
                let port = value()?;
                parsed.port = Some(port.parse().map_err(|_| invalid(name, &port))?);
            }
            "cache" => parsed.cache = Some(PathBuf::from(value()?)),
            "device" => parsed.device = Some(value()?),
            _ => return Err(ArgsError::Unknown(arg.clone())),
        }
    }

    Ok(parsed)
}

impl Args {
    /// Explicit `--log-level` wins over `--quiet`, which wins over `--verbose`.
    pub fn level(&self) -> Option<LevelFilter> {
        if let Some(level) = self.log_level {
            Some(level)
        } else if self.quiet {
            Some(LevelFilter::Off)
        } else if self.verbose {
            Some(LevelFilter::Trace)
        } else {
            None
        }
    }

    pub fn apply(&self, settings: &mut Settings) {
        if let Some(level) = self.level() {
            settings.logging.level = level.to_string().to_ascii_lowercase();
        }
        if let Some(color) = self.color {
            settings.logging.color = color;
        }
        if let Some(port) = self.port {
            settings.spotify.auth_port = port;
        }
        if let Some(cache) = &self.cache {
            settings.spotify.cache_dir = Some(cache.clone());
        }
        if self.no_cache {
            settings.spotify.no_cache = true;
        }
        if let Some(device) = &self.device {
            settings.spotify.device = Some(device.clone());
        }
        if self.list_devices {
            settings.spotify.device = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(args: &[&str]) -> Result<Args, ArgsError> {
        parse(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn no_flags_changes_nothing() {
        let args = parse_all(&[]).unwrap();
        assert_eq!(args, Args::default());

        let mut settings = Settings::default();
        args.apply(&mut settings);
        assert_eq!(settings.logging.level, "error");
        assert_eq!(settings.spotify.auth_port, 8080);
        assert_eq!(settings.spotify.device, None);
    }

    #[test]
    fn values_follow_equals_or_next_argument() {
        let args = parse_all(&["-device=abc", "--port", "9090", "--cache=/tmp/tok"]).unwrap();
        assert_eq!(args.device.as_deref(), Some("abc"));
        assert_eq!(args.port, Some(9090));
        assert_eq!(args.cache, Some(PathBuf::from("/tmp/tok")));
    }

    #[test]
    fn boolean_flags_accept_explicit_values() {
        let args = parse_all(&["-color=false", "--no-cache", "-list-devices=true"]).unwrap();
        assert_eq!(args.color, Some(false));
        assert!(args.no_cache);
        assert!(args.list_devices);

        assert_eq!(parse_all(&["--no-color"]).unwrap().color, Some(false));
    }

    #[test]
    fn explicit_level_beats_quiet_beats_verbose() {
        assert_eq!(parse_all(&["--verbose"]).unwrap().level(), Some(LevelFilter::Trace));
        assert_eq!(
            parse_all(&["--verbose", "--quiet"]).unwrap().level(),
            Some(LevelFilter::Off)
        );
        assert_eq!(
            parse_all(&["--quiet", "--log-level=debug"]).unwrap().level(),
            Some(LevelFilter::Debug)
        );
        assert_eq!(
            parse_all(&["-log-level", "fatal"]).unwrap().level(),
            Some(LevelFilter::Error)
        );
    }

    #[test]
    fn bad_input_is_reported() {
        assert_eq!(
            parse_all(&["--bogus"]),
            Err(ArgsError::Unknown("--bogus".into()))
        );
        assert_eq!(
            parse_all(&["--device"]),
            Err(ArgsError::MissingValue("device".into()))
        );
        assert_eq!(
            parse_all(&["--port=http"]),
            Err(ArgsError::InvalidValue {
                flag: "port".into(),
                value: "http".into()
            })
        );
        assert!(matches!(
            parse_all(&["--log-level=loud"]),
            Err(ArgsError::InvalidValue { .. })
        ));
        assert_eq!(
            parse_all(&["Music"]),
            Err(ArgsError::Unexpected("Music".into()))
        );
    }

    #[test]
    fn apply_overrides_settings() {
        let mut settings = Settings::default();
        parse_all(&["--quiet", "--no-color", "--port=9999", "--no-cache", "--device=dev"])
            .unwrap()
            .apply(&mut settings);

        assert_eq!(settings.logging.level, "off");
        assert!(!settings.logging.color);
        assert_eq!(settings.spotify.auth_port, 9999);
        assert!(settings.spotify.no_cache);
        assert_eq!(settings.spotify.device.as_deref(), Some("dev"));
    }

    #[test]
    fn list_devices_clears_the_device() {
        let mut settings = Settings::default();
        settings.spotify.device = Some("configured".into());
        parse_all(&["--list-devices"]).unwrap().apply(&mut settings);
        assert_eq!(settings.spotify.device, None);
    }
}
