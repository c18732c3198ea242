use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const TOKEN_FILE: &str = "token.json";
// Tokens this close to expiry are refreshed before use.
const EXPIRY_MARGIN_SECS: u64 = 60;

/// OAuth token as persisted in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Expiry as seconds since the Unix epoch.
    pub expires_at: u64,
}

impl Token {
    pub fn new(access_token: String, refresh_token: Option<String>, expires_in: u64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: now_secs().saturating_add(expires_in),
        }
    }

    pub fn is_expired_at(&self, now: u64) -> bool {
        now.saturating_add(EXPIRY_MARGIN_SECS) >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_secs())
    }
}

pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cache file {} is not a token: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// `token.json` inside a private cache directory.
#[derive(Debug, Clone)]
pub struct TokenCache {
    dir: PathBuf,
}

impl TokenCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    pub fn read(&self) -> Result<Token, CacheError> {
        let path = self.path();
        let data = fs::read(&path).map_err(|source| CacheError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("found cache file: {}", path.display());

        let token = serde_json::from_slice(&data).map_err(|source| {
            warn!("failed to decode cached token");
            CacheError::Json {
                path: path.clone(),
                source,
            }
        })?;
        debug!("succeeded in reading cached token");
        Ok(token)
    }

    pub fn write(&self, token: &Token) -> Result<(), CacheError> {
        create_private_dir(&self.dir).map_err(|source| {
            warn!("failed to make cache directory: {}", self.dir.display());
            CacheError::Io {
                path: self.dir.clone(),
                source,
            }
        })?;

        let path = self.path();
        let data = serde_json::to_vec(token).map_err(|source| CacheError::Json {
            path: path.clone(),
            source,
        })?;
        write_private_file(&path, &data).map_err(|source| {
            warn!("failed to write cache file");
            CacheError::Io {
                path: path.clone(),
                source,
            }
        })?;

        debug!("succeeded in caching token");
        Ok(())
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

#[cfg(unix)]
fn write_private_file(path: &Path, data: &[u8]) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(data)
}

#[cfg(not(unix))]
fn write_private_file(path: &Path, data: &[u8]) -> io::Result<()> {
    fs::write(path, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> Token {
        Token {
            access_token: "access".into(),
            refresh_token: Some("refresh".into()),
            expires_at: 1_700_000_000,
        }
    }

    #[test]
    fn write_then_read_gives_back_the_token() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::new(dir.path().join("nested").join("nspotify"));

        cache.write(&token()).unwrap();
        assert_eq!(cache.read().unwrap(), token());
    }

    #[cfg(unix)]
    #[test]
    fn cache_files_are_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join("cache");
        let cache = TokenCache::new(&cache_dir);
        cache.write(&token()).unwrap();

        let dir_mode = fs::metadata(&cache_dir).unwrap().permissions().mode() & 0o777;
        let file_mode = fs::metadata(cache.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode, 0o700);
        assert_eq!(file_mode, 0o600);
    }

    #[test]
    fn missing_and_corrupt_files_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::new(dir.path());
        assert!(matches!(cache.read(), Err(CacheError::Io { .. })));

        fs::write(cache.path(), b"{not json").unwrap();
        assert!(matches!(cache.read(), Err(CacheError::Json { .. })));
    }

    #[test]
    fn token_without_refresh_token_still_decodes() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::new(dir.path());
        fs::write(cache.path(), br#"{"access_token": "a", "expires_at": 5}"#).unwrap();

        let token = cache.read().unwrap();
        assert_eq!(token.refresh_token, None);
        assert_eq!(token.expires_at, 5);
    }

    #[test]
    fn tokens_expire_shortly_before_their_deadline() {
        let t = token();
        assert!(!t.is_expired_at(t.expires_at - 120));
        assert!(t.is_expired_at(t.expires_at - 30));
        assert!(t.is_expired_at(t.expires_at + 1));
    }
}
