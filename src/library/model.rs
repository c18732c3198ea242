use std::fmt;

use thiserror::Error;

const TRACK_URI_PREFIX: &str = "spotify:track:";

/// Opaque `spotify:track:<id>` key attached to every track and listing row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackUri(String);

impl TrackUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve the URI into the bare track id used by the queue endpoint.
    pub fn track_id(&self) -> Result<TrackId, UriError> {
        let id = self
            .0
            .strip_prefix(TRACK_URI_PREFIX)
            .ok_or_else(|| UriError::NotATrack(self.0.clone()))?;

        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(UriError::MalformedId(self.0.clone()));
        }

        Ok(TrackId(id.to_string()))
    }
}

impl fmt::Display for TrackUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base62 track id, as accepted by the player queue endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackId(String);

impl TrackId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_uri(&self) -> TrackUri {
        TrackUri(format!("{TRACK_URI_PREFIX}{}", self.0))
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriError {
    #[error("not a track URI: {0:?}")]
    NotATrack(String),
    #[error("malformed track id in URI: {0:?}")]
    MalformedId(String),
}

/// One saved track of the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub uri: TrackUri,
    pub name: String,
    pub artists: Vec<String>,
    pub album: String,
    pub duration_ms: u64,
}
