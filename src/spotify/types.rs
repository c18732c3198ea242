//! Wire types of the Web API endpoints in use.

use serde::Deserialize;

use crate::library::{Track, TrackUri};
use crate::pipeline::Page;

#[derive(Debug, Deserialize)]
pub(crate) struct SavedTracksPage {
    #[serde(default)]
    pub items: Vec<SavedTrackItem>,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SavedTrackItem {
    pub track: Option<FullTrack>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FullTrack {
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<NamedItem>,
    pub album: Option<NamedItem>,
    #[serde(default)]
    pub duration_ms: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NamedItem {
    #[serde(default)]
    pub name: String,
}

impl From<FullTrack> for Track {
    fn from(t: FullTrack) -> Self {
        Track {
            uri: TrackUri::new(t.uri),
            name: t.name,
            artists: t.artists.into_iter().map(|a| a.name).collect(),
            album: t.album.map(|a| a.name).unwrap_or_default(),
            duration_ms: t.duration_ms,
        }
    }
}

impl From<SavedTracksPage> for Page {
    fn from(p: SavedTracksPage) -> Self {
        Page {
            // Items whose track was removed from the catalog come back as `null`.
            tracks: p
                .items
                .into_iter()
                .filter_map(|item| item.track)
                .map(Track::from)
                .collect(),
            next: p.next,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentlyPlaying {
    #[serde(default)]
    pub is_playing: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeviceList {
    #[serde(default)]
    pub devices: Vec<Device>,
}

/// A playback device reported by the player API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Device {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_restricted: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiErrorDetail {
    Regular { message: String },
    // The accounts service answers `{"error": "invalid_grant", "error_description": ...}`.
    Code(String),
}

/// Pull the human readable message out of an error body, falling back to the raw body.
pub(crate) fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody {
            error: ApiErrorDetail::Regular { message },
        }) => message,
        Ok(ApiErrorBody {
            error: ApiErrorDetail::Code(code),
        }) => code,
        Err(_) => body.trim().to_string(),
    }
}
