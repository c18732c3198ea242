use std::sync::Arc;
use std::time::Duration;

use log::trace;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::events::PlaybackControl;
use crate::library::{TrackId, TrackUri};
use crate::pipeline::{Page, SourceError, TrackSource};

use super::auth::Session;
use super::error::RemoteError;
use super::types::{CurrentlyPlaying, Device, DeviceList, SavedTracksPage};

const API_BASE: &str = "https://api.spotify.com/v1";

/// Blocking HTTP agent shared by the accounts and Web API calls.
pub fn http_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(5))
        .timeout_read(Duration::from_secs(15))
        .timeout_write(Duration::from_secs(15))
        .build()
}

/// Spotify Web API client backed by `ureq`. Cheap to clone; clones share the session.
#[derive(Clone)]
pub struct SpotifyClient {
    agent: ureq::Agent,
    session: Arc<Session>,
    device: Option<String>,
    page_size: u32,
}

impl SpotifyClient {
    pub fn new(agent: ureq::Agent, session: Arc<Session>) -> Self {
        Self {
            agent,
            session,
            device: None,
            page_size: 50,
        }
    }

    /// Scope player commands to one device.
    pub fn with_device(mut self, device: Option<String>) -> Self {
        self.device = device.filter(|d| !d.is_empty());
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, 50);
        self
    }

    fn player_url(&self, path: &str, mut params: Vec<(&str, String)>) -> String {
        if let Some(device) = &self.device {
            params.push(("device_id", device.clone()));
        }
        let mut url = format!("{API_BASE}/me/player{path}");
        if !params.is_empty() {
            let query: Vec<String> = params
                .iter()
                .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
                .collect();
            url.push('?');
            url.push_str(&query.join("&"));
        }
        url
    }

    /// GET `url` and decode its body. `None` on `204 No Content`.
    fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        url: &str,
    ) -> Result<Option<T>, RemoteError> {
        trace!("GET {url}");
        let response = self
            .agent
            .get(url)
            .set("Authorization", &self.session.bearer()?)
            .call()
            .map_err(|err| RemoteError::from_ureq(endpoint, err))?;
        if response.status() == 204 {
            return Ok(None);
        }
        response
            .into_json::<T>()
            .map(Some)
            .map_err(|err| RemoteError::Decode {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            })
    }

    fn send(
        &self,
        method: &str,
        endpoint: &str,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<(), RemoteError> {
        trace!("{method} {url}");
        let request = self
            .agent
            .request(method, url)
            .set("Authorization", &self.session.bearer()?);
        let result = match body {
            Some(body) => request.send_json(body),
            // The player endpoints insist on a Content-Length even without a body.
            None => request.send_bytes(&[]),
        };
        result
            .map(drop)
            .map_err(|err| RemoteError::from_ureq(endpoint, err))
    }

    fn saved_tracks(&self, url: &str) -> Result<Page, RemoteError> {
        let page: Option<SavedTracksPage> = self.get_json("/me/tracks", url)?;
        Ok(page.map(Page::from).unwrap_or_default())
    }

    /// Playback devices visible to the logged in user.
    pub fn devices(&self) -> Result<Vec<Device>, RemoteError> {
        let list: Option<DeviceList> =
            self.get_json("/me/player/devices", &format!("{API_BASE}/me/player/devices"))?;
        Ok(list.map(|l| l.devices).unwrap_or_default())
    }
}

impl TrackSource for SpotifyClient {
    fn first_page(&self) -> Result<Page, SourceError> {
        let url = format!("{API_BASE}/me/tracks?limit={}&offset=0", self.page_size);
        Ok(self.saved_tracks(&url)?)
    }

    fn next_page(&self, page: &Page) -> Result<Page, SourceError> {
        let url = page.next.as_deref().ok_or(SourceError::NoMorePages)?;
        Ok(self.saved_tracks(url)?)
    }
}

impl PlaybackControl for SpotifyClient {
    fn play(&self) -> Result<(), RemoteError> {
        let url = self.player_url("/play", Vec::new());
        self.send("PUT", "/me/player/play", &url, None)
    }

    fn pause(&self) -> Result<(), RemoteError> {
        let url = self.player_url("/pause", Vec::new());
        self.send("PUT", "/me/player/pause", &url, None)
    }

    fn play_uri(&self, uri: &TrackUri) -> Result<(), RemoteError> {
        let url = self.player_url("/play", Vec::new());
        let body = json!({ "uris": [uri.as_str()] });
        self.send("PUT", "/me/player/play", &url, Some(body))
    }

    fn queue(&self, id: &TrackId) -> Result<(), RemoteError> {
        let url = self.player_url("/queue", vec![("uri", id.to_uri().to_string())]);
        self.send("POST", "/me/player/queue", &url, None)
    }

    fn next(&self) -> Result<(), RemoteError> {
        let url = self.player_url("/next", Vec::new());
        self.send("POST", "/me/player/next", &url, None)
    }

    fn previous(&self) -> Result<(), RemoteError> {
        let url = self.player_url("/previous", Vec::new());
        self.send("POST", "/me/player/previous", &url, None)
    }

    fn current_status(&self) -> Result<bool, RemoteError> {
        let url = format!("{API_BASE}/me/player/currently-playing");
        let playing: Option<CurrentlyPlaying> =
            self.get_json("/me/player/currently-playing", &url)?;
        // 204: nothing is loaded on any device.
        Ok(playing.is_some_and(|p| p.is_playing))
    }
}
