//! Spotify Web API adapter.
//!
//! `SpotifyClient` is the catalog source of the fetch pipeline and the remote
//! control surface of the event dispatcher. Authentication and the token cache
//! live in `auth` and `cache`.

mod auth;
mod cache;
mod client;
mod devices;
mod error;
mod types;

pub use auth::{AuthError, Authenticator, Credentials};
pub use cache::TokenCache;
pub use client::{SpotifyClient, http_agent};
pub use devices::render_device_table;
pub use error::RemoteError;
