use std::io;
use std::sync::Arc;

use log::debug;

use crate::config::{self, default_cache_dir};
use crate::spotify::{
    AuthError, Authenticator, Credentials, RemoteError, SpotifyClient, TokenCache, http_agent,
    render_device_table,
};

/// Token cache to use, or `None` when caching is disabled or no home directory exists.
pub fn token_cache(settings: &config::SpotifySettings) -> Option<TokenCache> {
    if settings.no_cache {
        return None;
    }
    settings
        .cache_dir
        .clone()
        .or_else(default_cache_dir)
        .map(TokenCache::new)
}

/// Log in (prompting on the terminal if needed) and build the API client.
pub fn connect(settings: &config::Settings) -> Result<SpotifyClient, AuthError> {
    let spotify = &settings.spotify;
    let agent = http_agent();
    let credentials = Credentials::new(
        spotify.client_id.clone(),
        spotify.client_secret.clone(),
        spotify.auth_port,
    );
    let authenticator = Authenticator::new(agent.clone(), credentials, token_cache(spotify));

    let session = authenticator.authenticate(io::stdin().lock(), io::stdout())?;
    debug!("authenticated");

    Ok(SpotifyClient::new(agent, Arc::new(session))
        .with_device(spotify.device.clone())
        .with_page_size(spotify.page_size))
}

/// Print the device table to stdout.
pub fn list_devices(client: &SpotifyClient) -> Result<(), RemoteError> {
    let devices = client.devices()?;
    print!("{}", render_device_table(&devices));
    Ok(())
}
