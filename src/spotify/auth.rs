//! Authorization-code login against the Spotify accounts service.

use std::fmt;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use log::{debug, info, warn};
use thiserror::Error;

use super::cache::{Token, TokenCache};
use super::error::RemoteError;
use super::types::TokenResponse;

const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const SCOPES: &str = "user-library-read user-read-playback-state user-modify-playback-state";
const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no client id configured (set spotify.client_id or NSPOTIFY__SPOTIFY__CLIENT_ID)")]
    MissingClientId,
    #[error("login was denied: {0}")]
    Denied(String),
    #[error("redirect carries no authorization code")]
    MissingCode,
    #[error("invalid state in redirect: {0:?}")]
    StateMismatch(String),
    #[error("token request failed: {0}")]
    Request(#[from] RemoteError),
    #[error("token was not refreshed: no refresh token available")]
    NoRefreshToken,
    #[error("could not read the redirect URL: {0}")]
    Io(#[from] io::Error),
    #[error("could not generate login state: {0}")]
    Random(String),
}

/// Application credentials plus the registered redirect URI.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Local port the redirect listener binds.
    pub port: u16,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("port", &self.port)
            .finish()
    }
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>, port: u16) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: format!("http://localhost:{port}"),
            port,
        }
    }

    fn basic_auth(&self) -> String {
        let pair = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", STANDARD.encode(pair))
    }
}

#[derive(Debug)]
pub struct Authenticator {
    agent: ureq::Agent,
    credentials: Credentials,
    cache: Option<TokenCache>,
}

impl Authenticator {
    pub fn new(agent: ureq::Agent, credentials: Credentials, cache: Option<TokenCache>) -> Self {
        Self {
            agent,
            credentials,
            cache,
        }
    }

    pub fn authorize_url(&self, state: &str) -> String {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", self.credentials.redirect_uri.as_str()),
            ("scope", SCOPES),
            ("state", state),
        ];
        let query: Vec<String> = params
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect();
        format!("{AUTHORIZE_URL}?{}", query.join("&"))
    }

    /// Extract the authorization code from the URL the browser was redirected to.
    pub fn parse_redirect(redirect: &str, expected_state: &str) -> Result<String, AuthError> {
        let redirect = redirect.trim();
        let query = redirect
            .split_once('?')
            .map_or(redirect, |(_, query)| query);
        let query = query.split('#').next().unwrap_or_default();

        let mut code = None;
        let mut state = None;
        let mut error = None;
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());
            match key {
                "code" => code = Some(value),
                "state" => state = Some(value),
                "error" => error = Some(value),
                _ => {}
            }
        }

        let state = state.unwrap_or_default();
        if state != expected_state {
            return Err(AuthError::StateMismatch(state));
        }
        if let Some(error) = error {
            return Err(AuthError::Denied(error));
        }
        code.filter(|c| !c.is_empty()).ok_or(AuthError::MissingCode)
    }

    fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, RemoteError> {
        let response = self
            .agent
            .post(TOKEN_URL)
            .set("Authorization", &self.credentials.basic_auth())
            .send_form(form)
            .map_err(|err| RemoteError::from_ureq(TOKEN_URL, err))?;
        response
            .into_json::<TokenResponse>()
            .map_err(|err| RemoteError::Decode {
                endpoint: TOKEN_URL.to_string(),
                message: err.to_string(),
            })
    }

    pub fn exchange_code(&self, code: &str) -> Result<Token, AuthError> {
        let response = self.request_token(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.credentials.redirect_uri.as_str()),
        ])?;
        Ok(Token::new(
            response.access_token,
            response.refresh_token,
            response.expires_in,
        ))
    }

    pub fn refresh(&self, token: &Token) -> Result<Token, AuthError> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or(AuthError::NoRefreshToken)?;
        let response = self.request_token(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])?;
        // The accounts service only sometimes rotates the refresh token.
        let refresh_token = response
            .refresh_token
            .or_else(|| token.refresh_token.clone());
        Ok(Token::new(
            response.access_token,
            refresh_token,
            response.expires_in,
        ))
    }

    fn store(&self, token: &Token) {
        if let Some(cache) = &self.cache {
            if let Err(err) = cache.write(token) {
                warn!("failed to cache token: {err}");
            }
        }
    }

    fn cached_token(&self) -> Option<Token> {
        let cached = self.cache.as_ref()?.read().ok()?;
        if !cached.is_expired() {
            return Some(cached);
        }
        debug!("cached token expired, refreshing...");
        match self.refresh(&cached) {
            Ok(token) => {
                self.store(&token);
                Some(token)
            }
            Err(err) => {
                warn!("failed to refresh cached token: {err}");
                None
            }
        }
    }

    /// Log in with the cached token when possible, otherwise walk the user
    /// through the authorization-code flow. The redirect is taken by a local
    /// listener on the configured port; when that port cannot be bound the
    /// user pastes the redirected URL into `input` instead.
    pub fn authenticate<R: BufRead, W: Write>(
        self,
        mut input: R,
        mut output: W,
    ) -> Result<Session, AuthError> {
        if self.credentials.client_id.is_empty() {
            return Err(AuthError::MissingClientId);
        }

        if let Some(token) = self.cached_token() {
            debug!("authenticated from cache");
            return Ok(Session::new(self, token));
        }

        let state = make_state()?;
        writeln!(output, "Log in to Spotify at: {}", self.authorize_url(&state))?;
        let code = match TcpListener::bind(("127.0.0.1", self.credentials.port)) {
            Ok(listener) => {
                output.flush()?;
                info!("waiting for the login redirect on port {}", self.credentials.port);
                await_redirect(&listener, &state)?
            }
            Err(err) => {
                warn!(
                    "cannot listen for the login redirect on port {}: {err}",
                    self.credentials.port
                );
                writeln!(output, "Then paste the URL you were redirected to:")?;
                output.flush()?;
                let mut redirect = String::new();
                input.read_line(&mut redirect)?;
                Self::parse_redirect(&redirect, &state)?
            }
        };

        let token = self.exchange_code(&code)?;
        debug!("login succeeded");
        self.store(&token);
        Ok(Session::new(self, token))
    }
}

/// Serve requests on `listener` until the browser follows the login redirect,
/// then hand back the authorization code it carries.
fn await_redirect(listener: &TcpListener, expected_state: &str) -> Result<String, AuthError> {
    loop {
        let (mut stream, peer) = listener.accept()?;
        let target = match read_request_target(&stream) {
            Ok(target) => target,
            Err(err) => {
                debug!("ignoring connection from {peer}: {err}");
                continue;
            }
        };
        if !target.contains("state=") {
            respond(&mut stream, "404 Not Found", "Not found.");
            continue;
        }

        let result = Authenticator::parse_redirect(&target, expected_state);
        match &result {
            Ok(_) => respond(&mut stream, "200 OK", "Login succeeded, you can close this tab."),
            Err(err) => respond(&mut stream, "400 Bad Request", &format!("Login failed: {err}")),
        }
        return result;
    }
}

/// Read one HTTP request head and return the request-target of its request line.
fn read_request_target(stream: &TcpStream) -> io::Result<String> {
    stream.set_read_timeout(Some(REQUEST_READ_TIMEOUT))?;
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let target = request_line
        .split_whitespace()
        .nth(1)
        .map(str::to_string)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "malformed request line"))?;

    // Drain the headers so closing the socket does not reset the connection.
    let mut header = String::new();
    loop {
        header.clear();
        if reader.read_line(&mut header)? == 0 || header.trim().is_empty() {
            break;
        }
    }
    Ok(target)
}

fn respond(stream: &mut TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    if let Err(err) = stream.write_all(response.as_bytes()) {
        debug!("failed to answer the login redirect: {err}");
    }
}

fn make_state() -> Result<String, AuthError> {
    state_from(getrandom::fill)
}

fn state_from<E: fmt::Display>(
    fill: impl FnOnce(&mut [u8]) -> Result<(), E>,
) -> Result<String, AuthError> {
    let mut bytes = [0u8; 16];
    fill(&mut bytes).map_err(|err| AuthError::Random(err.to_string()))?;
    Ok(bytes.iter().map(|value| format!("{value:02x}")).collect())
}

/// Logged-in session shared by every API call. Refreshes its token on demand.
#[derive(Debug)]
pub struct Session {
    authenticator: Authenticator,
    token: Mutex<Token>,
}

impl Session {
    pub fn new(authenticator: Authenticator, token: Token) -> Self {
        Self {
            authenticator,
            token: Mutex::new(token),
        }
    }

    /// `Authorization` header value for the next request.
    pub fn bearer(&self) -> Result<String, RemoteError> {
        let mut token = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        if token.is_expired() {
            debug!("access token expired, refreshing...");
            let fresh = self
                .authenticator
                .refresh(&token)
                .map_err(|err| RemoteError::Auth(err.to_string()))?;
            self.authenticator.store(&fresh);
            *token = fresh;
        }
        Ok(format!("Bearer {}", token.access_token))
    }
}
