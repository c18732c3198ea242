use thiserror::Error;

/// Failure of a single Web API call. Never fatal on its own.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("{endpoint} returned HTTP {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },
    #[error("could not decode response of {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
    #[error("no usable access token: {0}")]
    Auth(String),
}

impl RemoteError {
    pub(crate) fn from_ureq(endpoint: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => {
                let body = response.into_string().unwrap_or_default();
                Self::Status {
                    endpoint: endpoint.to_string(),
                    status,
                    message: super::types::api_error_message(&body),
                }
            }
            ureq::Error::Transport(transport) => Self::Transport {
                endpoint: endpoint.to_string(),
                message: transport.to_string(),
            },
        }
    }
}
