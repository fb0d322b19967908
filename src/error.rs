use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtboxError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request never got an HTTP response (DNS, connect, TLS, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The service answered 2xx but the body was not what we asked for.
    #[error("Response error: {0}")]
    Response(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl ArtboxError {
    /// Whether re-issuing the same request has a reasonable chance to succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ArtboxError::Transport(_) => true,
            ArtboxError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ArtboxError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ArtboxError::Response(e.to_string())
        } else if let Some(status) = e.status() {
            ArtboxError::Api {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            ArtboxError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ArtboxError {
    fn from(e: serde_json::Error) -> Self {
        ArtboxError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ArtboxError>;
