use std::io;
use thiserror::Error;

/// Custom error type for the sentiment dashboard
#[derive(Error, Debug)]
pub enum DashError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A REST request failed: network error, non-2xx status or bad body
    #[error("Request failed: {0}")]
    Request(String),

    /// A streamed frame could not be turned into a live event
    #[error("Malformed live event: {0}")]
    Decode(String),

    /// The live stream could not be opened or was dropped
    #[error("Live stream connection error: {0}")]
    Connection(String),

}

/// Result type alias for the sentiment dashboard
pub type Result<T> = std::result::Result<T, DashError>;

impl DashError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        DashError::Config(msg.into())
    }

    pub fn request<S: Into<String>>(msg: S) -> Self {
        DashError::Request(msg.into())
    }

    pub fn decode<S: Into<String>>(msg: S) -> Self {
        DashError::Decode(msg.into())
    }

    pub fn connection<S: Into<String>>(msg: S) -> Self {
        DashError::Connection(msg.into())
    }
}

impl From<reqwest::Error> for DashError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => DashError::Request(format!("HTTP {}: {}", status, err)),
            None => DashError::Request(err.to_string()),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for DashError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        DashError::Connection(err.to_string())
    }
}
