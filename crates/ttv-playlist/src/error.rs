use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request to {url} failed with HTTP {status}")]
    HttpStatus { status: StatusCode, url: String },
    #[error("playlist error: {0}")]
    Playlist(String),
    #[error("tls error: {0}")]
    Tls(#[from] rustls::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("no streams available for channel `{channel}`")]
    NoStreamsAvailable { channel: String },
}

