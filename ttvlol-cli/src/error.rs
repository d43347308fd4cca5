use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Playlist error: {0}")]
    Playlist(#[from] ttv_playlist::PlaylistError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Quality `{quality}` not available, choose from: {available}")]
    QualityNotFound { quality: String, available: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
