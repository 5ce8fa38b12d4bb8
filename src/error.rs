//! Error types for showreel

use thiserror::Error;

/// Error codes for every failure or degrade path the gallery knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Recovered locally, never surfaced
    ResolutionDegraded,
    PlaybackBlocked,
    SeekIgnored,

    // Host errors
    FullscreenRefused,

    // Embed errors
    EmbedLoadFailure,

    // Gallery errors
    UnknownCategory,
    EmptyCatalog,

    // Network errors
    NetworkError,

    // User errors
    InvalidConfig,

    // System errors
    FileError,
}

/// Main error type for showreel
#[derive(Error, Debug)]
pub enum ShowreelError {
    #[error("Playback blocked: {0}")]
    PlaybackBlocked(String),

    #[error("Embed failed to load ({url}): {reason}")]
    EmbedLoad { url: String, reason: String },

    #[error("Fullscreen request failed: {0}")]
    Fullscreen(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Catalog has no categories")]
    EmptyCatalog,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("File error: {0}")]
    File(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ShowreelError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::PlaybackBlocked(_) => ErrorCode::PlaybackBlocked,
            Self::EmbedLoad { .. } => ErrorCode::EmbedLoadFailure,
            Self::Fullscreen(_) => ErrorCode::FullscreenRefused,
            Self::UnknownCategory(_) => ErrorCode::UnknownCategory,
            Self::EmptyCatalog => ErrorCode::EmptyCatalog,
            Self::Network(_) => ErrorCode::NetworkError,
            Self::InvalidConfig(_) => ErrorCode::InvalidConfig,
            Self::File(_) => ErrorCode::FileError,
            Self::Http(_) => ErrorCode::NetworkError,
            Self::Json(_) => ErrorCode::InvalidConfig,
        }
    }
}

/// Outcome of a failed media operation.
///
/// Cloneable so a single rejection can be fanned out to every request
/// that was pending when it happened.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// The platform refused to start playback (autoplay policy, no gesture)
    #[error("not allowed: {0}")]
    NotAllowed(String),

    /// A pause arrived before the play request settled
    #[error("play request was interrupted by a pause")]
    Aborted,

    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl From<MediaError> for ShowreelError {
    fn from(err: MediaError) -> Self {
        Self::PlaybackBlocked(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShowreelError>;
