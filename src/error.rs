//! Error types

use std::path::PathBuf;

/// Rejected stone placement. Always recoverable: the move is simply discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("({row}, {col}) is outside the {size}x{size} board")]
    OutOfBounds { row: u8, col: u8, size: usize },

    #[error("cell ({row}, {col}) is already occupied")]
    CellOccupied { row: u8, col: u8 },
}

/// Failure talking to an external collaborator (bot, session or record store).
///
/// Surfaced to the caller as a notification; game state is left unchanged.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{service} unavailable: {reason}")]
    Unavailable {
        service: &'static str,
        reason: String,
    },

    #[error("unexpected reply from {service}: {reply}")]
    Protocol {
        service: &'static str,
        reply: String,
    },

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CollaboratorError {
    pub fn unavailable(service: &'static str, reason: impl Into<String>) -> Self {
        CollaboratorError::Unavailable {
            service,
            reason: reason.into(),
        }
    }
}

/// Replay could not be built from the supplied match record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error("no replay data: {0}")]
    MissingReplayData(String),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
