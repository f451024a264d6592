//! Error types for the wedplan ecosystem.

use thiserror::Error;

/// Errors that can occur in wedplan operations.
#[derive(Error, Debug)]
pub enum WeddingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Document store error: {0}")]
    Store(String),

    #[error("Remote service error: {0}")]
    Remote(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sync session is closed")]
    SessionClosed,
}

impl WeddingError {
    pub fn not_found(kind: &'static str, id: &str) -> Self {
        WeddingError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<serde_json::Error> for WeddingError {
    fn from(e: serde_json::Error) -> Self {
        WeddingError::Serialization(e.to_string())
    }
}

/// Result type alias for wedplan operations.
pub type WeddingResult<T> = Result<T, WeddingError>;
