//! Error types for vocabulary persistence.
//!
//! Text operations (`learn`, `encode`, `decode`) never fail; only reading or
//! writing a vocabulary snapshot can.

use thiserror::Error;

/// Tokenizer errors
#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Result type for tokenizer operations
pub type Result<T> = std::result::Result<T, TokenizerError>;
