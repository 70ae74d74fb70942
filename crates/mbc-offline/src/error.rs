//! Error types for offline rendering

use mbc_core::MbcError;
use thiserror::Error;

/// Offline rendering errors
#[derive(Error, Debug)]
pub enum OfflineError {
    #[error("Input file not found: {0}")]
    InputNotFound(String),

    #[error("Failed to read audio file: {0}")]
    ReadError(String),

    #[error("Failed to write output file: {0}")]
    WriteError(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid preset: {0}")]
    InvalidPreset(String),

    #[error("Parameter error: {0}")]
    Params(#[from] MbcError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for offline operations
pub type OfflineResult<T> = Result<T, OfflineError>;
