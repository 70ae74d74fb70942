//! Error types for the multiband compressor

use thiserror::Error;

/// Core error type
///
/// Every variant is a configuration problem reported at prepare/update time.
/// Nothing here is ever produced by the per-sample path.
#[derive(Error, Debug)]
pub enum MbcError {
    #[error("Missing parameter: {0}")]
    MissingParam(String),

    #[error("Parameter {name} is not finite: {value}")]
    NonFiniteParam { name: String, value: f32 },

    #[error("Unknown parameter: {0}")]
    UnknownParam(String),

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f32),

    #[error("Invalid channel count: {0}")]
    InvalidChannelCount(f32),

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for MbcError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias
pub type MbcResult<T> = Result<T, MbcError>;
