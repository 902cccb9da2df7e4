//! Error types for configuration editing.

use thiserror::Error;

/// Failures surfaced by config state operations.
///
/// The controller stores these as strings in `last_error`; they are typed
/// here so callers driving [`crate::state::ConfigState`] directly can match.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The transport request failed.
    #[error("{method} failed: {message}")]
    Transport { method: String, message: String },

    /// A transport response did not have the expected shape.
    #[error("unexpected {method} response: {message}")]
    InvalidResponse { method: String, message: String },

    /// Raw text could not be turned back into a form value.
    #[error("raw config is not a JSON object: {0}")]
    RawParse(String),

    /// The form value could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
