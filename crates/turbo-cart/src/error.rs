//! Cart error types.

use thiserror::Error;
use turbo_session::SessionError;

/// Errors that can occur in cart operations.
#[derive(Error, Debug)]
pub enum CartError {
    /// Item constructed without a usable id.
    #[error("Item id is missing or blank")]
    MissingItemId,

    /// Cart given a blank id.
    #[error("Cart id is missing or blank")]
    MissingCartId,

    /// Item configuration could not be interpreted.
    #[error("Invalid item configuration: {0}")]
    InvalidItemConfig(String),

    /// Stored cart was written by an unknown codec version.
    #[error("Unsupported stored cart version {found} (supported: {supported})")]
    UnsupportedVersion { found: u64, supported: u64 },

    /// Stored cart violates cart invariants.
    #[error("Corrupt stored cart: {0}")]
    CorruptCart(String),

    /// Session or backing store failure.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<serde_json::Error> for CartError {
    fn from(e: serde_json::Error) -> Self {
        CartError::SerializationError(e.to_string())
    }
}

impl From<toml::de::Error> for CartError {
    fn from(e: toml::de::Error) -> Self {
        CartError::ConfigError(e.to_string())
    }
}

impl From<toml::ser::Error> for CartError {
    fn from(e: toml::ser::Error) -> Self {
        CartError::ConfigError(e.to_string())
    }
}
