//! Session error types.

use thiserror::Error;

/// Errors that can occur when using a session or its backing store.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Failed to activate the backing store.
    #[error("Failed to activate store: {0}")]
    ActivationError(String),

    /// Failed to serialize or deserialize a value.
    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Failed to perform store operation.
    #[error("Store operation failed: {0}")]
    StoreError(String),

    /// Operation attempted before the store was activated.
    #[error("Store is not active")]
    Inactive,
}
