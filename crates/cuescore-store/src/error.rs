//! Error types for the persistence layer.
//!
//! Only writes surface errors. Reads never fail outward: a missing,
//! malformed, or stale document is discarded and replaced by a fresh
//! ledger (see [`crate::codec`]).

/// Errors that can occur while writing to a storage medium.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A filesystem operation failed.
    #[error("storage I/O error on {key}: {source}")]
    Io {
        /// The document key being accessed.
        key: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The key cannot be mapped onto the medium.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}
