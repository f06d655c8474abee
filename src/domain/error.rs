//! # Errors
//!
//! Failure types at the key-value and state mirror boundaries.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("value at {key} is not an integer")]
    NotAnInteger { key: String },
}

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Encoding or decoding a record failed. Records are always written by
    /// this crate, so this indicates a programming error.
    #[error("codec failure for {key}: {source}")]
    Codec {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl MirrorError {
    pub fn codec(key: impl Into<String>, source: serde_json::Error) -> Self {
        MirrorError::Codec {
            key: key.into(),
            source,
        }
    }

    pub fn is_codec(&self) -> bool {
        matches!(self, MirrorError::Codec { .. })
    }
}
