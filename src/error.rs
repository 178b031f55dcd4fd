//! Error taxonomy for the dreaming pipeline.
//!
//! Configuration problems are fatal before any loop starts; boundary and
//! store failures are surfaced to the driving loop, which decides whether
//! to retry, skip a turn, or transition to `Stopped`.

use thiserror::Error;

/// Errors that can surface from the generation-and-curation pipeline.
#[derive(Debug, Error)]
pub enum DreamError {
    /// Invalid or missing configuration. Raised at construction, never mid-loop.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The language-model or search endpoint could not be reached.
    #[error("boundary unavailable ({endpoint}): {reason}")]
    BoundaryUnavailable { endpoint: String, reason: String },

    /// The boundary was reachable but returned unusable output.
    #[error("generation failure: {0}")]
    GenerationFailure(String),

    /// A durable append failed. The loop aborts rather than diverging
    /// from the persisted record.
    #[error("store write failed: {0}")]
    StoreWrite(String),
}

impl DreamError {
    pub fn config(msg: impl Into<String>) -> Self {
        DreamError::Configuration(msg.into())
    }

    pub fn boundary(endpoint: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        DreamError::BoundaryUnavailable {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }

    /// True when a bounded retry is worth attempting.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DreamError::BoundaryUnavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, DreamError>;
