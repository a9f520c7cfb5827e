//! Error types for the analysis pipeline.

use thiserror::Error;

/// Errors that can occur while configuring or running the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid or unreadable settings.
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem failure while loading documents or settings.
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    /// The document store rejected or failed an operation.
    #[error("store error: {0}")]
    Store(String),

    /// A referenced document does not exist in the store.
    #[error("unknown document: {0}")]
    UnknownDocument(u64),

    /// Encoding or decoding persisted values failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
