//! Error types for model client operations.

use thiserror::Error;

/// Errors that can occur while talking to the language model.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Network or transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// The API accepted the request but processing failed.
    #[error("model processing failed: {0}")]
    ProcessingFailed(String),
}
