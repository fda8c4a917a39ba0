//! Error types for sampling operations

use thiserror::Error;

/// Errors reported by a [`TreeSource`](crate::TreeSource)
#[derive(Error, Debug)]
pub enum SourceError {
    /// The source has no more candidates to offer
    #[error("Source exhausted")]
    Exhausted,

    /// Fetching a batch failed
    #[error("Fetch failed: {0}")]
    Fetch(#[from] anyhow::Error),
}

/// Errors that can occur during sampling
#[derive(Error, Debug)]
pub enum SamplerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Candidate source error
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}

impl SamplerError {
    /// Whether the source reported exhaustion
    pub fn is_exhausted(&self) -> bool {
        matches!(self, SamplerError::Source(SourceError::Exhausted))
    }
}
