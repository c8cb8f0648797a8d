//! Error types for CupChat

use thiserror::Error;

/// Result type alias for CupChat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in CupChat operations
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to load or run the embedding model
    #[error("embedding error: {0}")]
    Embedding(String),

    /// The generative-text service call failed
    #[error("generation service error: {0}")]
    Generation(String),

    /// Query reformulation could not produce paraphrases
    #[error("reformulation failed: {0}")]
    ReformulationFailed(String),

    /// Answer composition could not produce an answer
    #[error("answer generation failed: {0}")]
    GenerationFailed(String),

    /// Failed to read or write the persisted embedding cache
    #[error("cache error: {0}")]
    Cache(String),

    /// Failed to load the document source
    #[error("load error: {0}")]
    Load(String),

    /// Invalid input provided
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
