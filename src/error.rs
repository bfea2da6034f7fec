//! Error type for the recommendation pipeline.
//!
//! Everything below the [`Recommender`](crate::recommend::Recommender)
//! boundary returns [`Result`]. The recommender is the only place these
//! errors are caught; it swaps them for the fallback set.

use thiserror::Error;

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The embedding provider was unreachable, rate limited, or returned
    /// something that could not be read as a single vector.
    #[error("embedding provider error: {0}")]
    Provider(String),

    /// A vector with zero magnitude; cosine similarity is undefined.
    #[error("cannot compare a zero-magnitude vector")]
    DegenerateVector,

    /// Vectors of different lengths cannot be compared.
    #[error("vector length mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
}

impl Error {
    pub fn provider(msg: impl Into<String>) -> Self {
        Error::Provider(msg.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Provider(e.to_string())
    }
}
