//! Error types for ritz-solver.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid vector dimensions: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A vector that must be normalised has a numerically zero norm.
    ///
    /// Raised when the start vector is zero or when the operator maps the
    /// current estimate to (near) zero. Restart with a different vector.
    #[error("degenerate vector: norm {norm:e} is below {threshold:e}")]
    DegenerateVector { norm: f64, threshold: f64 },

    #[error("invalid operator: {0}")]
    InvalidOperator(String),
}

pub type Result<T> = std::result::Result<T, Error>;
