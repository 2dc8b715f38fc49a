//! Error types for matrix inversion and the inverse cache.

use thiserror::Error;

/// Errors raised while inverting a matrix or solving against its inverse.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InverseError {
    /// The matrix handed to the inversion primitive is not square.
    #[error("Matrix is not square: {rows}x{cols}")]
    NotSquare {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// No usable pivot was found, the matrix is singular within tolerance.
    #[error("Singular matrix: pivot at column {index} is zero or too small (value: {pivot})")]
    Singular {
        /// Column where elimination stalled
        index: usize,
        /// Largest candidate pivot magnitude found in that column
        pivot: f64,
    },

    /// Operand shapes do not line up.
    #[error("Dimensions not compatible for {op}: {lhs:?} and {rhs:?}")]
    DimensionMismatch {
        /// Operation that was attempted
        op: &'static str,
        /// Left-hand side (rows, cols)
        lhs: (usize, usize),
        /// Right-hand side (rows, cols)
        rhs: (usize, usize),
    },

    /// Input rows have different lengths.
    #[error("Ragged matrix: row {row} has {len} entries, expected {expected}")]
    Ragged {
        /// First offending row
        row: usize,
        /// Its length
        len: usize,
        /// Length of the first row
        expected: usize,
    },

    /// Solver configuration is unusable.
    #[error("Invalid solve configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with it
        reason: String,
    },
}

/// Result type for inversion and cache operations.
pub type InverseResult<T> = Result<T, InverseError>;

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
