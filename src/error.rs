//! Error types for merge-spmm.
//!
//! A single [`SpmmError`] enum (built with [`thiserror`]) covers the fatal
//! conditions that abort before or during a kernel run, plus a [`Result`]
//! alias used throughout the crate.

use thiserror::Error;

/// Errors raised while building matrices, validating operand shapes, or
/// ingesting Matrix Market files.
#[derive(Debug, Error)]
pub enum SpmmError {
    /// A COO triple carried a row or column index outside the declared
    /// matrix dimensions during CSR construction.
    #[error("malformed input: index ({row}, {col}) out of bounds for {num_rows}x{num_cols} matrix")]
    MalformedInput {
        row: usize,
        col: usize,
        num_rows: usize,
        num_cols: usize,
    },

    /// An `X` or `Y` operand did not match the shape implied by the sparse
    /// matrix and the number of vectors.
    #[error(
        "dimension mismatch in buffer {buffer}: expected {expected_rows}x{expected_cols}, got {actual_rows}x{actual_cols}"
    )]
    DimensionMismatch {
        buffer: &'static str,
        expected_rows: usize,
        expected_cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },

    /// Underlying I/O failure while reading a matrix file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A Matrix Market line could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, SpmmError>;
