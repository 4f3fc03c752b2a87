//! Error types shared by every kernel and the dispatcher.

use thiserror::Error;

/// Errors that can occur while building matrices or multiplying them.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatmulError {
    /// Construction arguments do not describe a valid `rows x cols` buffer.
    #[error("shape error: {rows}x{cols} matrix cannot hold {len} elements")]
    ShapeError { rows: usize, cols: usize, len: usize },

    /// Element access outside the matrix.
    #[error("index ({row}, {col}) out of range for {rows}x{cols} matrix")]
    IndexError {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Operands cannot be multiplied: `[m x k] @ [k2 x n]` with `k != k2`,
    /// or one of the dimensions is zero.
    #[error("matmul dimension mismatch: [{m}x{k}] @ [{k2}x{n}]")]
    DimensionMismatch {
        m: usize,
        k: usize,
        k2: usize,
        n: usize,
    },

    /// Unknown strategy identifier.
    #[error("invalid strategy: {0:?}")]
    InvalidStrategy(String),

    /// The output buffer could not be allocated.
    #[error("allocation failure: could not reserve {elements} elements")]
    AllocationFailure { elements: usize },

    /// A tuning option is out of range (zero block size, lane width, ...).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A worker thread of the threaded kernel panicked.
    #[error("worker {worker} failed: {reason}")]
    WorkerFailed { worker: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, MatmulError>;
