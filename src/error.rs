//! Error types shared by the kernels and the parallel engine.

use thiserror::Error;

use crate::matrix::Matrix;
use crate::sequential::Variant;

/// Result type alias for fallible matrix operations.
pub type Result<T> = std::result::Result<T, MatmulError>;

/// Execution model the failing call was running under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Execution {
    Sequential,
    Parallel,
}

impl Execution {
    fn label(self) -> &'static str {
        match self {
            Execution::Sequential => "",
            Execution::Parallel => " Parallel",
        }
    }
}

#[derive(Error, Debug)]
pub enum MatmulError {
    /// Operand shapes are incompatible for the requested variant.
    #[error(
        "{variant}{} Matrix Multiplication Failed: {}! (m1 is {}x{}, right operand is {}x{})",
        .execution.label(),
        .variant.rule(),
        .left.0,
        .left.1,
        .right.0,
        .right.1
    )]
    DimensionMismatch {
        variant: Variant,
        execution: Execution,
        left: (usize, usize),
        right: (usize, usize),
        /// Shape the product would have had.
        output: (usize, usize),
    },

    /// Task count is odd or smaller than two.
    #[error("Invalid task count {0}: the engine needs an even count of at least 2")]
    InvalidTaskCount(usize),

    #[error("Invalid dimension {rows}x{cols} for a buffer of {len} elements")]
    InvalidDimension { rows: usize, cols: usize, len: usize },

    #[error("Index {index} out of range for a matrix of {len} elements")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Parallel multiplication was cancelled")]
    Cancelled,

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl MatmulError {
    /// Zero-filled matrix shaped like the product that failed, if the error
    /// carries an output shape.
    pub fn placeholder(&self) -> Option<Matrix> {
        match self {
            MatmulError::DimensionMismatch { output, .. } => {
                Some(Matrix::zeros(output.0, output.1))
            }
            _ => None,
        }
    }
}
