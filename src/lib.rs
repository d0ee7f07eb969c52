//! Matrix multiplication benchmarks: classic vs. transposed, one thread vs. many.
//!
//! Everything here works on `f32` matrices stored row-major. There are two
//! accumulation rules and two ways to run them:
//!
//! - classic: `C[i][j] = Σ A[i][k] * B[k][j]`, walking B column-wise
//! - transposed: B is transposed once up front so both operands are walked
//!   row-wise in the inner loop
//!
//! Either rule can run on the calling thread or split across a fixed number
//! of tasks. The parallel engine cuts the output into a `2 × (tasks / 2)`
//! grid of blocks and computes each block as its own unit of work.
//!
//! ## Usage
//!
//! ```
//! use matmul::{Matrix, multiply_classic, multiply_transposed};
//!
//! let a = Matrix::increment(2, 3);
//! let b = Matrix::increment(3, 2);
//!
//! let c = multiply_classic(&a, &b);
//! assert_eq!(c.as_slice(), &[10.0, 13.0, 28.0, 40.0]);
//!
//! let c_t = multiply_transposed(&a, &b.transpose());
//! assert_eq!(c, c_t);
//! ```
//!
//! For large matrices, split the work across tasks:
//!
//! ```
//! use matmul::{Matrix, Variant, multiply_parallel};
//!
//! let a = Matrix::filled(256, 256, 1.0);
//! let b = Matrix::filled(256, 256, 1.0);
//!
//! let c = multiply_parallel(&a, &b, 8, Variant::Classic);
//! assert!(c.as_slice().iter().all(|&v| v == 256.0));
//! ```
//!
//! ## Failure policy
//!
//! The plain entry points never fail: a shape mismatch is logged through
//! the `log` facade and a zero matrix of the intended output shape comes
//! back, so a benchmark loop keeps going. Every one of them has a `try_`
//! twin returning [`MatmulError`] for callers that want to stop.

pub mod error;
pub mod matrix;
pub mod sequential;
pub mod threaded;

pub use error::{Execution, MatmulError, Result};
pub use matrix::grid::Grid;
pub use matrix::{Fill, Matrix};
pub use sequential::{
    Variant, multiply_classic, multiply_transposed, try_multiply_classic, try_multiply_transposed,
};
pub use threaded::{CancellationToken, Engine, EngineConfig, multiply_parallel, try_multiply_parallel};

/// Single-threaded `m1 * right` under `variant`.
///
/// For [`Variant::Transposed`], `right` must already be transposed.
pub fn multiply(m1: &Matrix, right: &Matrix, variant: Variant) -> Matrix {
    match variant {
        Variant::Classic => multiply_classic(m1, right),
        Variant::Transposed => multiply_transposed(m1, right),
    }
}
