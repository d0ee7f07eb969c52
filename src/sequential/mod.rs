//! Single-threaded multiplication kernels.
//!
//! Both variants are written as block kernels: they compute one rectangle
//! of the output and hand each finished cell to a writer. The sequential
//! entry points run them over the whole output, the parallel engine runs
//! them over one block per unit of work.
//!
//! Available implementations:
//! - `classic`: right operand walked column-wise (stride `n`)
//! - `transposed`: right operand pre-transposed, walked row-wise

pub mod classic;
pub mod transposed;

use std::fmt;
use std::ops::Range;

use crate::error::{Execution, MatmulError, Result};
use crate::matrix::Matrix;

pub use classic::{multiply_classic, try_multiply_classic};
pub use transposed::{multiply_transposed, try_multiply_transposed};

/// Which accumulation rule a multiplication uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Triple loop, right operand walked column-wise.
    Classic,
    /// Right operand pre-transposed, both operands walked row-wise.
    Transposed,
}

impl Variant {
    /// The shape rule the variant enforces on its operands.
    pub fn rule(self) -> &'static str {
        match self {
            Variant::Classic => "Cols of m1 must match Rows of m2",
            Variant::Transposed => "Cols of m1 must match Cols of m2t",
        }
    }

    /// Shape of `m1 * right` under this variant, whether or not the inner
    /// dimensions agree.
    pub fn output_shape(self, m1: &Matrix, right: &Matrix) -> (usize, usize) {
        match self {
            Variant::Classic => (m1.rows(), right.cols()),
            Variant::Transposed => (m1.rows(), right.rows()),
        }
    }

    /// Run this variant's block kernel over `rows × cols` of the output.
    #[inline]
    pub(crate) fn run_block<W>(
        self,
        a: &[f32],
        b: &[f32],
        dims: Dims,
        rows: Range<usize>,
        cols: Range<usize>,
        write: W,
    ) where
        W: FnMut(usize, f32),
    {
        match self {
            Variant::Classic => classic::classic_block(a, b, dims, rows, cols, write),
            Variant::Transposed => transposed::transposed_block(a, b, dims, rows, cols, write),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Classic => f.write_str("Classic"),
            Variant::Transposed => f.write_str("Transposed"),
        }
    }
}

/// Product dimensions: output is `m × n`, inner dimension is `l`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims {
    pub m: usize,
    pub n: usize,
    pub l: usize,
}

/// Validate operand shapes for `variant` and return the product dimensions.
pub(crate) fn check_shapes(
    variant: Variant,
    execution: Execution,
    m1: &Matrix,
    right: &Matrix,
) -> Result<Dims> {
    let (m, n) = variant.output_shape(m1, right);
    let l = m1.cols();

    let inner = match variant {
        Variant::Classic => right.rows(),
        Variant::Transposed => right.cols(),
    };

    if l != inner {
        return Err(MatmulError::DimensionMismatch {
            variant,
            execution,
            left: m1.shape(),
            right: right.shape(),
            output: (m, n),
        });
    }

    Ok(Dims { m, n, l })
}

/// Turn a failed multiplication into a logged warning and a zero matrix of
/// the intended output shape.
pub(crate) fn soften(result: Result<Matrix>, output: (usize, usize)) -> Matrix {
    match result {
        Ok(product) => product,
        Err(e) => {
            log::warn!("{e}");
            Matrix::zeros(output.0, output.1)
        }
    }
}

/// Run `variant` over the full output on the calling thread.
pub(crate) fn multiply_full(variant: Variant, m1: &Matrix, right: &Matrix) -> Result<Matrix> {
    let dims = check_shapes(variant, Execution::Sequential, m1, right)?;
    let mut c = vec![0.0; dims.m * dims.n];

    variant.run_block(
        m1.as_slice(),
        right.as_slice(),
        dims,
        0..dims.m,
        0..dims.n,
        |idx, v| c[idx] = v,
    );

    Ok(Matrix::from_parts(dims.m, dims.n, c))
}
