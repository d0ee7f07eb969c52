use std::ops::Range;

use super::{Dims, Variant, multiply_full, soften};
use crate::error::Result;
use crate::matrix::Matrix;

/// Classic i-j-k multiplication over one rectangle of the output.
///
/// This is the textbook triple loop. The innermost loop reads B with
/// stride `n` (column-wise), which is what the transposed variant avoids.
///
/// Every cell in `rows × cols` is computed from scratch (C = A * B, no
/// accumulation) and handed to `write` with its linear output index.
///
/// # Arguments
///
/// * `a` - Matrix A (m × l), row-major
/// * `b` - Matrix B (l × n), row-major
/// * `rows`, `cols` - Output rectangle to compute
pub fn classic_block<W>(
    a: &[f32],
    b: &[f32],
    dims: Dims,
    rows: Range<usize>,
    cols: Range<usize>,
    mut write: W,
) where
    W: FnMut(usize, f32),
{
    let Dims { n, l, .. } = dims;

    for i in rows {
        for j in cols.clone() {
            let mut sum = 0.0f32;
            for k in 0..l {
                sum += a[i * l + k] * b[k * n + j];
            }
            write(i * n + j, sum);
        }
    }
}

/// `m1 * m2`, or the mismatch as an error when `m1.cols() != m2.rows()`.
pub fn try_multiply_classic(m1: &Matrix, m2: &Matrix) -> Result<Matrix> {
    multiply_full(Variant::Classic, m1, m2)
}

/// `m1 * m2` on the calling thread.
///
/// On a shape mismatch this logs a warning and returns a zero matrix of
/// shape `(m1.rows(), m2.cols())` instead of failing, so a benchmark loop
/// keeps running. Use [`try_multiply_classic`] to get the error.
pub fn multiply_classic(m1: &Matrix, m2: &Matrix) -> Matrix {
    soften(
        try_multiply_classic(m1, m2),
        Variant::Classic.output_shape(m1, m2),
    )
}
