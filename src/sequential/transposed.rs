use std::ops::Range;

use super::{Dims, Variant, multiply_full, soften};
use crate::error::Result;
use crate::matrix::Matrix;

/// Multiplication with a pre-transposed B over one rectangle of the output.
///
/// With B stored as B^T (n × l), `bt[j * l + k]` is sequential in `k`, so
/// both operands are read row-wise in the inner loop. The transposition
/// itself is paid once by the caller, outside the hot loop.
///
/// # Arguments
///
/// * `a` - Matrix A (m × l), row-major
/// * `bt` - Transposed matrix B^T (n × l), row-major
/// * `rows`, `cols` - Output rectangle to compute
pub fn transposed_block<W>(
    a: &[f32],
    bt: &[f32],
    dims: Dims,
    rows: Range<usize>,
    cols: Range<usize>,
    mut write: W,
) where
    W: FnMut(usize, f32),
{
    let Dims { n, l, .. } = dims;

    for i in rows {
        let a_row = &a[i * l..(i + 1) * l];
        for j in cols.clone() {
            let bt_row = &bt[j * l..(j + 1) * l];
            let sum = a_row
                .iter()
                .zip(bt_row)
                .fold(0.0f32, |acc, (x, y)| acc + x * y);
            write(i * n + j, sum);
        }
    }
}

/// `m1 * m2t^T`, or the mismatch as an error when `m1.cols() != m2t.cols()`.
pub fn try_multiply_transposed(m1: &Matrix, m2t: &Matrix) -> Result<Matrix> {
    multiply_full(Variant::Transposed, m1, m2t)
}

/// `m1 * m2t^T` on the calling thread, where `m2t` is the already
/// transposed right operand.
///
/// Soft failure like [`super::multiply_classic`]: a mismatch yields a zero
/// matrix of shape `(m1.rows(), m2t.rows())` and a logged warning.
pub fn multiply_transposed(m1: &Matrix, m2t: &Matrix) -> Matrix {
    soften(
        try_multiply_transposed(m1, m2t),
        Variant::Transposed.output_shape(m1, m2t),
    )
}
