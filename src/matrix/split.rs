//! Cutting a matrix into two halves.
//!
//! The parallel engine does not use these: it writes blocks of one shared
//! output instead of building sub-matrices. They are kept for inspecting
//! how an operand would be divided.

use super::Matrix;

impl Matrix {
    /// Split into a top and bottom half.
    ///
    /// The top half gets `rows / 2` rows, the bottom half the rest, so an
    /// odd row ends up at the bottom.
    pub fn split_horizontal(&self) -> [Matrix; 2] {
        let top_rows = self.rows() / 2;
        let cut = top_rows * self.cols();
        let (top, bottom) = self.as_slice().split_at(cut);

        [
            Matrix::from_parts(top_rows, self.cols(), top.to_vec()),
            Matrix::from_parts(self.rows() - top_rows, self.cols(), bottom.to_vec()),
        ]
    }

    /// Split into a left and right half.
    ///
    /// The left half gets `cols / 2` columns, the right half the rest.
    pub fn split_vertical(&self) -> [Matrix; 2] {
        let left_cols = self.cols() / 2;
        let right_cols = self.cols() - left_cols;

        let mut left = Vec::with_capacity(self.rows() * left_cols);
        let mut right = Vec::with_capacity(self.rows() * right_cols);

        for i in 0..self.rows() {
            let (l, r) = self.row(i).split_at(left_cols);
            left.extend_from_slice(l);
            right.extend_from_slice(r);
        }

        [
            Matrix::from_parts(self.rows(), left_cols, left),
            Matrix::from_parts(self.rows(), right_cols, right),
        ]
    }
}
