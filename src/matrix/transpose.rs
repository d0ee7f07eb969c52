use super::Matrix;

/// Writes the `cols × rows` transpose of the row-major `rows × cols` buffer
/// `src` into `dst`.
pub(crate) fn transpose(src: &[f32], dst: &mut [f32], rows: usize, cols: usize) {
    for i in 0..rows {
        for j in 0..cols {
            dst[j * rows + i] = src[i * cols + j];
        }
    }
}

impl Matrix {
    /// New `cols × rows` matrix with `result(j, i) == self(i, j)`.
    ///
    /// Eager: the transposed buffer is materialized, not a view.
    ///
    /// ```
    /// use matmul::Matrix;
    ///
    /// let m = Matrix::increment(2, 3);
    /// let t = m.transpose();
    ///
    /// assert_eq!(t.shape(), (3, 2));
    /// assert_eq!(t.as_slice(), &[0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
    /// assert_eq!(t.at(2, 1).unwrap(), m.at(1, 2).unwrap());
    /// ```
    pub fn transpose(&self) -> Matrix {
        let mut dst = vec![0.0; self.len()];
        transpose(self.as_slice(), &mut dst, self.rows(), self.cols());
        Matrix::from_parts(self.cols(), self.rows(), dst)
    }
}
