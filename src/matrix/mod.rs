//! Dense row-major matrix and the helpers built around it.
//!
//! A [`Matrix`] never changes shape once built. Transposing, splitting or
//! multiplying always allocates a fresh buffer for the result.

pub mod display;
pub mod grid;
pub mod split;
mod transpose;

use crate::error::{MatmulError, Result};

/// How a freshly allocated matrix is filled.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Fill {
    /// Every element is `0.0`.
    #[default]
    Zero,
    /// Element at linear index `k` is `k as f32`.
    Increment,
    /// Every element is the given value.
    Constant(f32),
}

impl Fill {
    /// `None` maps to [`Fill::Increment`], a value to [`Fill::Constant`].
    pub fn from_option(value: Option<f32>) -> Self {
        match value {
            Some(v) => Fill::Constant(v),
            None => Fill::Increment,
        }
    }

    #[inline]
    pub(crate) fn value_at(self, k: usize) -> f32 {
        match self {
            Fill::Zero => 0.0,
            Fill::Increment => k as f32,
            Fill::Constant(v) => v,
        }
    }
}

/// Row-major `rows × cols` matrix of `f32`.
///
/// Element `(i, j)` lives at linear index `i * cols + j`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    /// Allocate a `rows × cols` matrix filled according to `fill`.
    ///
    /// # Panics
    ///
    /// Panics if `rows * cols` overflows. Use [`Matrix::try_new`] to get an
    /// error instead.
    pub fn new(rows: usize, cols: usize, fill: Fill) -> Self {
        match Self::try_new(rows, cols, fill) {
            Ok(m) => m,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_new(rows: usize, cols: usize, fill: Fill) -> Result<Self> {
        let len = rows
            .checked_mul(cols)
            .ok_or(MatmulError::InvalidDimension { rows, cols, len: usize::MAX })?;

        let data = match fill {
            Fill::Zero => vec![0.0; len],
            Fill::Constant(v) => vec![v; len],
            Fill::Increment => (0..len).map(|k| fill.value_at(k)).collect(),
        };

        Ok(Self { rows, cols, data })
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::new(rows, cols, Fill::Zero)
    }

    pub fn increment(rows: usize, cols: usize) -> Self {
        Self::new(rows, cols, Fill::Increment)
    }

    pub fn filled(rows: usize, cols: usize, value: f32) -> Self {
        Self::new(rows, cols, Fill::Constant(value))
    }

    /// Wrap an existing row-major buffer.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(MatmulError::InvalidDimension {
                rows,
                cols,
                len: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Crate-internal constructor for buffers whose length is already known
    /// to be `rows * cols`.
    pub(crate) fn from_parts(rows: usize, cols: usize, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { rows, cols, data }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read the element at a linear (row-major) index.
    pub fn get(&self, index: usize) -> Result<f32> {
        self.data
            .get(index)
            .copied()
            .ok_or(MatmulError::IndexOutOfRange {
                index,
                len: self.data.len(),
            })
    }

    /// Read element `(row, col)`.
    pub fn at(&self, row: usize, col: usize) -> Result<f32> {
        if row >= self.rows || col >= self.cols {
            return Err(MatmulError::IndexOutOfRange {
                index: row.saturating_mul(self.cols).saturating_add(col),
                len: self.data.len(),
            });
        }
        self.get(row * self.cols + col)
    }

    /// The whole row-major buffer.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Row `i` as a slice.
    ///
    /// # Panics
    ///
    /// Panics if `i >= rows`.
    pub fn row(&self, i: usize) -> &[f32] {
        let idx = i * self.cols;
        &self.data[idx..(idx + self.cols)]
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}
