//! Double-indexed matrix: one heap row per matrix row.
//!
//! Same arithmetic as the linear [`Matrix`], different memory layout. It
//! exists so the benchmark can compare a `Vec<Vec<f32>>` against a flat
//! buffer.

use std::fmt;
use std::ops::{Index, Range};

use super::display::{DISPLAY_LIMIT, PREVIEW_LEN, write_joined, write_preview};
use super::{Fill, Matrix};
use crate::error::{Execution, MatmulError, Result};
use crate::sequential::Variant;
use crate::threaded::engine::{BlockKernel, Engine, SharedOutput};

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<f32>>,
}

impl Grid {
    /// `rows × cols` grid; element `(i, j)` gets the fill value of linear
    /// index `i * cols + j`.
    pub fn new(rows: usize, cols: usize, fill: Fill) -> Self {
        let cells = (0..rows)
            .map(|i| (0..cols).map(|j| fill.value_at(i * cols + j)).collect())
            .collect();
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, row: usize, col: usize) -> Result<f32> {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .ok_or(MatmulError::IndexOutOfRange {
                index: row.saturating_mul(self.cols).saturating_add(col),
                len: self.len(),
            })
    }

    fn from_flat(rows: usize, cols: usize, flat: Vec<f32>) -> Self {
        let cells = if cols == 0 {
            vec![Vec::new(); rows]
        } else {
            flat.chunks_exact(cols).map(<[f32]>::to_vec).collect()
        };
        Self { rows, cols, cells }
    }

    fn check(&self, other: &Grid, execution: Execution) -> Result<()> {
        if self.cols != other.rows {
            return Err(MatmulError::DimensionMismatch {
                variant: Variant::Classic,
                execution,
                left: (self.rows, self.cols),
                right: (other.rows, other.cols),
                output: (self.rows, other.cols),
            });
        }
        Ok(())
    }

    /// `self * other` with the classic triple loop.
    pub fn try_multiply(&self, other: &Grid) -> Result<Grid> {
        self.check(other, Execution::Sequential)?;

        let (m, n, l) = (self.rows, other.cols, self.cols);
        let cells = (0..m)
            .map(|i| {
                (0..n)
                    .map(|j| {
                        let mut sum = 0.0f32;
                        for k in 0..l {
                            sum += self[(i, k)] * other[(k, j)];
                        }
                        sum
                    })
                    .collect()
            })
            .collect();

        Ok(Self { rows: m, cols: n, cells })
    }

    /// Soft-failing [`Grid::try_multiply`]: a mismatch is logged and a zero
    /// grid of shape `(self.rows(), other.cols())` is returned.
    pub fn multiply(&self, other: &Grid) -> Grid {
        self.try_multiply(other).unwrap_or_else(|e| {
            log::warn!("{e}");
            Grid::new(self.rows, other.cols, Fill::Zero)
        })
    }

    /// `self * other` split across `task_count` units on rayon's global pool.
    pub fn try_multiply_parallel(&self, other: &Grid, task_count: usize) -> Result<Grid> {
        self.try_multiply_with(&Engine::global(task_count), other)
    }

    /// `self * other` on the given engine.
    pub fn try_multiply_with(&self, engine: &Engine, other: &Grid) -> Result<Grid> {
        self.check(other, Execution::Parallel)?;

        let (m, n) = (self.rows, other.cols);
        let kernel = GridKernel { a: self, b: other };
        let flat = engine.run_partitioned(m, n, None, &kernel)?;

        Ok(Self::from_flat(m, n, flat))
    }

    /// Soft-failing [`Grid::try_multiply_parallel`].
    pub fn multiply_parallel(&self, other: &Grid, task_count: usize) -> Grid {
        self.try_multiply_parallel(other, task_count)
            .unwrap_or_else(|e| {
                log::warn!("{e}");
                Grid::new(self.rows, other.cols, Fill::Zero)
            })
    }
}

impl Index<(usize, usize)> for Grid {
    type Output = f32;

    fn index(&self, (row, col): (usize, usize)) -> &f32 {
        &self.cells[row][col]
    }
}

struct GridKernel<'a> {
    a: &'a Grid,
    b: &'a Grid,
}

impl BlockKernel for GridKernel<'_> {
    fn compute(&self, rows: Range<usize>, cols: Range<usize>, out: &SharedOutput<'_>) {
        let n = self.b.cols;
        let l = self.a.cols;

        for i in rows {
            for j in cols.clone() {
                let mut sum = 0.0f32;
                for k in 0..l {
                    sum += self.a[(i, k)] * self.b[(k, j)];
                }
                // SAFETY: (i, j) is inside the block this unit owns.
                unsafe { out.write(i * n + j, sum) };
            }
        }
    }
}

impl Matrix {
    /// Copy a [`Grid`] into a row-major linear buffer.
    pub fn linearise(grid: &Grid) -> Matrix {
        let mut data = Vec::with_capacity(grid.len());
        for row in &grid.cells {
            data.extend_from_slice(row);
        }
        Matrix::from_parts(grid.rows, grid.cols, data)
    }
}

impl From<&Grid> for Matrix {
    fn from(grid: &Grid) -> Self {
        Matrix::linearise(grid)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.len() > DISPLAY_LIMIT {
            let flat = || self.cells.iter().flatten().copied();
            return write_preview(
                f,
                flat().take(PREVIEW_LEN),
                flat().skip(self.len() - PREVIEW_LEN),
            );
        }

        for row in &self.cells {
            write_joined(f, row.iter().copied(), " ")?;
            writeln!(f)?;
        }
        Ok(())
    }
}
