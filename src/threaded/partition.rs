//! Static block decomposition of the output matrix.
//!
//! The output is cut into a `2 × (task_count / 2)` grid: two row bands
//! split at `rows / 2`, and `task_count / 2` column bands of width
//! `cols / (task_count / 2)`. Task `i` owns row band `i / half` and column
//! band `i % half`.

use std::ops::Range;

use crate::error::{MatmulError, Result};

/// One rectangle of the output, owned by exactly one unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Index of the task that owns this block.
    pub task: usize,
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl Block {
    /// Number of output cells in the block.
    pub fn len(&self) -> usize {
        self.rows.len() * self.cols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols.is_empty()
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.rows.contains(&row) && self.cols.contains(&col)
    }

    /// Linear indices this block writes in an output with `n` columns.
    pub fn indices(&self, n: usize) -> impl Iterator<Item = usize> + '_ {
        self.rows
            .clone()
            .flat_map(move |i| self.cols.clone().map(move |j| i * n + j))
    }
}

/// Returns `task_count / 2`, or an error if the count is odd or below two.
pub fn half_tasks(task_count: usize) -> Result<usize> {
    if task_count < 2 || task_count % 2 != 0 {
        return Err(MatmulError::InvalidTaskCount(task_count));
    }
    Ok(task_count / 2)
}

/// Blocks for a `rows × cols` output split across `task_count` units.
///
/// The last row band and the last column band are stretched to the edge of
/// the output, so the blocks tile `[0, rows) × [0, cols)` exactly even when
/// `rows` is odd or `cols` is not a multiple of `task_count / 2`. Bands
/// other than the last may be empty when the output is smaller than the
/// grid.
pub fn compute_blocks(rows: usize, cols: usize, task_count: usize) -> Result<Vec<Block>> {
    blocks(rows, cols, task_count, true)
}

/// Same grid as [`compute_blocks`] without stretching the last bands.
///
/// When `rows` is odd the last row is never assigned, and the rightmost
/// `cols % (task_count / 2)` columns are never assigned either. Kept for
/// comparing against outputs produced by the plain band formula.
pub fn compute_blocks_truncating(
    rows: usize,
    cols: usize,
    task_count: usize,
) -> Result<Vec<Block>> {
    blocks(rows, cols, task_count, false)
}

fn blocks(rows: usize, cols: usize, task_count: usize, stretch: bool) -> Result<Vec<Block>> {
    let half = half_tasks(task_count)?;

    let half_rows = rows / 2;
    let col_band = cols / half;

    let blocks = (0..task_count)
        .map(|task| {
            let col_switch = task % half;
            let row_switch = (task - col_switch) / half;

            let row_begin = row_switch * half_rows;
            let col_begin = col_switch * col_band;

            let mut row_end = row_begin + half_rows;
            let mut col_end = col_begin + col_band;

            if stretch {
                if row_switch == 1 {
                    row_end = rows;
                }
                if col_switch == half - 1 {
                    col_end = cols;
                }
            }

            Block {
                task,
                rows: row_begin..row_end,
                cols: col_begin..col_end,
            }
        })
        .collect();

    Ok(blocks)
}
