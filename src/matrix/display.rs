//! Human-readable rendering of a matrix.

use std::fmt;

use super::Matrix;

/// Largest element count rendered as a full grid.
pub const DISPLAY_LIMIT: usize = 250;

/// Values shown from each end of a matrix too large to print in full.
pub const PREVIEW_LEN: usize = 5;

/// Format the first and last [`PREVIEW_LEN`] values of `values`.
pub(crate) fn write_preview<I, J>(f: &mut fmt::Formatter<'_>, first: I, last: J) -> fmt::Result
where
    I: IntoIterator<Item = f32>,
    J: IntoIterator<Item = f32>,
{
    write!(f, "Showing first {PREVIEW_LEN} indexes: ")?;
    write_joined(f, first, ", ")?;
    write!(f, "\nShowing last  {PREVIEW_LEN} indexes: ")?;
    write_joined(f, last, ", ")?;
    writeln!(f)
}

pub(crate) fn write_joined<I>(f: &mut fmt::Formatter<'_>, values: I, sep: &str) -> fmt::Result
where
    I: IntoIterator<Item = f32>,
{
    for (i, v) in values.into_iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{v}")?;
    }
    Ok(())
}

impl fmt::Display for Matrix {
    /// Full grid (one row per line, values separated by a space) up to
    /// [`DISPLAY_LIMIT`] elements, otherwise a preview of both ends.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.as_slice();

        if data.len() > DISPLAY_LIMIT {
            let tail = data.len() - PREVIEW_LEN;
            return write_preview(
                f,
                data[..PREVIEW_LEN].iter().copied(),
                data[tail..].iter().copied(),
            );
        }

        for i in 0..self.rows() {
            write_joined(f, self.row(i).iter().copied(), " ")?;
            writeln!(f)?;
        }
        Ok(())
    }
}
