use std::fmt;

use crate::grid::ResultGrid;

/// Statistics over the cells of a grid that are neither NaN nor no-data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSummary {
    pub rows: usize,
    pub cols: usize,
    pub valid: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl GridSummary {
    /// `nodata` is compared against cell values as they are in `grid`, so
    /// pass the scaled sentinel for converted grids.
    pub fn of(grid: &ResultGrid, nodata: f64) -> Self {
        let (rows, cols) = grid.dim();
        let valid_values: Vec<f64> = grid
            .iter()
            .copied()
            .filter(|v| !v.is_nan() && *v != nodata)
            .collect();

        let (min, max, mean) = if valid_values.is_empty() {
            (f64::NAN, f64::NAN, f64::NAN)
        } else {
            (
                valid_values.iter().fold(f64::INFINITY, |a, &b| a.min(b)),
                valid_values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
                valid_values.iter().sum::<f64>() / valid_values.len() as f64,
            )
        };

        Self {
            rows,
            cols,
            valid: valid_values.len(),
            min,
            max,
            mean,
        }
    }

    pub fn total(&self) -> usize {
        self.rows * self.cols
    }
}

impl fmt::Display for GridSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Shape: {} rows x {} columns", self.rows, self.cols)?;
        writeln!(f, "  Min: {:.4}", self.min)?;
        writeln!(f, "  Max: {:.4}", self.max)?;
        writeln!(f, "  Mean: {:.4}", self.mean)?;
        write!(
            f,
            "  Valid cells: {} / {} ({:.1}%)",
            self.valid,
            self.total(),
            if self.total() == 0 {
                0.0
            } else {
                100.0 * self.valid as f64 / self.total() as f64
            }
        )
    }
}
