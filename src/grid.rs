use crate::model::{CellRect, LineSegment, round_coord};

/// Grid coordinates derived from axis-aligned line segments.
///
/// `x_vals` ascend left to right; `y_vals` descend so index 0 is the top edge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    pub x_vals: Vec<f64>,
    pub y_vals: Vec<f64>,
}

impl Grid {
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.y_vals.len().saturating_sub(1)
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.x_vals.len().saturating_sub(1)
    }

    /// True when either axis has fewer than two distinct coordinates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0 || self.column_count() == 0
    }

    /// Cells in row-major order: top row first, then left to right.
    #[must_use]
    pub fn cells(&self) -> Vec<CellRect> {
        let mut cells = Vec::with_capacity(self.row_count() * self.column_count());
        for rows in self.y_vals.windows(2) {
            for cols in self.x_vals.windows(2) {
                cells.push(CellRect {
                    x0: cols[0],
                    y0: rows[1],
                    x1: cols[1],
                    y1: rows[0],
                });
            }
        }
        cells
    }
}

fn distinct_sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.retain(|value| value.is_finite());
    values.sort_by(f64::total_cmp);
    values.dedup();
    values
}

/// Collects the distinct grid coordinates from horizontal and vertical segments.
///
/// Diagonal segments take no part.
#[must_use]
pub fn build_grid(lines: &[LineSegment]) -> Grid {
    let x_vals = lines
        .iter()
        .filter(|line| line.is_vertical())
        .flat_map(|line| [line.start.0, line.end.0])
        .map(round_coord)
        .collect::<Vec<_>>();
    let y_vals = lines
        .iter()
        .filter(|line| line.is_horizontal())
        .flat_map(|line| [line.start.1, line.end.1])
        .map(round_coord)
        .collect::<Vec<_>>();

    let x_vals = distinct_sorted(x_vals);
    let mut y_vals = distinct_sorted(y_vals);
    y_vals.reverse();

    Grid { x_vals, y_vals }
}
