use crate::model::{Table, TextAnchor};

/// Consecutive sparse rows needed to end a table.
pub const TABLE_BREAK_RUN: usize = 2;

/// Turns one band of anchors into row cells ordered left to right.
///
/// The narrowest gap between neighbours is taken as the row's column pitch.
/// Any gap that exceeds that pitch by more than `x_threshold` gets one
/// empty cell in front of the next anchor, so the row holds
/// `anchors + large gaps` cells. A row whose gaps are all equal never gets an
/// empty cell. Rows are not padded to a common width.
#[must_use]
pub fn infer_row_cells(anchors: &[TextAnchor], x_threshold: f64) -> Vec<String> {
    let mut sorted = anchors.iter().collect::<Vec<_>>();
    sorted.sort_by(|left, right| left.x.total_cmp(&right.x));

    let pitch = sorted
        .windows(2)
        .map(|pair| pair[1].x - pair[0].x)
        .min_by(f64::total_cmp)
        .unwrap_or(0.0);

    let mut cells = Vec::with_capacity(sorted.len());
    for (index, anchor) in sorted.iter().enumerate() {
        if index > 0 && anchor.x - sorted[index - 1].x - pitch > x_threshold {
            cells.push(String::new());
        }
        cells.push(anchor.text.clone());
    }
    cells
}

/// Splits a top-down sequence of bands into tables.
///
/// A band with fewer than two anchors is a separator, not data. One separator
/// on its own is absorbed; a run of [`TABLE_BREAK_RUN`] or more closes the
/// table being built, provided it already holds a row.
#[must_use]
pub fn segment_tables<B: AsRef<[TextAnchor]>>(bands: &[B], x_threshold: f64) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut current: Vec<Vec<String>> = Vec::new();
    let mut sparse_run = 0_usize;

    for band in bands {
        let anchors = band.as_ref();
        if anchors.len() < 2 {
            sparse_run += 1;
            if sparse_run >= TABLE_BREAK_RUN && !current.is_empty() {
                tables.push(Table::new(std::mem::take(&mut current)));
            }
            continue;
        }

        sparse_run = 0;
        current.push(infer_row_cells(anchors, x_threshold));
    }

    if !current.is_empty() {
        tables.push(Table::new(current));
    }

    tables
}
