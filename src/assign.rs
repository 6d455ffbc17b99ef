use crate::model::{AssignedCell, CellRect, TextAnchor};

/// Result of dropping text anchors into grid cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellAssignment {
    pub cells: Vec<AssignedCell>,
    /// Anchors that fell outside every cell.
    pub unassigned: usize,
}

/// Puts each anchor's text into the first cell (in `cells` order) containing it.
///
/// Bounds are inclusive, so an anchor on a shared edge goes to whichever
/// neighbour comes first. Texts sharing a cell are joined with `\n` in the
/// order the anchors were given.
#[must_use]
pub fn assign_texts_to_cells(texts: &[TextAnchor], cells: &[CellRect]) -> CellAssignment {
    let mut contents: Vec<Vec<&str>> = vec![Vec::new(); cells.len()];
    let mut unassigned = 0;

    for anchor in texts {
        match cells
            .iter()
            .position(|cell| cell.contains(anchor.x, anchor.y))
        {
            Some(index) => contents[index].push(anchor.text.as_str()),
            None => unassigned += 1,
        }
    }

    let cells = cells
        .iter()
        .zip(contents)
        .map(|(rect, texts)| AssignedCell {
            rect: *rect,
            text: texts.join("\n"),
        })
        .collect();

    CellAssignment { cells, unassigned }
}
