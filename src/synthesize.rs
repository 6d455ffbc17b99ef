use crate::model::{AssignedCell, Table};

/// Lays assigned cells out as one table.
///
/// Rows follow distinct cell-centre Y values from top to bottom; columns
/// follow centre X values from left to right. Grid mode yields at most one
/// table, and none when there are no cells.
#[must_use]
pub fn build_tables_from_cells(cells: &[AssignedCell]) -> Vec<Table> {
    let mut rows: Vec<(f64, Vec<(f64, &str)>)> = Vec::new();

    for cell in cells {
        let (center_x, center_y) = cell.rect.center();
        let row = match rows.iter().position(|(y, _)| *y == center_y) {
            Some(index) => &mut rows[index].1,
            None => {
                rows.push((center_y, Vec::new()));
                let last = rows.len() - 1;
                &mut rows[last].1
            }
        };

        match row.iter_mut().find(|(x, _)| *x == center_x) {
            Some(slot) => slot.1 = cell.text.as_str(),
            None => row.push((center_x, cell.text.as_str())),
        }
    }

    if rows.is_empty() {
        return Vec::new();
    }

    rows.sort_by(|left, right| right.0.total_cmp(&left.0));
    let rows = rows
        .into_iter()
        .map(|(_, mut columns)| {
            columns.sort_by(|left, right| left.0.total_cmp(&right.0));
            columns
                .into_iter()
                .map(|(_, text)| text.to_string())
                .collect::<Vec<_>>()
        })
        .collect();

    vec![Table::new(rows)]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::build_tables_from_cells;
    use crate::model::{AssignedCell, CellRect};

    fn cell(x0: f64, y0: f64, x1: f64, y1: f64, text: &str) -> AssignedCell {
        AssignedCell {
            rect: CellRect { x0, y0, x1, y1 },
            text: text.to_string(),
        }
    }

    #[test]
    fn orders_rows_top_down_and_columns_left_to_right() {
        // deliberately shuffled
        let cells = vec![
            cell(10.0, 0.0, 20.0, 10.0, "d"),
            cell(0.0, 10.0, 10.0, 20.0, "a"),
            cell(0.0, 0.0, 10.0, 10.0, "c"),
            cell(10.0, 10.0, 20.0, 20.0, "b"),
        ];
        let tables = build_tables_from_cells(&cells);
        assert_eq!(tables.len(), 1);
        assert_eq!(
            tables[0].rows(),
            &[
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string(), "d".to_string()],
            ]
        );
    }

    #[test]
    fn keeps_empty_cells_as_empty_strings() {
        let cells = vec![
            cell(0.0, 0.0, 10.0, 10.0, ""),
            cell(10.0, 0.0, 30.0, 10.0, "x"),
        ];
        let tables = build_tables_from_cells(&cells);
        assert_eq!(tables[0].rows(), &[vec![String::new(), "x".to_string()]]);
    }

    #[test]
    fn no_cells_means_no_table() {
        assert!(build_tables_from_cells(&[]).is_empty());
    }
}
