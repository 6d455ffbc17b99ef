use crate::model::Table;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MergedOutput {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Stacks every table into one sheet-like grid with a leading `table_id` column.
pub(crate) fn merge_tables(tables: &[Table]) -> MergedOutput {
    let width = tables.iter().map(Table::width).max().unwrap_or(0);

    let mut headers = vec!["table_id".to_string()];
    headers.extend((1..=width).map(|index| format!("col_{index}")));

    let mut rows = Vec::new();
    for (index, table) in tables.iter().enumerate() {
        for data_row in table.padded_to(width).into_rows() {
            let mut row = Vec::with_capacity(width + 1);
            row.push((index + 1).to_string());
            row.extend(data_row);
            rows.push(row);
        }
    }

    MergedOutput { headers, rows }
}
