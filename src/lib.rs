mod assign;
mod cluster;
mod code_pairs;
mod csv_out;
mod dxf_reader;
mod error;
mod grid;
mod merge;
mod model;
mod mtext;
mod options;
mod segment;
mod synthesize;
mod warning;
mod xlsx_out;

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::csv_out::{write_csv, write_csv_to_string};
use crate::merge::merge_tables;
use crate::warning::WarningCode;

pub use assign::{CellAssignment, assign_texts_to_cells};
pub use cluster::{RowBand, cluster_rows};
pub use code_pairs::RejectedEntity;
pub use dxf_reader::{
    EntityScan, LoadedDrawing, classify_entity, extract_entities, read_drawing,
    read_drawing_from_bytes,
};
pub use error::{ExtractError, MalformedEntity};
pub use grid::{Grid, build_grid};
pub use model::{
    AssignedCell, CellRect, DrawingEntity, ExtractedEntities, LineSegment, Table, TextAnchor,
    round_coord,
};
pub use options::{
    DEFAULT_X_THRESHOLD, DEFAULT_Y_THRESHOLD, ExtractOptions, LayerSelection, OutputFormat,
    Strategy,
};
pub use segment::{TABLE_BREAK_RUN, infer_row_cells, segment_tables};
pub use synthesize::build_tables_from_cells;
pub use warning::{ExtractWarning, WarningCode as ExtractWarningCode};
pub use xlsx_out::{sheet_name, write_xlsx, write_xlsx_to_bytes};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionReport {
    pub table_count: usize,
    pub row_count: usize,
    pub text_count: usize,
    pub line_count: usize,
    pub warnings: Vec<ExtractWarning>,
}

impl ExtractionReport {
    /// Nothing to export: no table was reconstructed. Not a failure.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table_count == 0
    }
}

fn extract_with_grid(
    entities: &ExtractedEntities,
    warnings: &mut Vec<ExtractWarning>,
) -> Vec<Table> {
    let grid = build_grid(&entities.lines);
    if grid.is_empty() {
        warnings.push(ExtractWarning::new(
            WarningCode::NoGridFound,
            "fewer than two distinct horizontal or vertical grid lines",
        ));
        return Vec::new();
    }

    let assignment = assign_texts_to_cells(&entities.texts, &grid.cells());
    if assignment.unassigned > 0 {
        warnings.push(
            ExtractWarning::new(
                WarningCode::TextOutsideGrid,
                "text outside the grid extent was dropped",
            )
            .with_count(assignment.unassigned),
        );
    }

    build_tables_from_cells(&assignment.cells)
}

fn extract_with_clustering(entities: &ExtractedEntities, options: &ExtractOptions) -> Vec<Table> {
    let bands = cluster_rows(&entities.texts, options.y_threshold);
    segment_tables(&bands, options.x_threshold)
}

/// Rebuilds tables from already extracted entities with the selected strategy.
#[must_use]
pub fn extract_tables(
    entities: &ExtractedEntities,
    options: &ExtractOptions,
) -> (Vec<Table>, Vec<ExtractWarning>) {
    let mut warnings = Vec::new();

    let tables = match options.strategy {
        Strategy::Grid => extract_with_grid(entities, &mut warnings),
        Strategy::Cluster => extract_with_clustering(entities, options),
    };

    let tables = tables
        .into_iter()
        .enumerate()
        .map(|(index, table)| {
            let width = table.width();
            let ragged = table.rows().iter().any(|row| row.len() != width);
            if !ragged {
                table
            } else if options.pad_rows {
                table.padded_to(width)
            } else {
                warnings.push(
                    ExtractWarning::new(
                        WarningCode::RaggedRows,
                        "rows have different cell counts; sheet will be ragged",
                    )
                    .with_table_id(index + 1),
                );
                table
            }
        })
        .collect::<Vec<_>>();

    if tables.is_empty() {
        warnings.push(ExtractWarning::new(
            WarningCode::NoTablesDetected,
            "no table was recognized in the drawing",
        ));
    }

    (tables, warnings)
}

fn extract_from_drawing(
    drawing: &LoadedDrawing,
    options: &ExtractOptions,
) -> (Vec<Table>, ExtractionReport) {
    let scan = extract_entities(drawing, options);
    let (tables, mut warnings) = extract_tables(&scan.entities, options);

    if scan.malformed > 0 {
        warnings.insert(
            0,
            ExtractWarning::new(
                WarningCode::MalformedEntitiesSkipped,
                "entities with unreadable geometry were skipped",
            )
            .with_count(scan.malformed),
        );
    }

    let report = ExtractionReport {
        table_count: tables.len(),
        row_count: tables.iter().map(Table::row_count).sum(),
        text_count: scan.entities.texts.len(),
        line_count: scan.entities.lines.len(),
        warnings,
    };

    if report.is_empty() {
        warn!("no table recognized in drawing");
    } else {
        info!(
            tables = report.table_count,
            rows = report.row_count,
            "tables extracted"
        );
    }

    (tables, report)
}

pub fn extract_dxf_tables(
    input_dxf: &Path,
    options: &ExtractOptions,
) -> Result<(Vec<Table>, ExtractionReport), ExtractError> {
    options.validate()?;
    let drawing = read_drawing(input_dxf)?;
    Ok(extract_from_drawing(&drawing, options))
}

pub fn extract_dxf_bytes_tables(
    input_dxf: &[u8],
    options: &ExtractOptions,
) -> Result<(Vec<Table>, ExtractionReport), ExtractError> {
    options.validate()?;
    let drawing = read_drawing_from_bytes(input_dxf)?;
    Ok(extract_from_drawing(&drawing, options))
}

#[derive(Serialize)]
struct JsonTables<'a> {
    tables: &'a [Table],
}

pub fn tables_to_json(tables: &[Table]) -> Result<String, ExtractError> {
    Ok(serde_json::to_string_pretty(&JsonTables { tables })?)
}

pub fn tables_to_csv(tables: &[Table], delimiter: u8) -> Result<String, ExtractError> {
    write_csv_to_string(&merge_tables(tables), delimiter)
}

/// Extracts tables and writes them to `output` in `format`.
///
/// When no table is found the output file is not created and the returned
/// report is empty.
pub fn extract_dxf_to_file(
    input_dxf: &Path,
    output: &Path,
    format: OutputFormat,
    options: &ExtractOptions,
) -> Result<ExtractionReport, ExtractError> {
    let (tables, report) = extract_dxf_tables(input_dxf, options)?;
    if report.is_empty() {
        return Ok(report);
    }

    match format {
        OutputFormat::Xlsx => write_xlsx(output, &tables)?,
        OutputFormat::Csv => write_csv(output, &merge_tables(&tables), options.delimiter)?,
        OutputFormat::Json => std::fs::write(output, tables_to_json(&tables)?)?,
    }

    Ok(report)
}

/// Byte-in, byte-out variant for callers that never touch the filesystem.
///
/// Returns `None` for the workbook when no table was found.
pub fn extract_dxf_bytes_to_xlsx(
    input_dxf: &[u8],
    options: &ExtractOptions,
) -> Result<(Option<Vec<u8>>, ExtractionReport), ExtractError> {
    let (tables, report) = extract_dxf_bytes_tables(input_dxf, options)?;
    if report.is_empty() {
        return Ok((None, report));
    }
    Ok((Some(write_xlsx_to_bytes(&tables)?), report))
}
