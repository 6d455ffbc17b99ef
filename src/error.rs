use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX write error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("rendered text is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("JSON write error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unreadable drawing: {0}")]
    UnreadableDrawing(#[from] dxf::DxfError),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("a workbook needs at least one table")]
    EmptyWorkbook,
}

/// A single entity that could not be turned into a text anchor or line segment.
///
/// Never returned to callers; the extractor logs it and moves on.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("skipped malformed {kind} on layer '{layer}': {reason}")]
pub struct MalformedEntity {
    pub kind: String,
    pub layer: String,
    pub reason: String,
}
