use std::io;
use std::path::Path;

use csv::{Writer, WriterBuilder};

use crate::error::ExtractError;
use crate::merge::MergedOutput;

fn write_merged<W: io::Write>(
    mut writer: Writer<W>,
    merged: &MergedOutput,
) -> Result<W, ExtractError> {
    writer.write_record(&merged.headers)?;
    for row in &merged.rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|error| ExtractError::Io(error.into_error()))
}

pub(crate) fn write_csv(
    path: &Path,
    merged: &MergedOutput,
    delimiter: u8,
) -> Result<(), ExtractError> {
    let writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    write_merged(writer, merged)?.sync_all()?;
    Ok(())
}

pub(crate) fn write_csv_to_string(
    merged: &MergedOutput,
    delimiter: u8,
) -> Result<String, ExtractError> {
    let writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    Ok(String::from_utf8(write_merged(writer, merged)?)?)
}
