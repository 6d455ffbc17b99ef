//! Minimal SpreadsheetML workbook writer: one worksheet per table.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use quick_xml::escape::escape;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::ExtractError;
use crate::model::Table;

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

#[must_use]
pub fn sheet_name(index: usize) -> String {
    format!("Table_{}", index + 1)
}

/// Spreadsheet column letters for a zero-based index: 0 -> A, 26 -> AA.
fn column_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + u8::try_from(index % 26).unwrap_or(0));
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}

/// XML 1.0 forbids most control characters even when escaped.
fn xml_text(value: &str) -> String {
    let cleaned = value
        .chars()
        .filter(|ch| !ch.is_control() || matches!(ch, '\t' | '\n' | '\r'))
        .collect::<String>();
    escape(&cleaned).into_owned()
}

#[derive(Default)]
struct SharedStrings {
    index: HashMap<String, usize>,
    values: Vec<String>,
    references: usize,
}

impl SharedStrings {
    fn intern(&mut self, value: &str) -> usize {
        self.references += 1;
        if let Some(&id) = self.index.get(value) {
            return id;
        }
        let id = self.values.len();
        self.values.push(value.to_string());
        self.index.insert(value.to_string(), id);
        id
    }

    fn to_xml(&self) -> String {
        let mut xml = format!(
            r#"{XML_HEADER}<sst xmlns="{MAIN_NS}" count="{}" uniqueCount="{}">"#,
            self.references,
            self.values.len()
        );
        for value in &self.values {
            let _ = write!(xml, r#"<si><t xml:space="preserve">{}</t></si>"#, xml_text(value));
        }
        xml.push_str("</sst>");
        xml
    }
}

fn worksheet_xml(table: &Table, strings: &mut SharedStrings) -> String {
    let mut xml = format!(r#"{XML_HEADER}<worksheet xmlns="{MAIN_NS}"><sheetData>"#);
    for (row_index, row) in table.rows().iter().enumerate() {
        let row_number = row_index + 1;
        let _ = write!(xml, r#"<row r="{row_number}">"#);
        for (col_index, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let id = strings.intern(value);
            let _ = write!(
                xml,
                r#"<c r="{}{row_number}" t="s"><v>{id}</v></c>"#,
                column_name(col_index)
            );
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn content_types_xml(sheet_count: usize) -> String {
    let mut xml = format!(
        r#"{XML_HEADER}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#
    );
    for sheet in 1..=sheet_count {
        let _ = write!(
            xml,
            r#"<Override PartName="/xl/worksheets/sheet{sheet}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        );
    }
    xml.push_str(r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/></Types>"#);
    xml
}

fn root_rels_xml() -> String {
    format!(
        r#"{XML_HEADER}<Relationships xmlns="{PKG_REL_NS}"><Relationship Id="rId1" Type="{REL_NS}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
    )
}

fn workbook_xml(sheet_count: usize) -> String {
    let mut xml = format!(
        r#"{XML_HEADER}<workbook xmlns="{MAIN_NS}" xmlns:r="{REL_NS}"><sheets>"#
    );
    for index in 0..sheet_count {
        let id = index + 1;
        let _ = write!(
            xml,
            r#"<sheet name="{}" sheetId="{id}" r:id="rId{id}"/>"#,
            sheet_name(index)
        );
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn workbook_rels_xml(sheet_count: usize) -> String {
    let mut xml = format!(r#"{XML_HEADER}<Relationships xmlns="{PKG_REL_NS}">"#);
    for sheet in 1..=sheet_count {
        let _ = write!(
            xml,
            r#"<Relationship Id="rId{sheet}" Type="{REL_NS}/worksheet" Target="worksheets/sheet{sheet}.xml"/>"#
        );
    }
    let _ = write!(
        xml,
        r#"<Relationship Id="rId{}" Type="{REL_NS}/sharedStrings" Target="sharedStrings.xml"/></Relationships>"#,
        sheet_count + 1
    );
    xml
}

fn write_workbook<W: Write + Seek>(writer: W, tables: &[Table]) -> Result<W, ExtractError> {
    if tables.is_empty() {
        return Err(ExtractError::EmptyWorkbook);
    }

    let mut strings = SharedStrings::default();
    let sheets = tables
        .iter()
        .map(|table| worksheet_xml(table, &mut strings))
        .collect::<Vec<_>>();

    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(writer);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(content_types_xml(sheets.len()).as_bytes())?;
    zip.start_file("_rels/.rels", options)?;
    zip.write_all(root_rels_xml().as_bytes())?;
    zip.start_file("xl/workbook.xml", options)?;
    zip.write_all(workbook_xml(sheets.len()).as_bytes())?;
    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(workbook_rels_xml(sheets.len()).as_bytes())?;
    for (index, sheet) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", index + 1), options)?;
        zip.write_all(sheet.as_bytes())?;
    }
    zip.start_file("xl/sharedStrings.xml", options)?;
    zip.write_all(strings.to_xml().as_bytes())?;

    Ok(zip.finish()?)
}

/// Writes one worksheet per table, named `Table_1`, `Table_2`, ...
///
/// No header row and no index column are added.
pub fn write_xlsx(path: &Path, tables: &[Table]) -> Result<(), ExtractError> {
    let file = File::create(path)?;
    write_workbook(file, tables)?.sync_all()?;
    Ok(())
}

pub fn write_xlsx_to_bytes(tables: &[Table]) -> Result<Vec<u8>, ExtractError> {
    Ok(write_workbook(Cursor::new(Vec::new()), tables)?.into_inner())
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use zip::ZipArchive;

    use super::{column_name, write_xlsx_to_bytes};
    use crate::error::ExtractError;
    use crate::model::Table;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("workbook should be a zip");
        let mut part = archive.by_name(name).expect("part should exist");
        let mut xml = String::new();
        part.read_to_string(&mut xml).expect("part should be utf-8");
        xml
    }

    #[test]
    fn names_columns_like_a_spreadsheet() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn writes_one_sheet_per_table() {
        let tables = vec![
            Table::new(vec![vec!["Name".to_string(), "Age".to_string()]]),
            Table::new(vec![vec!["x".to_string()]]),
        ];
        let bytes = write_xlsx_to_bytes(&tables).expect("workbook should render");

        let workbook = read_part(&bytes, "xl/workbook.xml");
        assert!(workbook.contains(r#"<sheet name="Table_1" sheetId="1" r:id="rId1"/>"#));
        assert!(workbook.contains(r#"<sheet name="Table_2" sheetId="2" r:id="rId2"/>"#));

        let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains(r#"<c r="A1" t="s"><v>0</v></c>"#));
        assert!(sheet.contains(r#"<c r="B1" t="s"><v>1</v></c>"#));

        let strings = read_part(&bytes, "xl/sharedStrings.xml");
        assert!(strings.contains("<t xml:space=\"preserve\">Name</t>"));
        assert!(strings.contains("uniqueCount=\"3\""));
    }

    #[test]
    fn skips_empty_cells_and_escapes_markup() {
        let tables = vec![Table::new(vec![vec![
            String::new(),
            "a<b & c".to_string(),
        ]])];
        let bytes = write_xlsx_to_bytes(&tables).expect("workbook should render");

        let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(!sheet.contains(r#"r="A1""#));
        assert!(sheet.contains(r#"<c r="B1" t="s">"#));

        let strings = read_part(&bytes, "xl/sharedStrings.xml");
        assert!(strings.contains("a&lt;b &amp; c"));
    }

    #[test]
    fn refuses_empty_workbook() {
        assert!(matches!(
            write_xlsx_to_bytes(&[]),
            Err(ExtractError::EmptyWorkbook)
        ));
    }
}
