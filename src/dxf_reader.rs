use std::io::Cursor;
use std::path::Path;

use dxf::Drawing;
use dxf::entities::{Entity, EntityType};
use tracing::debug;

use crate::code_pairs::{RejectedEntity, strip_malformed_entities};
use crate::error::{ExtractError, MalformedEntity};
use crate::model::{DrawingEntity, ExtractedEntities, LineSegment, TextAnchor};
use crate::mtext::{decode_text_controls, flatten_mtext};
use crate::options::ExtractOptions;

/// Entities recovered from one drawing, plus what had to be left behind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityScan {
    pub entities: ExtractedEntities,
    pub malformed: usize,
    pub blank_texts: usize,
}

/// A parsed drawing and the entities cut out of it before parsing.
pub struct LoadedDrawing {
    pub drawing: Drawing,
    pub rejected: Vec<RejectedEntity>,
}

impl From<Drawing> for LoadedDrawing {
    fn from(drawing: Drawing) -> Self {
        Self {
            drawing,
            rejected: Vec::new(),
        }
    }
}

pub fn read_drawing(path: &Path) -> Result<LoadedDrawing, ExtractError> {
    read_drawing_from_bytes(&std::fs::read(path)?)
}

/// Parses a DXF file, skipping entities whose numeric fields are broken
/// instead of failing the whole drawing.
pub fn read_drawing_from_bytes(bytes: &[u8]) -> Result<LoadedDrawing, ExtractError> {
    let (cleaned, rejected) = strip_malformed_entities(bytes);
    let drawing = Drawing::load(&mut Cursor::new(cleaned.as_ref()))?;
    Ok(LoadedDrawing { drawing, rejected })
}

fn is_selected(in_paper_space: bool, layer: &str, options: &ExtractOptions) -> bool {
    if in_paper_space && !options.include_paper_space {
        return false;
    }
    options
        .layers
        .as_ref()
        .is_none_or(|layers| layers.contains(layer))
}

fn checked_point(
    x: f64,
    y: f64,
    kind: &'static str,
    entity: &Entity,
) -> Result<(f64, f64), MalformedEntity> {
    if x.is_finite() && y.is_finite() {
        Ok((x, y))
    } else {
        Err(MalformedEntity {
            kind: kind.to_string(),
            layer: entity.common.layer.clone(),
            reason: format!("non-finite coordinate ({x}, {y})"),
        })
    }
}

fn mtext_value(extended: &[String], last: &str) -> String {
    let mut raw = extended.concat();
    raw.push_str(last);
    flatten_mtext(&raw)
}

/// Maps one DXF entity onto the closed set the table builders understand.
///
/// `Ok(None)` means the entity kind is irrelevant here (arcs, hatches, ...).
pub fn classify_entity(entity: &Entity) -> Result<Option<DrawingEntity>, MalformedEntity> {
    match &entity.specific {
        EntityType::Line(line) => {
            let start = checked_point(line.p1.x, line.p1.y, "LINE", entity)?;
            let end = checked_point(line.p2.x, line.p2.y, "LINE", entity)?;
            Ok(Some(DrawingEntity::Line(LineSegment::new(start, end))))
        }
        EntityType::Text(text) => {
            let (x, y) = checked_point(text.location.x, text.location.y, "TEXT", entity)?;
            let value = decode_text_controls(&text.value);
            Ok(Some(DrawingEntity::Text(TextAnchor::new(x, y, value))))
        }
        EntityType::MText(mtext) => {
            let (x, y) = checked_point(
                mtext.insertion_point.x,
                mtext.insertion_point.y,
                "MTEXT",
                entity,
            )?;
            let value = mtext_value(&mtext.extended_text, &mtext.text);
            Ok(Some(DrawingEntity::Text(TextAnchor::new(x, y, value))))
        }
        _ => Ok(None),
    }
}

/// Walks the drawing's entities and keeps the text anchors and line segments.
///
/// A malformed entity is skipped on its own; it never aborts the scan.
/// Entities cut out while loading count as malformed too.
#[must_use]
pub fn extract_entities(loaded: &LoadedDrawing, options: &ExtractOptions) -> EntityScan {
    let mut scan = EntityScan::default();

    for rejected in &loaded.rejected {
        if is_selected(rejected.in_paper_space, &rejected.error.layer, options) {
            debug!("{}", rejected.error);
            scan.malformed += 1;
        }
    }

    for entity in loaded.drawing.entities() {
        if !is_selected(entity.common.is_in_paper_space, &entity.common.layer, options) {
            continue;
        }

        match classify_entity(entity) {
            Ok(Some(DrawingEntity::Text(anchor))) if anchor.text.is_empty() => {
                scan.blank_texts += 1;
            }
            Ok(Some(DrawingEntity::Text(anchor))) => scan.entities.texts.push(anchor),
            Ok(Some(DrawingEntity::Line(line))) => scan.entities.lines.push(line),
            Ok(None) => {}
            Err(error) => {
                debug!("{error}");
                scan.malformed += 1;
            }
        }
    }

    debug!(
        texts = scan.entities.texts.len(),
        lines = scan.entities.lines.len(),
        malformed = scan.malformed,
        blank_texts = scan.blank_texts,
        "scanned drawing entities"
    );
    scan
}
