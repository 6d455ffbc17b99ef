use serde::Serialize;

/// Rounds a drawing coordinate to two decimals so equal-looking values compare equal.
#[must_use]
pub fn round_coord(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextAnchor {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

impl TextAnchor {
    /// Builds an anchor with rounded coordinates and trimmed text.
    #[must_use]
    pub fn new(x: f64, y: f64, text: impl AsRef<str>) -> Self {
        Self {
            x: round_coord(x),
            y: round_coord(y),
            text: text.as_ref().trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

impl LineSegment {
    #[must_use]
    pub fn new(start: (f64, f64), end: (f64, f64)) -> Self {
        Self {
            start: (round_coord(start.0), round_coord(start.1)),
            end: (round_coord(end.0), round_coord(end.1)),
        }
    }

    #[must_use]
    pub fn is_horizontal(&self) -> bool {
        self.start.1 == self.end.1
    }

    #[must_use]
    pub fn is_vertical(&self) -> bool {
        self.start.0 == self.end.0
    }
}

/// One model-space entity the extractor knows how to use.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawingEntity {
    Text(TextAnchor),
    Line(LineSegment),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedEntities {
    pub texts: Vec<TextAnchor>,
    pub lines: Vec<LineSegment>,
}

impl ExtractedEntities {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty() && self.lines.is_empty()
    }
}

impl FromIterator<DrawingEntity> for ExtractedEntities {
    fn from_iter<I: IntoIterator<Item = DrawingEntity>>(iter: I) -> Self {
        let mut out = Self::default();
        for entity in iter {
            match entity {
                DrawingEntity::Text(anchor) => out.texts.push(anchor),
                DrawingEntity::Line(line) => out.lines.push(line),
            }
        }
        out
    }
}

/// Axis-aligned cell rectangle with `x0 < x1` and `y0 < y1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl CellRect {
    /// Inclusive on all four sides.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.x0 <= x && x <= self.x1 && self.y0 <= y && y <= self.y1
    }

    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }
}

/// A cell after assignment, holding its texts joined by newlines.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignedCell {
    pub rect: CellRect,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    #[must_use]
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Pads every row with empty cells up to `width`.
    #[must_use]
    pub fn padded_to(&self, width: usize) -> Self {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut out = row.clone();
                if out.len() < width {
                    out.resize(width, String::new());
                }
                out
            })
            .collect();
        Self { rows }
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}
