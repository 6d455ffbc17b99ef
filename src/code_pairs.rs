//! Tolerant pass over raw DXF code pairs, run before the strict parser.
//!
//! The `dxf` crate rejects a whole file over one unparsable number and quietly
//! zero-fills a missing coordinate. This pass cuts such entities out of the
//! ENTITIES section so the rest of the drawing still loads.

use std::borrow::Cow;
use std::ops::Range;

use crate::error::MalformedEntity;

const BINARY_SENTINEL: &[u8] = b"AutoCAD Binary DXF";

/// An entity removed before parsing, with what is needed to filter it later.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedEntity {
    pub error: MalformedEntity,
    pub in_paper_space: bool,
}

struct RawPair<'a> {
    code: i32,
    value: &'a [u8],
    span: Range<usize>,
}

impl RawPair<'_> {
    fn is(&self, code: i32, value: &[u8]) -> bool {
        self.code == code && self.value == value
    }

    fn text(&self) -> String {
        String::from_utf8_lossy(self.value).into_owned()
    }
}

fn line_spans(bytes: &[u8]) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;
    for (index, byte) in bytes.iter().enumerate() {
        if *byte == b'\n' {
            spans.push(start..index + 1);
            start = index + 1;
        }
    }
    if start < bytes.len() {
        spans.push(start..bytes.len());
    }
    spans
}

/// `None` when a code line is not an integer; the strict parser reports that.
fn raw_pairs(bytes: &[u8]) -> Option<Vec<RawPair<'_>>> {
    line_spans(bytes)
        .chunks_exact(2)
        .map(move |pair| {
            let code = std::str::from_utf8(bytes[pair[0].clone()].trim_ascii())
                .ok()?
                .parse::<i32>()
                .ok()?;
            Some(RawPair {
                code,
                value: bytes[pair[1].clone()].trim_ascii(),
                span: pair[0].start..pair[1].end,
            })
        })
        .collect()
}

fn is_float_code(code: i32) -> bool {
    matches!(code, 10..=59 | 110..=149 | 210..=239 | 460..=469 | 1010..=1059)
}

fn is_integer_code(code: i32) -> bool {
    matches!(
        code,
        60..=79 | 90..=99 | 160..=179 | 270..=299 | 370..=389 | 400..=409 | 420..=429 | 440..=459
            | 1060..=1071
    )
}

fn parses_as_number(pair: &RawPair<'_>) -> bool {
    let Ok(value) = std::str::from_utf8(pair.value) else {
        return false;
    };
    if is_float_code(pair.code) {
        value.parse::<f64>().is_ok()
    } else if is_integer_code(pair.code) {
        value.parse::<i64>().is_ok()
    } else {
        true
    }
}

fn required_codes(kind: &[u8]) -> &'static [i32] {
    match kind {
        b"LINE" => &[10, 20, 11, 21],
        b"TEXT" | b"MTEXT" => &[10, 20],
        _ => &[],
    }
}

/// Entities that belong to the entity before them and go wherever it goes.
fn is_continuation(kind: &[u8]) -> bool {
    matches!(kind, b"VERTEX" | b"ATTRIB" | b"SEQEND")
}

fn inspect_entity(block: &[RawPair<'_>]) -> Option<RejectedEntity> {
    let head = block.first()?;
    let body = &block[1..];

    let reason = body
        .iter()
        .find(|pair| !parses_as_number(pair))
        .map(|pair| format!("group code {} holds non-numeric '{}'", pair.code, pair.text()))
        .or_else(|| {
            required_codes(head.value)
                .iter()
                .find(|code| !body.iter().any(|pair| pair.code == **code))
                .map(|code| format!("missing group code {code}"))
        })?;

    let layer = body
        .iter()
        .find(|pair| pair.code == 8)
        .map_or_else(|| "0".to_string(), RawPair::text);
    let in_paper_space = body.iter().any(|pair| pair.is(67, b"1"));

    Some(RejectedEntity {
        error: MalformedEntity {
            kind: head.text(),
            layer,
            reason,
        },
        in_paper_space,
    })
}

/// Cuts malformed entities out of the ENTITIES section.
///
/// Binary files and files whose code lines do not parse are returned as is.
pub(crate) fn strip_malformed_entities(bytes: &[u8]) -> (Cow<'_, [u8]>, Vec<RejectedEntity>) {
    if bytes.starts_with(BINARY_SENTINEL) {
        return (Cow::Borrowed(bytes), Vec::new());
    }
    let Some(pairs) = raw_pairs(bytes) else {
        return (Cow::Borrowed(bytes), Vec::new());
    };

    let mut rejected = Vec::new();
    let mut cuts: Vec<Range<usize>> = Vec::new();
    let mut index = 0;
    let mut in_entities = false;
    let mut parent_dropped = false;

    while index < pairs.len() {
        let pair = &pairs[index];
        if !in_entities {
            in_entities = pair.is(0, b"SECTION")
                && pairs.get(index + 1).is_some_and(|next| next.is(2, b"ENTITIES"));
            index += if in_entities { 2 } else { 1 };
            continue;
        }
        if pair.is(0, b"ENDSEC") {
            in_entities = false;
            index += 1;
            continue;
        }

        let start = index;
        index += 1;
        while index < pairs.len() && pairs[index].code != 0 {
            index += 1;
        }
        let block = &pairs[start..index];
        let span = block[0].span.start..block[block.len() - 1].span.end;

        if parent_dropped && is_continuation(block[0].value) {
            cuts.push(span);
            continue;
        }
        parent_dropped = false;

        if let Some(entity) = inspect_entity(block) {
            rejected.push(entity);
            cuts.push(span);
            parent_dropped = true;
        }
    }

    if cuts.is_empty() {
        return (Cow::Borrowed(bytes), rejected);
    }

    let mut kept = Vec::with_capacity(bytes.len());
    let mut cursor = 0;
    for cut in cuts {
        kept.extend_from_slice(&bytes[cursor..cut.start]);
        cursor = cut.end;
    }
    kept.extend_from_slice(&bytes[cursor..]);
    (Cow::Owned(kept), rejected)
}

#[cfg(test)]
mod tests {
    use super::strip_malformed_entities;

    fn dxf(entities: &str) -> String {
        format!("0\nSECTION\n2\nENTITIES\n{entities}0\nENDSEC\n0\nEOF\n")
    }

    const GOOD_TEXT: &str = "0\nTEXT\n8\n0\n10\n1.0\n20\n2.0\n30\n0.0\n40\n1.0\n1\ngood\n";

    #[test]
    fn leaves_clean_files_untouched() {
        let input = dxf(GOOD_TEXT);
        let (output, rejected) = strip_malformed_entities(input.as_bytes());
        assert_eq!(output.as_ref(), input.as_bytes());
        assert!(rejected.is_empty());
    }

    #[test]
    fn cuts_entity_with_non_numeric_coordinate() {
        let bad = "0\nTEXT\n8\nNOTES\n10\n1.0\n20\nabc\n30\n0.0\n1\nbad\n";
        let input = dxf(&format!("{bad}{GOOD_TEXT}"));

        let (output, rejected) = strip_malformed_entities(input.as_bytes());
        assert_eq!(output.as_ref(), dxf(GOOD_TEXT).as_bytes());
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].error.kind, "TEXT");
        assert_eq!(rejected[0].error.layer, "NOTES");
        assert!(rejected[0].error.reason.contains("group code 20"));
    }

    #[test]
    fn cuts_line_missing_its_end_point() {
        let bad = "0\nLINE\n8\n0\n10\n0.0\n20\n0.0\n11\n5.0\n";
        let input = dxf(bad);

        let (_, rejected) = strip_malformed_entities(input.as_bytes());
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].error.reason, "missing group code 21");
    }

    #[test]
    fn drops_vertices_with_their_polyline() {
        let entities = "0\nPOLYLINE\n8\n0\n70\nx\n0\nVERTEX\n10\n1.0\n20\n1.0\n0\nSEQEND\n";
        let input = dxf(&format!("{entities}{GOOD_TEXT}"));

        let (output, rejected) = strip_malformed_entities(input.as_bytes());
        assert_eq!(rejected.len(), 1);
        assert_eq!(output.as_ref(), dxf(GOOD_TEXT).as_bytes());
    }

    #[test]
    fn records_paper_space_flag() {
        let input = dxf("0\nTEXT\n67\n1\n10\n1.0\n1\nmissing y\n");
        let (_, rejected) = strip_malformed_entities(input.as_bytes());
        assert!(rejected[0].in_paper_space);
    }

    #[test]
    fn ignores_sections_other_than_entities() {
        let input = "0\nSECTION\n2\nHEADER\n9\n$X\n40\nabc\n0\nENDSEC\n0\nEOF\n";
        let (output, rejected) = strip_malformed_entities(input.as_bytes());
        assert_eq!(output.as_ref(), input.as_bytes());
        assert!(rejected.is_empty());
    }
}
