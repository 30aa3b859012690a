//! Anchor text search and anchor-relative positioning.
//!
//! Anchors are searched at line granularity first so multi-word phrases
//! split across runs still match, then at word granularity.

use regex::{Regex, RegexBuilder};

use crate::error::PlaceError;
use crate::geometry::{BBox, Point};
use crate::page::PageContent;
use crate::rules::{Alignment, AnchorSpec};
use crate::sizing::StampSize;

/// A matched anchor: where it was found and which entry of the anchor list matched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorHit<'a> {
    pub bbox: BBox,
    pub anchor: &'a AnchorSpec,
}

fn compile(pattern: &str) -> Result<Regex, PlaceError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| PlaceError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

fn active(anchors: &[AnchorSpec]) -> impl Iterator<Item = &AnchorSpec> {
    anchors.iter().filter(|a| !a.regex.is_empty())
}

/// Line-level pass. Any failure (extraction or regex compilation) abandons
/// the pass and returns `None` so the caller can try words instead.
fn search_lines<'a, P: PageContent + ?Sized>(page: &P, anchors: &'a [AnchorSpec]) -> Option<AnchorHit<'a>> {
    let lines = page.text_lines().ok()?;
    for anchor in active(anchors) {
        let rx = compile(&anchor.regex).ok()?;
        for line in &lines {
            if !rx.is_match(&line.text()) {
                continue;
            }
            if let Some(bbox) = line.bbox() {
                return Some(AnchorHit { bbox, anchor });
            }
        }
    }
    None
}

/// Find the first anchor present on the page.
///
/// Anchor specs are tried in order against every text line (concatenated
/// run text, bbox = union of the runs); the first hit wins. When no line
/// matches, the same specs are tried against individual words. Specs with
/// an empty regex are skipped.
///
/// # Errors
///
/// Line-level failures are never reported. In the word pass, a failing
/// word extraction or a regex that does not compile is returned as an
/// error.
pub fn find_anchor_bbox<'a, P: PageContent + ?Sized>(
    page: &P,
    anchors: &'a [AnchorSpec],
) -> Result<Option<AnchorHit<'a>>, PlaceError> {
    if let Some(hit) = search_lines(page, anchors) {
        return Ok(Some(hit));
    }

    let words = page.words()?;
    if words.is_empty() {
        return Ok(None);
    }
    for anchor in active(anchors) {
        let rx = compile(&anchor.regex)?;
        if let Some(word) = words.iter().find(|w| rx.is_match(&w.text)) {
            return Ok(Some(AnchorHit {
                bbox: word.bbox,
                anchor,
            }));
        }
    }
    Ok(None)
}

/// Top-left corner for a stamp of `size` aligned to `bbox`, plus `(dx, dy)`.
pub fn compute_pos_from_anchor(bbox: &BBox, align: Alignment, dx: f64, dy: f64, size: StampSize) -> Point {
    let base = match align {
        Alignment::BelowLeft => Point::new(bbox.x0, bbox.bottom),
        Alignment::BelowCenter => Point::new(bbox.center_x() - size.width / 2.0, bbox.bottom),
        Alignment::RightCenter => Point::new(bbox.x1, bbox.center_y() - size.height / 2.0),
        Alignment::AboveLeft => Point::new(bbox.x0, bbox.top - size.height),
        Alignment::AboveCenter => Point::new(bbox.center_x() - size.width / 2.0, bbox.top - size.height),
    };
    base.offset(dx, dy)
}
