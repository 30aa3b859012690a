//! Page content as seen by the locators.
//!
//! The locators never touch a document directly. They read a page through
//! [`PageContent`], which a document backend implements over its own
//! extraction. [`PageSnapshot`] is the plain owned implementation: a page
//! whose text and drawings have already been extracted.

use crate::error::PlaceError;
use crate::geometry::{BBox, Point};

/// A contiguous piece of text shown by a single operator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextRun {
    pub text: String,
    pub bbox: BBox,
}

impl TextRun {
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

/// A text line: runs in extraction order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextLine {
    pub runs: Vec<TextRun>,
}

impl TextLine {
    pub fn new(runs: Vec<TextRun>) -> Self {
        Self { runs }
    }

    /// Concatenated run text, without separators.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Union of all run boxes; `None` for an empty line.
    pub fn bbox(&self) -> Option<BBox> {
        BBox::union_all(self.runs.iter().map(|r| &r.bbox))
    }
}

/// A whitespace-delimited word.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Word {
    pub text: String,
    pub bbox: BBox,
}

impl Word {
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

/// Shape of a painted vector subpath.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DrawingKind {
    /// A single straight segment.
    Line,
    /// Several connected straight segments.
    Polyline,
    /// A rectangle from the `re` operator.
    Rect,
    /// A subpath containing at least one Bézier segment.
    Curve,
}

/// A painted vector subpath, points in page space.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Drawing {
    pub kind: DrawingKind,
    pub points: Vec<Point>,
}

impl Drawing {
    pub fn new(kind: DrawingKind, points: Vec<Point>) -> Self {
        Self { kind, points }
    }

    /// Straight segment between two points.
    pub fn line(from: Point, to: Point) -> Self {
        Self::new(DrawingKind::Line, vec![from, to])
    }
}

/// Read access to one page's geometry and content.
pub trait PageContent {
    /// Page width and height in page units.
    fn size(&self) -> (f64, f64);

    /// Text lines in extraction order.
    fn text_lines(&self) -> Result<Vec<TextLine>, PlaceError>;

    /// Words in extraction order.
    fn words(&self) -> Result<Vec<Word>, PlaceError>;

    /// Painted vector subpaths.
    fn drawings(&self) -> Result<Vec<Drawing>, PlaceError>;
}

/// An extracted page held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageSnapshot {
    pub width: f64,
    pub height: f64,
    pub lines: Vec<TextLine>,
    pub words: Vec<Word>,
    pub drawings: Vec<Drawing>,
}

impl PageSnapshot {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}

impl PageContent for PageSnapshot {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn text_lines(&self) -> Result<Vec<TextLine>, PlaceError> {
        Ok(self.lines.clone())
    }

    fn words(&self) -> Result<Vec<Word>, PlaceError> {
        Ok(self.words.clone())
    }

    fn drawings(&self) -> Result<Vec<Drawing>, PlaceError> {
        Ok(self.drawings.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_text_concatenates_runs() {
        let line = TextLine::new(vec![
            TextRun::new("FIRMA ", BBox::new(10.0, 100.0, 50.0, 112.0)),
            TextRun::new("DEL CLIENTE", BBox::new(50.0, 98.0, 120.0, 112.0)),
        ]);
        assert_eq!(line.text(), "FIRMA DEL CLIENTE");
        assert_eq!(line.bbox(), Some(BBox::new(10.0, 98.0, 120.0, 112.0)));
    }

    #[test]
    fn empty_line_has_no_bbox() {
        assert_eq!(TextLine::default().bbox(), None);
    }

    #[test]
    fn snapshot_reports_size() {
        let page = PageSnapshot::new(612.0, 792.0);
        assert_eq!(page.size(), (612.0, 792.0));
        assert!(page.words().unwrap().is_empty());
    }
}
