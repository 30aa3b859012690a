//! The placement cascade: anchor, then ruled line, then relative
//! position, then absolute coordinates.
//!
//! Every page attempt ends in a placement. A strategy that fails is
//! recorded as a [`StrategyFailure`] and the next strategy is tried; the
//! absolute fallback cannot fail.

use std::fmt;

use crate::anchor::{compute_pos_from_anchor, find_anchor_bbox};
use crate::error::PlaceError;
use crate::geometry::{Point, StampRect};
use crate::line_detect::find_signature_line;
use crate::page::PageContent;
use crate::relative::{is_off_page, place_by_position};
use crate::rules::{NamedPosition, RuleView};
use crate::settings::RowGeometry;
use crate::sizing::StampSize;
use crate::units::Length;

/// The strategy that produced a placement.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// Matched anchor text; holds the matching regex.
    Anchor { regex: String },
    /// Detected a ruled signature line.
    LineDetection { min_width: Option<Length> },
    /// Named page position.
    Relative { position: NamedPosition },
    /// Configured absolute coordinates.
    AbsoluteXy,
}

impl Strategy {
    pub fn is_anchor(&self) -> bool {
        matches!(self, Strategy::Anchor { .. })
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Anchor { regex } => write!(f, "anchor:{regex}"),
            Strategy::LineDetection { min_width: Some(w) } => write!(f, "line_detection(min_width={w})"),
            Strategy::LineDetection { min_width: None } => write!(f, "line_detection(min_width=none)"),
            Strategy::Relative { position } => write!(f, "relative:{}", position.as_str()),
            Strategy::AbsoluteXy => f.write_str("absolute_xy"),
        }
    }
}

/// Where and how large to stamp on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementDecision {
    /// 1-based page number.
    pub page: usize,
    pub strategy: Strategy,
    /// Top-left corner of the stamp.
    pub origin: Point,
    pub size: StampSize,
    pub rotation: i32,
    /// The stamp extends past the page edges.
    pub off_page: bool,
}

impl PlacementDecision {
    pub fn rect(&self) -> StampRect {
        StampRect::new(self.origin.x, self.origin.y, self.size.width, self.size.height)
    }
}

/// Cascade stage that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Anchor,
    LineDetection,
}

/// A strategy failure recorded during a page attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyFailure {
    pub stage: Stage,
    pub page: usize,
    pub error: PlaceError,
}

impl StrategyFailure {
    /// Scope tag for the error log, e.g. `anchor_page_3`.
    pub fn scope(&self) -> String {
        match self.stage {
            Stage::Anchor => format!("anchor_page_{}", self.page),
            Stage::LineDetection => format!("line_detection_page_{}", self.page),
        }
    }
}

/// Result of one page attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutcome {
    pub decision: PlacementDecision,
    pub failures: Vec<StrategyFailure>,
}

/// Decide the placement for `page_number` of a row.
///
/// Anchors come from the rule view (rule, else defaults) and run only when
/// present; line detection runs only when enabled; the relative position
/// applies whenever a position is configured, even if the result lies off
/// the page (flagged via [`PlacementDecision::off_page`]).
pub fn run_cascade<P: PageContent + ?Sized>(
    page: &P,
    page_number: usize,
    view: &RuleView<'_>,
    geometry: &RowGeometry,
) -> CascadeOutcome {
    let size = geometry.size;
    let mut failures = Vec::new();
    let mut fail = |stage, error| {
        failures.push(StrategyFailure {
            stage,
            page: page_number,
            error,
        })
    };

    let mut placed: Option<(Strategy, Point)> = None;

    let anchors = view.anchors();
    if !anchors.is_empty() {
        match find_anchor_bbox(page, anchors) {
            Ok(Some(hit)) => {
                let a = hit.anchor;
                let origin = compute_pos_from_anchor(&hit.bbox, a.align, a.dx, a.dy, size);
                placed = Some((Strategy::Anchor { regex: a.regex.clone() }, origin));
            }
            Ok(None) => {}
            Err(e) => fail(Stage::Anchor, e),
        }
    }

    if placed.is_none() {
        if let Some(ld) = view.line_detection().filter(|ld| ld.enabled) {
            match find_signature_line(page, ld.min_width, ld.dy_above_line()) {
                Ok(Some(origin)) => {
                    placed = Some((Strategy::LineDetection { min_width: ld.min_width }, origin));
                }
                Ok(None) => {}
                Err(e) => fail(Stage::LineDetection, e),
            }
        }
    }

    if placed.is_none() {
        let relative = view.relative();
        if let Some(position) = relative.position {
            let origin = place_by_position(page.size(), &relative, size);
            placed = Some((Strategy::Relative { position }, origin));
        }
    }

    let (strategy, origin) = placed.unwrap_or((Strategy::AbsoluteXy, Point::new(geometry.x, geometry.y)));

    CascadeOutcome {
        decision: PlacementDecision {
            page: page_number,
            strategy,
            origin,
            size,
            rotation: geometry.rotation,
            off_page: is_off_page(page.size(), origin, size),
        },
        failures,
    }
}
