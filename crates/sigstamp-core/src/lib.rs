//! sigstamp-core: backend-independent placement engine.
//!
//! This crate decides *where* a signature stamp goes on each page of a
//! document: rule selection by filename glob, candidate page sets, the
//! anchor / ruled-line / relative / absolute placement cascade, stamp
//! sizing, and per-file outcome classification. Pages are read through the
//! [`PageContent`] trait, so nothing here depends on a PDF library.

pub mod anchor;
pub mod cascade;
pub mod error;
pub mod geometry;
pub mod line_detect;
pub mod manifest;
pub mod outcome;
pub mod page;
pub mod page_range;
pub mod page_set;
pub mod relative;
pub mod rules;
pub mod settings;
pub mod sizing;
pub mod units;

pub use anchor::{AnchorHit, compute_pos_from_anchor, find_anchor_bbox};
pub use cascade::{CascadeOutcome, PlacementDecision, Stage, Strategy, StrategyFailure, run_cascade};
pub use error::PlaceError;
pub use geometry::{BBox, Ctm, Point, StampRect};
pub use line_detect::find_signature_line;
pub use manifest::{Manifest, ManifestRow, parse_flag};
pub use outcome::{FileTally, MatchSource, StampOutcome, classify};
pub use page::{Drawing, DrawingKind, PageContent, PageSnapshot, TextLine, TextRun, Word};
pub use page_range::parse_page_range;
pub use page_set::{PageSet, PageSource, resolve_page_set};
pub use relative::{is_off_page, place_by_position};
pub use rules::{
    Alignment, AnchorSpec, Defaults, LineDetection, NamedPosition, RelativePlacement, Rule, RuleSet,
    RuleView,
};
pub use settings::{RowGeometry, StampSettings};
pub use sizing::StampSize;
pub use units::Length;
