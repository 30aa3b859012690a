use crate::error::PlaceError;
use crate::geometry::Point;
use crate::page::{DrawingKind, PageContent};
use crate::units::Length;

/// Maximum vertical delta for a segment to count as horizontal.
const HORIZONTAL_TOLERANCE: f64 = 1.0;

/// Find the visually lowest horizontal rule on the page and return the
/// stamp's top-left corner above it.
///
/// Qualifying primitives are straight segments (a `Line`, or a `Polyline`
/// with exactly two points) whose endpoints differ vertically by less than
/// 1 unit and whose width reaches `min_width` (percentages resolve against
/// the page width; `None` accepts any width). Among them the one with the
/// largest y wins; ties keep the first found. The result is
/// `(min_x, y - dy_above_line)`.
pub fn find_signature_line<P: PageContent + ?Sized>(
    page: &P,
    min_width: Option<Length>,
    dy_above_line: f64,
) -> Result<Option<Point>, PlaceError> {
    let (page_width, _) = page.size();
    let min_w = min_width.map(|l| l.resolve(page_width));

    let mut best: Option<(f64, f64)> = None;
    for drawing in page.drawings()? {
        let (p0, p1) = match (drawing.kind, drawing.points.as_slice()) {
            (DrawingKind::Line | DrawingKind::Polyline, [p0, p1]) => (*p0, *p1),
            _ => continue,
        };
        if (p1.y - p0.y).abs() >= HORIZONTAL_TOLERANCE {
            continue;
        }
        if min_w.is_some_and(|m| (p1.x - p0.x).abs() < m) {
            continue;
        }
        let y = (p0.y + p1.y) / 2.0;
        if best.is_none_or(|(best_y, _)| y > best_y) {
            best = Some((y, p0.x.min(p1.x)));
        }
    }

    Ok(best.map(|(y, x)| Point::new(x, y - dy_above_line)))
}
