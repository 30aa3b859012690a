use crate::geometry::Point;
use crate::rules::{NamedPosition, RelativePlacement};
use crate::sizing::StampSize;
use crate::units::resolve_or_zero;

/// Top-left corner for a stamp placed at a named page position.
///
/// Margins inset the stamp from the chosen corner (ignored for `Center`);
/// offsets are added last. Horizontal lengths resolve against the page
/// width, vertical ones against the page height. An unset position means
/// bottom-right.
pub fn place_by_position(page_size: (f64, f64), placement: &RelativePlacement, size: StampSize) -> Point {
    let (w, h) = page_size;
    let mx = resolve_or_zero(placement.margin_x, w);
    let my = resolve_or_zero(placement.margin_y, h);
    let ox = resolve_or_zero(placement.offset_x, w);
    let oy = resolve_or_zero(placement.offset_y, h);

    let base = match placement.position.unwrap_or_default() {
        NamedPosition::TopLeft => Point::new(mx, my),
        NamedPosition::TopRight => Point::new(w - size.width - mx, my),
        NamedPosition::BottomLeft => Point::new(mx, h - size.height - my),
        NamedPosition::BottomRight => Point::new(w - size.width - mx, h - size.height - my),
        NamedPosition::Center => Point::new((w - size.width) / 2.0, (h - size.height) / 2.0),
    };
    base.offset(ox, oy)
}

/// Whether a stamp at `origin` leaves the page.
pub fn is_off_page(page_size: (f64, f64), origin: Point, size: StampSize) -> bool {
    let (w, h) = page_size;
    origin.x < 0.0 || origin.y < 0.0 || origin.x + size.width > w || origin.y + size.height > h
}
