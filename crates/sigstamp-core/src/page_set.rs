//! Candidate page selection for one manifest row.

use crate::error::PlaceError;
use crate::manifest::ManifestRow;
use crate::page_range::parse_page_range;
use crate::rules::RuleView;
use crate::settings::StampSettings;

/// How a [`PageSet`] was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSource {
    /// Explicit range from the row or the batch settings.
    Range,
    /// Explicit single page from the row or the batch settings.
    Page,
    /// Last N pages from the rule or its defaults.
    SearchLast,
    /// Nothing configured: first page only.
    FirstPage,
}

/// Ordered candidate pages (1-based) for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSet {
    pages: Vec<usize>,
    source: PageSource,
}

impl PageSet {
    pub fn pages(&self) -> &[usize] {
        &self.pages
    }

    pub fn source(&self) -> PageSource {
        self.source
    }

    /// Last-to-first iteration applies only to a search-last set.
    pub fn prefer_last(&self) -> bool {
        self.source == PageSource::SearchLast
    }

    /// Pages in the order they should be tried.
    pub fn iteration_order(&self) -> Vec<usize> {
        if self.prefer_last() {
            self.pages.iter().rev().copied().collect()
        } else {
            self.pages.clone()
        }
    }
}

/// Resolve the candidate pages for a row.
///
/// First applicable wins: explicit range (row, then settings), explicit
/// page (row, then settings, clamped into the document), the rule's
/// search-last-N window, then page 1.
///
/// # Errors
///
/// [`PlaceError::InvalidPageRange`] if a range token is malformed or the
/// range selects no page of the document; [`PlaceError::InvalidField`] if
/// the row's page column is not an integer.
pub fn resolve_page_set(
    row: &ManifestRow,
    settings: &StampSettings,
    view: &RuleView<'_>,
    page_count: usize,
) -> Result<PageSet, PlaceError> {
    let last = page_count.max(1);

    if let Some(expr) = row.stamp_page_range().or(settings.stamp_page_range()) {
        let pages = parse_page_range(expr, page_count)?;
        if pages.is_empty() {
            return Err(PlaceError::InvalidPageRange(format!(
                "'{expr}' selects no page of a {page_count}-page document"
            )));
        }
        return Ok(PageSet {
            pages,
            source: PageSource::Range,
        });
    }

    if let Some(page) = row.page()?.or(settings.page) {
        let clamped = page.clamp(1, last as i64) as usize;
        return Ok(PageSet {
            pages: vec![clamped],
            source: PageSource::Page,
        });
    }

    let search_last = view.search_last_pages() as usize;
    if search_last > 0 {
        let start = last.saturating_sub(search_last) + 1;
        return Ok(PageSet {
            pages: (start..=last).collect(),
            source: PageSource::SearchLast,
        });
    }

    Ok(PageSet {
        pages: vec![1],
        source: PageSource::FirstPage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Defaults, Rule};

    fn make_defaults(search_last: Option<u32>) -> Defaults {
        Defaults {
            search_last_pages: search_last,
            ..Defaults::default()
        }
    }

    fn resolve(row: &ManifestRow, settings: &StampSettings, defaults: &Defaults, pages: usize) -> PageSet {
        let view = RuleView::new(None, defaults);
        resolve_page_set(row, settings, &view, pages).unwrap()
    }

    #[test]
    fn nothing_configured_is_first_page() {
        let set = resolve(&ManifestRow::default(), &StampSettings::default(), &make_defaults(None), 4);
        assert_eq!(set.pages(), &[1]);
        assert_eq!(set.source(), PageSource::FirstPage);
        assert!(!set.prefer_last());
    }

    #[test]
    fn search_last_iterates_descending() {
        let set = resolve(&ManifestRow::default(), &StampSettings::default(), &make_defaults(Some(3)), 10);
        assert_eq!(set.pages(), &[8, 9, 10]);
        assert_eq!(set.iteration_order(), vec![10, 9, 8]);
    }

    #[test]
    fn search_last_larger_than_document() {
        for (n, p) in [(5u32, 2usize), (1, 1), (2, 2), (7, 7)] {
            let set = resolve(&ManifestRow::default(), &StampSettings::default(), &make_defaults(Some(n)), p);
            let expected: Vec<usize> = ((p.saturating_sub(n as usize) + 1).max(1)..=p).collect();
            assert_eq!(set.pages(), expected.as_slice(), "n={n} p={p}");
        }
    }

    #[test]
    fn search_last_from_rule_overrides_defaults() {
        let defaults = make_defaults(Some(1));
        let rule = Rule {
            search_last_pages: Some(2),
            ..Rule::new("*.pdf")
        };
        let view = RuleView::new(Some(&rule), &defaults);
        let set = resolve_page_set(&ManifestRow::default(), &StampSettings::default(), &view, 5).unwrap();
        assert_eq!(set.pages(), &[4, 5]);
    }

    #[test]
    fn explicit_range_wins_and_iterates_forward() {
        let mut row = ManifestRow::for_file("a.pdf");
        row.stamp_page_range = Some("2-3".to_string());
        row.page = Some("5".to_string());
        let set = resolve(&row, &StampSettings::default(), &make_defaults(Some(2)), 5);
        assert_eq!(set.source(), PageSource::Range);
        assert_eq!(set.iteration_order(), vec![2, 3]);
    }

    #[test]
    fn settings_range_used_when_row_has_none() {
        let settings = StampSettings {
            stamp_page_range: Some("1,3".to_string()),
            ..StampSettings::default()
        };
        let set = resolve(&ManifestRow::default(), &settings, &make_defaults(None), 3);
        assert_eq!(set.pages(), &[1, 3]);
    }

    #[test]
    fn range_selecting_nothing_is_error() {
        let mut row = ManifestRow::for_file("a.pdf");
        row.stamp_page_range = Some("7-9".to_string());
        let defaults = make_defaults(None);
        let view = RuleView::new(None, &defaults);
        let err = resolve_page_set(&row, &StampSettings::default(), &view, 3).unwrap_err();
        assert!(matches!(err, PlaceError::InvalidPageRange(_)));
    }

    #[test]
    fn explicit_page_is_clamped() {
        let mut row = ManifestRow::for_file("a.pdf");
        row.page = Some("9".to_string());
        let set = resolve(&row, &StampSettings::default(), &make_defaults(Some(2)), 4);
        assert_eq!(set.pages(), &[4]);
        assert!(!set.prefer_last());

        row.page = Some("0".to_string());
        let set = resolve(&row, &StampSettings::default(), &make_defaults(None), 4);
        assert_eq!(set.pages(), &[1]);
    }

    #[test]
    fn settings_page_used_when_row_has_none() {
        let settings = StampSettings {
            page: Some(2),
            ..StampSettings::default()
        };
        let set = resolve(&ManifestRow::default(), &settings, &make_defaults(Some(3)), 4);
        assert_eq!(set.pages(), &[2]);
        assert_eq!(set.source(), PageSource::Page);
    }
}
