//! Placement rules and rule selection.
//!
//! A [`RuleSet`] holds batch-wide [`Defaults`] plus an ordered list of
//! [`Rule`]s keyed by filename glob. [`RuleSet::select`] picks the first
//! rule whose pattern matches (case-insensitive); configuration order is
//! authoritative and there is no scoring. [`RuleView`] merges the selected
//! rule with the defaults so the cascade reads effective values from one
//! place.

use glob::{MatchOptions, Pattern};

use crate::error::PlaceError;
use crate::units::Length;

/// Where the stamp sits relative to a matched anchor bbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(from = "String"))]
pub enum Alignment {
    /// Top-left of the stamp at the bbox's bottom-left corner.
    #[default]
    BelowLeft,
    /// Stamp horizontally centered under the bbox.
    BelowCenter,
    /// Stamp vertically centered to the right of the bbox.
    RightCenter,
    /// Stamp bottom-left at the bbox's top-left corner.
    AboveLeft,
    /// Stamp horizontally centered above the bbox.
    AboveCenter,
}

impl Alignment {
    /// Parse an alignment keyword. Unknown or blank keywords yield
    /// [`Alignment::BelowLeft`].
    pub fn parse(keyword: &str) -> Self {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "below_center" => Alignment::BelowCenter,
            "right_center" => Alignment::RightCenter,
            "above_left" => Alignment::AboveLeft,
            "above_center" => Alignment::AboveCenter,
            _ => Alignment::BelowLeft,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::BelowLeft => "below_left",
            Alignment::BelowCenter => "below_center",
            Alignment::RightCenter => "right_center",
            Alignment::AboveLeft => "above_left",
            Alignment::AboveCenter => "above_center",
        }
    }
}

impl From<String> for Alignment {
    fn from(value: String) -> Self {
        Alignment::parse(&value)
    }
}

/// Named anchor-free position on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamedPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
    Center,
}

impl NamedPosition {
    /// Parse a position keyword.
    ///
    /// Blank input means "not configured" and yields `None`; any other
    /// unknown keyword falls back to [`NamedPosition::BottomRight`].
    pub fn parse(keyword: &str) -> Option<Self> {
        let k = keyword.trim().to_ascii_lowercase();
        if k.is_empty() {
            return None;
        }
        Some(match k.as_str() {
            "top_left" => NamedPosition::TopLeft,
            "top_right" => NamedPosition::TopRight,
            "bottom_left" => NamedPosition::BottomLeft,
            "center" => NamedPosition::Center,
            _ => NamedPosition::BottomRight,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NamedPosition::TopLeft => "top_left",
            NamedPosition::TopRight => "top_right",
            NamedPosition::BottomLeft => "bottom_left",
            NamedPosition::BottomRight => "bottom_right",
            NamedPosition::Center => "center",
        }
    }
}

#[cfg(feature = "serde")]
fn deserialize_position<'de, D>(deserializer: D) -> Result<Option<NamedPosition>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = <Option<String> as serde::Deserialize>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(NamedPosition::parse))
}

/// One anchor specification: a regex searched in page text plus how to
/// position the stamp relative to the hit.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct AnchorSpec {
    /// Regex pattern, matched case-insensitively. Blank specs are skipped.
    pub regex: String,
    /// Alignment relative to the matched bbox.
    pub align: Alignment,
    /// Horizontal offset added after alignment.
    pub dx: f64,
    /// Vertical offset added after alignment.
    pub dy: f64,
}

impl AnchorSpec {
    pub fn new(regex: impl Into<String>) -> Self {
        Self {
            regex: regex.into(),
            ..Self::default()
        }
    }
}

/// Default distance kept between a detected signature line and the stamp.
pub const DEFAULT_DY_ABOVE_LINE: f64 = 10.0;

/// Ruled-line detection settings.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct LineDetection {
    /// Detection only runs when explicitly enabled.
    pub enabled: bool,
    /// Minimum segment width; percentages resolve against page width.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::units::deserialize_opt"))]
    pub min_width: Option<Length>,
    /// Distance above the line for the stamp's y (default 10).
    pub dy_above_line: Option<f64>,
}

impl LineDetection {
    pub fn dy_above_line(&self) -> f64 {
        self.dy_above_line.unwrap_or(DEFAULT_DY_ABOVE_LINE)
    }
}

/// Relative (anchor-free) placement settings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct RelativePlacement {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "deserialize_position"))]
    pub position: Option<NamedPosition>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::units::deserialize_opt"))]
    pub margin_x: Option<Length>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::units::deserialize_opt"))]
    pub margin_y: Option<Length>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::units::deserialize_opt"))]
    pub offset_x: Option<Length>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::units::deserialize_opt"))]
    pub offset_y: Option<Length>,
}

impl RelativePlacement {
    /// Field-wise merge: values set on `self` win, `fallback` fills the gaps.
    pub fn or(&self, fallback: &RelativePlacement) -> RelativePlacement {
        RelativePlacement {
            position: self.position.or(fallback.position),
            margin_x: self.margin_x.or(fallback.margin_x),
            margin_y: self.margin_y.or(fallback.margin_y),
            offset_x: self.offset_x.or(fallback.offset_x),
            offset_y: self.offset_y.or(fallback.offset_y),
        }
    }
}

/// A per-file placement rule.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct Rule {
    /// Display name used in review reports.
    pub name: Option<String>,
    /// Filename glob (`*`, `?`, `[...]`), case-insensitive.
    #[cfg_attr(feature = "serde", serde(rename = "match"))]
    pub pattern: String,
    /// Anchors tried in order.
    pub anchors: Vec<AnchorSpec>,
    pub line_detection: Option<LineDetection>,
    /// Relative placement used when anchors and lines fail.
    pub fallback: Option<RelativePlacement>,
    /// Search only the last N pages, preferring the last one.
    pub search_last_pages: Option<u32>,
}

impl Rule {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    /// Name shown in reports: the explicit name, else the match pattern.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.pattern)
    }

    fn matches(&self, filename: &str) -> Result<bool, PlaceError> {
        if self.pattern.trim().is_empty() {
            return Ok(false);
        }
        let pattern = Pattern::new(&self.pattern).map_err(|e| PlaceError::InvalidGlob {
            pattern: self.pattern.clone(),
            message: e.to_string(),
        })?;
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        Ok(pattern.matches_with(filename, options))
    }
}

/// Batch-wide fallback values, shaped like a rule.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct Defaults {
    pub anchors: Vec<AnchorSpec>,
    pub line_detection: Option<LineDetection>,
    /// Relative placement keys sit at the top level of the defaults block.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub relative: RelativePlacement,
    pub search_last_pages: Option<u32>,
    pub scale: Option<f64>,
    pub keep_aspect: Option<bool>,
}

/// Ordered rules plus defaults, loaded once per batch.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct RuleSet {
    pub defaults: Defaults,
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Pick the first rule whose pattern matches `filename`.
    ///
    /// Rules are evaluated lazily in configuration order; the first hit wins.
    ///
    /// # Errors
    ///
    /// Returns [`PlaceError::InvalidGlob`] if a pattern reached before the
    /// first match does not compile.
    pub fn select(&self, filename: &str) -> Result<Option<&Rule>, PlaceError> {
        for rule in &self.rules {
            if rule.matches(filename)? {
                return Ok(Some(rule));
            }
        }
        Ok(None)
    }

    /// Effective view for a file whose selected rule is `rule`.
    pub fn view<'a>(&'a self, rule: Option<&'a Rule>) -> RuleView<'a> {
        RuleView {
            rule,
            defaults: &self.defaults,
        }
    }
}

/// A selected rule (if any) merged with the batch defaults.
#[derive(Debug, Clone, Copy)]
pub struct RuleView<'a> {
    rule: Option<&'a Rule>,
    defaults: &'a Defaults,
}

impl<'a> RuleView<'a> {
    pub fn new(rule: Option<&'a Rule>, defaults: &'a Defaults) -> Self {
        Self { rule, defaults }
    }

    pub fn rule(&self) -> Option<&'a Rule> {
        self.rule
    }

    pub fn defaults(&self) -> &'a Defaults {
        self.defaults
    }

    /// Rule anchors when non-empty, else default anchors.
    pub fn anchors(&self) -> &'a [AnchorSpec] {
        match self.rule {
            Some(rule) if !rule.anchors.is_empty() => &rule.anchors,
            _ => &self.defaults.anchors,
        }
    }

    pub fn line_detection(&self) -> Option<&'a LineDetection> {
        self.rule
            .and_then(|r| r.line_detection.as_ref())
            .or(self.defaults.line_detection.as_ref())
    }

    /// Relative placement with rule fallback fields overriding defaults.
    pub fn relative(&self) -> RelativePlacement {
        match self.rule.and_then(|r| r.fallback.as_ref()) {
            Some(fallback) => fallback.or(&self.defaults.relative),
            None => self.defaults.relative,
        }
    }

    /// First positive "search last N pages" of rule, defaults; 0 if none.
    pub fn search_last_pages(&self) -> u32 {
        self.rule
            .and_then(|r| r.search_last_pages)
            .filter(|n| *n > 0)
            .or(self.defaults.search_last_pages.filter(|n| *n > 0))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_rule_set(patterns: &[&str]) -> RuleSet {
        RuleSet {
            defaults: Defaults::default(),
            rules: patterns.iter().map(|p| Rule::new(*p)).collect(),
        }
    }

    #[test]
    fn select_first_match_wins() {
        let rules = make_rule_set(&["contract_*.pdf", "*.pdf"]);
        let picked = rules.select("contract_001.pdf").unwrap().unwrap();
        assert_eq!(picked.pattern, "contract_*.pdf");
    }

    #[test]
    fn select_order_is_authoritative() {
        let rules = make_rule_set(&["*.pdf", "contract_*.pdf"]);
        let picked = rules.select("contract_001.pdf").unwrap().unwrap();
        assert_eq!(picked.pattern, "*.pdf");
    }

    #[test]
    fn select_is_case_insensitive() {
        let rules = make_rule_set(&["CONTRACT_*.PDF"]);
        assert!(rules.select("contract_7.pdf").unwrap().is_some());
    }

    #[test]
    fn select_none_when_nothing_matches() {
        let rules = make_rule_set(&["invoice_*.pdf"]);
        assert!(rules.select("contract_7.pdf").unwrap().is_none());
    }

    #[test]
    fn select_skips_blank_patterns() {
        let rules = make_rule_set(&["", "*.pdf"]);
        assert_eq!(rules.select("a.pdf").unwrap().unwrap().pattern, "*.pdf");
    }

    #[test]
    fn select_invalid_glob_is_error() {
        let rules = make_rule_set(&["[abc", "*.pdf"]);
        let err = rules.select("a.pdf").unwrap_err();
        assert!(matches!(err, PlaceError::InvalidGlob { .. }));
    }

    #[test]
    fn select_invalid_glob_after_match_is_not_reached() {
        let rules = make_rule_set(&["*.pdf", "[abc"]);
        assert!(rules.select("a.pdf").unwrap().is_some());
    }

    #[test]
    fn alignment_parse_unknown_defaults_below_left() {
        assert_eq!(Alignment::parse("sideways"), Alignment::BelowLeft);
        assert_eq!(Alignment::parse("ABOVE_CENTER"), Alignment::AboveCenter);
    }

    #[test]
    fn position_parse_blank_and_unknown() {
        assert_eq!(NamedPosition::parse(""), None);
        assert_eq!(NamedPosition::parse("middle"), Some(NamedPosition::BottomRight));
        assert_eq!(NamedPosition::parse("Top_Left"), Some(NamedPosition::TopLeft));
    }

    #[test]
    fn view_anchors_fall_back_to_defaults() {
        let mut set = make_rule_set(&["*.pdf"]);
        set.defaults.anchors = vec![AnchorSpec::new("firma")];
        let rule = set.select("x.pdf").unwrap();
        let view = set.view(rule);
        assert_eq!(view.anchors()[0].regex, "firma");
    }

    #[test]
    fn view_rule_anchors_override_defaults() {
        let mut set = make_rule_set(&["*.pdf"]);
        set.defaults.anchors = vec![AnchorSpec::new("firma")];
        set.rules[0].anchors = vec![AnchorSpec::new("signature")];
        let rule = set.select("x.pdf").unwrap();
        assert_eq!(set.view(rule).anchors()[0].regex, "signature");
    }

    #[test]
    fn view_relative_merges_fieldwise() {
        let mut set = make_rule_set(&["*.pdf"]);
        set.defaults.relative = RelativePlacement {
            position: Some(NamedPosition::BottomLeft),
            margin_x: Some(Length::Absolute(20.0)),
            margin_y: Some(Length::Absolute(30.0)),
            ..RelativePlacement::default()
        };
        set.rules[0].fallback = Some(RelativePlacement {
            margin_x: Some(Length::Percent(5.0)),
            ..RelativePlacement::default()
        });
        let rule = set.select("x.pdf").unwrap();
        let rel = set.view(rule).relative();
        assert_eq!(rel.position, Some(NamedPosition::BottomLeft));
        assert_eq!(rel.margin_x, Some(Length::Percent(5.0)));
        assert_eq!(rel.margin_y, Some(Length::Absolute(30.0)));
    }

    #[test]
    fn view_search_last_pages_prefers_rule() {
        let mut set = make_rule_set(&["*.pdf"]);
        set.defaults.search_last_pages = Some(2);
        assert_eq!(set.view(None).search_last_pages(), 2);

        set.rules[0].search_last_pages = Some(4);
        let rule = set.select("x.pdf").unwrap();
        assert_eq!(set.view(rule).search_last_pages(), 4);

        set.rules[0].search_last_pages = Some(0);
        let rule = set.select("x.pdf").unwrap();
        assert_eq!(set.view(rule).search_last_pages(), 2);
    }

    #[test]
    fn rule_display_name() {
        let mut rule = Rule::new("contract_*.pdf");
        assert_eq!(rule.display_name(), "contract_*.pdf");
        rule.name = Some("Contracts".to_string());
        assert_eq!(rule.display_name(), "Contracts");
    }

    #[test]
    fn line_detection_default_offset() {
        assert_eq!(LineDetection::default().dy_above_line(), 10.0);
        let ld = LineDetection {
            dy_above_line: Some(4.0),
            ..LineDetection::default()
        };
        assert_eq!(ld.dy_above_line(), 4.0);
    }
}
