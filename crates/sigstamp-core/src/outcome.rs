//! Per-file classification of how placements were decided.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::cascade::PlacementDecision;
use crate::error::PlaceError;
use crate::rules::Rule;

/// How a file's placements were decided, from strongest to weakest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum MatchSource {
    /// A rule matched and at least one anchor placement happened.
    RulesMatch,
    /// A rule matched but no anchor placement happened.
    RulesFallback,
    /// No rule matched; manifest rows drove the placement.
    NoRulesManifest,
    /// No rule and no manifest rows: batch defaults only.
    NoRulesDefault,
}

impl MatchSource {
    pub const ALL: [MatchSource; 4] = [
        MatchSource::RulesMatch,
        MatchSource::RulesFallback,
        MatchSource::NoRulesManifest,
        MatchSource::NoRulesDefault,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchSource::RulesMatch => "rules_match",
            MatchSource::RulesFallback => "rules_fallback",
            MatchSource::NoRulesManifest => "no_rules_manifest",
            MatchSource::NoRulesDefault => "no_rules_default",
        }
    }
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchSource {
    type Err = PlaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MatchSource::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PlaceError::InvalidField {
                field: "match_source".to_string(),
                value: s.to_string(),
            })
    }
}

/// Placement evidence accumulated while one file is processed.
#[derive(Debug, Clone, Default)]
pub struct FileTally {
    placements: usize,
    anchor_placements: usize,
    pages: BTreeSet<usize>,
}

impl FileTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a placement that was actually applied.
    pub fn record(&mut self, decision: &PlacementDecision) {
        self.placements += 1;
        if decision.strategy.is_anchor() {
            self.anchor_placements += 1;
        }
        self.pages.insert(decision.page);
    }

    pub fn placements(&self) -> usize {
        self.placements
    }

    pub fn anchor_placements(&self) -> usize {
        self.anchor_placements
    }

    /// Number of distinct pages that received a stamp.
    pub fn pages_affected(&self) -> usize {
        self.pages.len()
    }
}

/// Classification of one processed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampOutcome {
    pub match_source: MatchSource,
    pub rule_name: Option<String>,
    pub reason: String,
    pub pages_affected: usize,
}

/// Classify a file once all of its rows and pages are processed.
///
/// `anchors_configured` tells a rule without effective anchors apart from
/// one whose anchors never matched.
pub fn classify(
    rule: Option<&Rule>,
    anchors_configured: bool,
    has_manifest_rows: bool,
    tally: &FileTally,
) -> StampOutcome {
    let (match_source, reason) = match rule {
        Some(_) if tally.anchor_placements() > 0 => (MatchSource::RulesMatch, "anchor_found"),
        Some(_) if anchors_configured => (MatchSource::RulesFallback, "anchors_not_found"),
        Some(_) => (MatchSource::RulesFallback, "no_anchors_configured"),
        None if has_manifest_rows => (MatchSource::NoRulesManifest, "no_rule_matched"),
        None => (MatchSource::NoRulesDefault, "no_rule_matched"),
    };
    StampOutcome {
        match_source,
        rule_name: rule.map(|r| r.display_name().to_string()),
        reason: reason.to_string(),
        pages_affected: tally.pages_affected(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::Strategy;
    use crate::geometry::Point;
    use crate::sizing::StampSize;

    fn make_decision(page: usize, strategy: Strategy) -> PlacementDecision {
        PlacementDecision {
            page,
            strategy,
            origin: Point::new(0.0, 0.0),
            size: StampSize::new(10.0, 10.0),
            rotation: 0,
            off_page: false,
        }
    }

    #[test]
    fn tally_counts_anchor_and_distinct_pages() {
        let mut tally = FileTally::new();
        tally.record(&make_decision(3, Strategy::Anchor { regex: "x".into() }));
        tally.record(&make_decision(3, Strategy::AbsoluteXy));
        tally.record(&make_decision(1, Strategy::AbsoluteXy));
        assert_eq!(tally.placements(), 3);
        assert_eq!(tally.anchor_placements(), 1);
        assert_eq!(tally.pages_affected(), 2);
    }

    #[test]
    fn rule_with_anchor_hit_is_rules_match() {
        let rule = Rule::new("*.pdf");
        let mut tally = FileTally::new();
        tally.record(&make_decision(1, Strategy::Anchor { regex: "firma".into() }));
        let out = classify(Some(&rule), true, false, &tally);
        assert_eq!(out.match_source, MatchSource::RulesMatch);
        assert_eq!(out.rule_name.as_deref(), Some("*.pdf"));
        assert_eq!(out.pages_affected, 1);
    }

    #[test]
    fn rule_without_anchor_hit_is_rules_fallback() {
        let rule = Rule::new("*.pdf");
        let out = classify(Some(&rule), true, false, &FileTally::new());
        assert_eq!(out.match_source, MatchSource::RulesFallback);
        assert_eq!(out.reason, "anchors_not_found");

        let out = classify(Some(&rule), false, true, &FileTally::new());
        assert_eq!(out.match_source, MatchSource::RulesFallback);
        assert_eq!(out.reason, "no_anchors_configured");
    }

    #[test]
    fn no_rule_splits_on_manifest_rows() {
        let tally = FileTally::new();
        assert_eq!(classify(None, false, true, &tally).match_source, MatchSource::NoRulesManifest);
        let out = classify(None, true, false, &tally);
        assert_eq!(out.match_source, MatchSource::NoRulesDefault);
        assert_eq!(out.rule_name, None);
    }

    #[test]
    fn match_source_parses_case_insensitively() {
        assert_eq!("RULES_FALLBACK".parse::<MatchSource>().unwrap(), MatchSource::RulesFallback);
        assert!("unknown".parse::<MatchSource>().is_err());
        assert_eq!(MatchSource::NoRulesDefault.to_string(), "no_rules_default");
    }
}
