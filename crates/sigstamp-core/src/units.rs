//! Length expressions: absolute page units or a percentage of a reference.
//!
//! Margins, offsets and minimum line widths may be configured either as a
//! plain number (`12`, `"12.5"`) or as a percentage string (`"10%"`). The
//! percentage is resolved against a reference dimension (page width for
//! horizontal quantities, page height for vertical ones) only when the
//! page is known.

use std::fmt;

use crate::error::PlaceError;

/// A length that is either absolute or relative to a reference dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    /// Absolute value in page units.
    Absolute(f64),
    /// Percentage (0–100 scale) of the reference dimension.
    Percent(f64),
}

impl Length {
    /// Parse a length expression.
    ///
    /// Blank input yields `Ok(None)` (the value is absent). A trailing `%`
    /// makes the value relative.
    pub fn parse(input: &str) -> Result<Option<Length>, PlaceError> {
        let s = input.trim();
        if s.is_empty() {
            return Ok(None);
        }
        if let Some(pct) = s.strip_suffix('%') {
            return pct
                .trim()
                .parse::<f64>()
                .map(|v| Some(Length::Percent(v)))
                .map_err(|_| PlaceError::InvalidLength(input.to_string()));
        }
        s.parse::<f64>()
            .map(|v| Some(Length::Absolute(v)))
            .map_err(|_| PlaceError::InvalidLength(input.to_string()))
    }

    /// Resolve to absolute units against `reference` (100%).
    pub fn resolve(&self, reference: f64) -> f64 {
        match *self {
            Length::Absolute(v) => v,
            Length::Percent(pct) => reference * pct / 100.0,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Absolute(v) => write!(f, "{v}"),
            Length::Percent(p) => write!(f, "{p}%"),
        }
    }
}

impl From<f64> for Length {
    fn from(value: f64) -> Self {
        Length::Absolute(value)
    }
}

/// Resolve an optional length, treating an absent value as zero.
pub fn resolve_or_zero(length: Option<Length>, reference: f64) -> f64 {
    length.map_or(0.0, |l| l.resolve(reference))
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Length {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_opt(deserializer)?
            .ok_or_else(|| serde::de::Error::custom("length must not be blank"))
    }
}

/// `deserialize_with` helper for `Option<Length>` fields.
///
/// Accepts null, numbers, numeric strings and percentage strings; blank
/// strings deserialize to `None`.
#[cfg(feature = "serde")]
pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<Length>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match <Option<Raw> as serde::Deserialize>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(v)) => Ok(Some(Length::Absolute(v))),
        Some(Raw::Text(s)) => Length::parse(&s).map_err(serde::de::Error::custom),
    }
}
