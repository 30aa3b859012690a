//! Error type for the placement engine.
//!
//! [`PlaceError`] covers every failure the engine can report: malformed
//! lengths, page ranges, patterns and manifest fields, plus extraction or
//! document failures surfaced by a page backend. Errors are values: the
//! batch orchestrator records them against a scope and keeps going.

use std::fmt;

/// Errors raised while resolving a placement.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceError {
    /// A length expression that is neither a number nor a percentage.
    InvalidLength(String),
    /// A page range expression that cannot be parsed or selects no page.
    InvalidPageRange(String),
    /// An anchor regex that does not compile.
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Compiler message.
        message: String,
    },
    /// A filename glob that does not compile.
    InvalidGlob {
        /// The offending pattern.
        pattern: String,
        /// Compiler message.
        message: String,
    },
    /// A manifest or config field whose value cannot be interpreted.
    InvalidField {
        /// Column or key name.
        field: String,
        /// Raw value as read.
        value: String,
    },
    /// Text or drawing extraction failed on a page.
    Extraction(String),
    /// The document backend failed (load, insert, save).
    Document(String),
    /// Any other error not covered by specific variants.
    Other(String),
}

impl PlaceError {
    /// Stable tag for the error kind, used as the prefix of error log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            PlaceError::InvalidLength(_) => "InvalidLength",
            PlaceError::InvalidPageRange(_) => "InvalidPageRange",
            PlaceError::InvalidPattern { .. } => "InvalidPattern",
            PlaceError::InvalidGlob { .. } => "InvalidGlob",
            PlaceError::InvalidField { .. } => "InvalidField",
            PlaceError::Extraction(_) => "Extraction",
            PlaceError::Document(_) => "Document",
            PlaceError::Other(_) => "Other",
        }
    }
}

impl fmt::Display for PlaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceError::InvalidLength(value) => write!(f, "invalid length: '{value}'"),
            PlaceError::InvalidPageRange(msg) => write!(f, "invalid page range: {msg}"),
            PlaceError::InvalidPattern { pattern, message } => {
                write!(f, "invalid anchor regex '{pattern}': {message}")
            }
            PlaceError::InvalidGlob { pattern, message } => {
                write!(f, "invalid match pattern '{pattern}': {message}")
            }
            PlaceError::InvalidField { field, value } => {
                write!(f, "invalid value for '{field}': '{value}'")
            }
            PlaceError::Extraction(msg) => write!(f, "extraction error: {msg}"),
            PlaceError::Document(msg) => write!(f, "document error: {msg}"),
            PlaceError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PlaceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_length() {
        let err = PlaceError::InvalidLength("abc".to_string());
        assert_eq!(err.to_string(), "invalid length: 'abc'");
    }

    #[test]
    fn display_invalid_pattern() {
        let err = PlaceError::InvalidPattern {
            pattern: "(".to_string(),
            message: "unclosed group".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid anchor regex '(': unclosed group"
        );
    }

    #[test]
    fn display_invalid_field() {
        let err = PlaceError::InvalidField {
            field: "page".to_string(),
            value: "two".to_string(),
        };
        assert_eq!(err.to_string(), "invalid value for 'page': 'two'");
    }

    #[test]
    fn kind_tags_are_stable() {
        assert_eq!(PlaceError::Extraction(String::new()).kind(), "Extraction");
        assert_eq!(PlaceError::Document(String::new()).kind(), "Document");
        assert_eq!(
            PlaceError::InvalidGlob {
                pattern: String::new(),
                message: String::new()
            }
            .kind(),
            "InvalidGlob"
        );
    }

    #[test]
    fn implements_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(PlaceError::Other("boom".to_string()));
        assert_eq!(err.to_string(), "boom");
    }
}
