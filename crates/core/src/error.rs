// ABOUTME: Error types for metadata extraction and fetching.
// ABOUTME: Provides the Error enum with ValueNotFound, UnknownRule, InvalidUrl, Fetch, and NotHtml variants.

use thiserror::Error;

/// Errors that can occur while fetching a page or extracting metadata.
///
/// `ValueNotFound` is the expected outcome for any field a document simply
/// does not carry; it never aborts a full extraction pass. The remaining
/// variants are boundary failures (bad input URL, network, non-HTML payload).
#[derive(Debug, Error)]
pub enum Error {
    /// A rule exhausted all of its strategies without a match.
    #[error("no value found")]
    ValueNotFound,

    /// A rule key that is not registered with the extractor.
    #[error("unknown rule key: {0}")]
    UnknownRule(String),

    /// The target URL could not be parsed or uses an unsupported scheme.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The page could not be fetched (network failure, blocked address,
    /// oversized body, or a non-success status).
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The fetched resource is not an HTML document.
    #[error("not an HTML document: {0}")]
    NotHtml(String),
}

impl Error {
    /// Creates an InvalidUrl error from anything displayable.
    pub fn invalid_url(err: impl std::fmt::Display) -> Self {
        Error::InvalidUrl(err.to_string())
    }

    /// Creates a Fetch error from anything displayable.
    pub fn fetch(err: impl std::fmt::Display) -> Self {
        Error::Fetch(err.to_string())
    }

    /// Returns true if this is a ValueNotFound error.
    pub fn is_value_not_found(&self) -> bool {
        matches!(self, Error::ValueNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_not_found_display() {
        let err = Error::ValueNotFound;
        assert_eq!(err.to_string(), "no value found");
        assert!(err.is_value_not_found());
    }

    #[test]
    fn test_fetch_error_wraps_message() {
        let err = Error::fetch("connection refused");
        assert_eq!(err.to_string(), "fetch failed: connection refused");
        assert!(!err.is_value_not_found());
    }

    #[test]
    fn test_unknown_rule_names_key() {
        let err = Error::UnknownRule("video".to_string());
        assert_eq!(err.to_string(), "unknown rule key: video");
    }
}
