//! Error types for the NASA Mission Control driver.
//!
//! None of these errors ever reach the remote: the dispatch layer turns every
//! variant into one of a small set of placeholder triples. They exist so the
//! fetchers can report *why* a feed degraded, and so logging stays precise.

use thiserror::Error;

use crate::types::SourceId;

/// Result type alias using `NasaError`.
pub type Result<T> = std::result::Result<T, NasaError>;

/// Main error type for all driver operations.
#[derive(Debug, Error)]
pub enum NasaError {
    // ═══════════════════════════════════════════════════════════════════════════
    // FEED ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Upstream returned no usable data (absent body, auth failure, exhausted retries).
    #[error("{feed} feed unavailable: {reason}")]
    FeedUnavailable {
        /// Affected source
        feed: SourceId,
        /// What was missing
        reason: String,
    },

    /// Upstream data arrived but did not have the expected shape.
    #[error("{feed} payload malformed: {reason}")]
    MalformedPayload {
        /// Affected source
        feed: SourceId,
        /// What did not match
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // COORDINATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// A fetch exceeded the dispatch ceiling.
    #[error("{feed} fetch timed out after {seconds}s")]
    FetchTimeout {
        /// Affected source
        feed: SourceId,
        /// Ceiling that was exceeded
        seconds: u64,
    },

    /// Source identifier is not one of the six known feeds.
    #[error("Unknown data source: {0}")]
    UnknownSource(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION & STORAGE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl NasaError {
    /// Shorthand for [`NasaError::FeedUnavailable`].
    pub fn unavailable(feed: SourceId, reason: impl Into<String>) -> Self {
        NasaError::FeedUnavailable {
            feed,
            reason: reason.into(),
        }
    }

    /// Shorthand for [`NasaError::MalformedPayload`].
    pub fn malformed(feed: SourceId, reason: impl Into<String>) -> Self {
        NasaError::MalformedPayload {
            feed,
            reason: reason.into(),
        }
    }

    /// Returns true if this error is transient (a later attempt may succeed).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            NasaError::FeedUnavailable { .. } | NasaError::FetchTimeout { .. }
        )
    }

    /// Returns true if the upstream feed degraded and the offline triple applies.
    pub fn is_feed_error(&self) -> bool {
        matches!(
            self,
            NasaError::FeedUnavailable { .. } | NasaError::MalformedPayload { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NasaError::unavailable(SourceId::Neo, "no body");
        assert_eq!(err.to_string(), "neo feed unavailable: no body");

        let err = NasaError::FetchTimeout {
            feed: SourceId::Donki,
            seconds: 10,
        };
        assert!(err.to_string().contains("10s"));
    }

    #[test]
    fn test_error_classification() {
        assert!(NasaError::unavailable(SourceId::Iss, "no response").is_recoverable());
        assert!(!NasaError::malformed(SourceId::Iss, "bad shape").is_recoverable());
        assert!(!NasaError::ConfigError("bad".into()).is_recoverable());

        assert!(NasaError::malformed(SourceId::Epic, "empty list").is_feed_error());
        assert!(!NasaError::UnknownSource("pluto".into()).is_feed_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_result: std::result::Result<serde_json::Value, _> = serde_json::from_str("{oops");
        let result: Result<serde_json::Value> = json_result.map_err(NasaError::from);
        assert!(matches!(result, Err(NasaError::JsonError(_))));
    }
}
