//! The display triple returned for every fetch.

use serde::{Deserialize, Serialize};

use crate::constants::{
    CONNECTING_DESCRIPTION, CONNECTING_TITLE, ERROR_DESCRIPTION, TIMEOUT_DESCRIPTION,
    UNKNOWN_SOURCE_DESCRIPTION, UNKNOWN_SOURCE_TITLE,
};
use crate::types::SourceId;

/// What the remote shows for a source: an image plus two short text lines.
///
/// `image_url` is empty when the upstream feed carries no picture; the remote
/// then falls back to an illustrative image of its own.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTriple {
    /// Upstream image URL, or empty
    pub image_url: String,
    /// Headline (~80 chars)
    pub title: String,
    /// Subtitle (~40 chars)
    pub description: String,
}

impl MediaTriple {
    /// Creates a triple.
    pub fn new(
        image_url: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            image_url: image_url.into(),
            title: title.into(),
            description: description.into(),
        }
    }

    /// Creates a triple without an image.
    pub fn text(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(String::new(), title, description)
    }

    /// Per-source text shown when the upstream feed is down or malformed.
    pub fn offline(source: SourceId) -> Self {
        match source {
            SourceId::Apod => Self::text("APOD service unavailable", "Check connection"),
            SourceId::Epic => Self::text("Earth observation offline", "Service unavailable"),
            SourceId::Iss => Self::text("ISS tracking offline", "Position unavailable"),
            SourceId::Neo => Self::text("Asteroid tracking offline", "Service unavailable"),
            SourceId::Insight => Self::text("Mars mission data offline", "Service unavailable"),
            SourceId::Donki => Self::text("Space weather offline", "Service unavailable"),
        }
    }

    /// Shown when a fetch exceeded the dispatch ceiling.
    pub fn timeout(source: SourceId) -> Self {
        Self::text(format!("{} service timeout", source.label()), TIMEOUT_DESCRIPTION)
    }

    /// Shown when a fetcher failed in an unexpected way.
    pub fn service_error(source: SourceId) -> Self {
        Self::text(format!("{} service error", source.label()), ERROR_DESCRIPTION)
    }

    /// Shown while the first fetch of a source is still in flight.
    pub fn connecting() -> Self {
        Self::text(CONNECTING_TITLE, CONNECTING_DESCRIPTION)
    }

    /// Shown for a source identifier outside the catalog.
    pub fn unknown_source() -> Self {
        Self::text(UNKNOWN_SOURCE_TITLE, UNKNOWN_SOURCE_DESCRIPTION)
    }

    /// Returns true if the triple carries an upstream image.
    pub fn has_image(&self) -> bool {
        !self.image_url.is_empty()
    }

    /// The upstream image to display for `source`, if it should be used at all.
    ///
    /// Only the daily image is shown from upstream, only over http(s), and
    /// never when it is an EPIC `.png` (those are full-disc renders that look
    /// wrong in the media slot). `None` means "use the fallback illustration".
    pub fn display_image(&self, source: SourceId) -> Option<&str> {
        let url = self.image_url.as_str();
        if source != SourceId::Apod || !url.starts_with("http") {
            return None;
        }
        if url.ends_with(".png") && url.contains("epic.gsfc.nasa.gov") {
            return None;
        }
        Some(url)
    }
}
