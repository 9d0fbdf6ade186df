//! The closed set of upstream feeds.
//!
//! Each feed is identified on the wire by a short lowercase id (`"apod"`,
//! `"iss"`, ...). The catalog order below is also the order the remote cycles
//! through with next/previous.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    APOD_TTL_SECS, DONKI_TTL_SECS, EPIC_TTL_SECS, INSIGHT_TTL_SECS, ISS_TTL_SECS, NEO_TTL_SECS,
};
use crate::error::NasaError;

/// One of the six NASA-adjacent data feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    /// Astronomy Picture of the Day.
    Apod,
    /// EPIC full-disc Earth imagery.
    Epic,
    /// International Space Station position and crew.
    Iss,
    /// Near-earth objects approaching today.
    Neo,
    /// Mars rover photo archive.
    Insight,
    /// DONKI space-weather notifications.
    Donki,
}

impl SourceId {
    /// Number of sources.
    pub const COUNT: usize = 6;

    /// All sources in catalog order.
    pub const ALL: [SourceId; Self::COUNT] = [
        SourceId::Apod,
        SourceId::Epic,
        SourceId::Iss,
        SourceId::Neo,
        SourceId::Insight,
        SourceId::Donki,
    ];

    /// Wire identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            SourceId::Apod => "apod",
            SourceId::Epic => "epic",
            SourceId::Iss => "iss",
            SourceId::Neo => "neo",
            SourceId::Insight => "insight",
            SourceId::Donki => "donki",
        }
    }

    /// Position in [`SourceId::ALL`]; doubles as the slot index for per-source tables.
    pub const fn index(self) -> usize {
        match self {
            SourceId::Apod => 0,
            SourceId::Epic => 1,
            SourceId::Iss => 2,
            SourceId::Neo => 3,
            SourceId::Insight => 4,
            SourceId::Donki => 5,
        }
    }

    /// How long a fetched record stays fresh.
    pub const fn ttl(self) -> Duration {
        let secs = match self {
            SourceId::Apod => APOD_TTL_SECS,
            SourceId::Epic => EPIC_TTL_SECS,
            SourceId::Iss => ISS_TTL_SECS,
            SourceId::Neo => NEO_TTL_SECS,
            SourceId::Insight => INSIGHT_TTL_SECS,
            SourceId::Donki => DONKI_TTL_SECS,
        };
        Duration::from_secs(secs)
    }

    /// Name shown in the remote's source list.
    pub const fn display_name(self) -> &'static str {
        match self {
            SourceId::Apod => "Daily Universe",
            SourceId::Epic => "Earth Live",
            SourceId::Iss => "ISS Tracker",
            SourceId::Neo => "NEO Watch",
            SourceId::Insight => "Mars Archive",
            SourceId::Donki => "Space Weather",
        }
    }

    /// One-line description of the feed.
    pub const fn blurb(self) -> &'static str {
        match self {
            SourceId::Apod => "Astronomy Picture of the Day",
            SourceId::Epic => "Earth from Deep Space",
            SourceId::Iss => "International Space Station Location",
            SourceId::Neo => "Near Earth Objects",
            SourceId::Insight => "Mars Mission Data",
            SourceId::Donki => "Solar Events & Space Weather",
        }
    }

    /// Whether cached records of this source carry an upstream image URL.
    ///
    /// Only the daily image does; every other source leaves image selection to
    /// the illustrative fallback.
    pub const fn carries_image(self) -> bool {
        matches!(self, SourceId::Apod)
    }

    /// Looks up a source by its display name.
    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.display_name() == name)
    }

    /// Next source in catalog order, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::COUNT]
    }

    /// Previous source in catalog order, wrapping around.
    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::COUNT - 1) % Self::COUNT]
    }

    /// Uppercase label used in placeholder titles ("APOD service timeout").
    pub fn label(self) -> String {
        self.as_str().to_uppercase()
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = NasaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| NasaError::UnknownSource(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_index_matches_catalog_order() {
        for (i, source) in SourceId::ALL.iter().enumerate() {
            assert_eq!(source.index(), i);
        }
    }

    #[test]
    fn test_parse_wire_ids() {
        for source in SourceId::ALL {
            assert_eq!(source.as_str().parse::<SourceId>().unwrap(), source);
        }
        assert!(matches!(
            "not_a_real_source".parse::<SourceId>(),
            Err(NasaError::UnknownSource(_))
        ));
        assert!("APOD".parse::<SourceId>().is_err());
    }

    #[test_case(SourceId::Apod, 6 * 3600)]
    #[test_case(SourceId::Epic, 2 * 3600)]
    #[test_case(SourceId::Iss, 120)]
    #[test_case(SourceId::Neo, 4 * 3600)]
    #[test_case(SourceId::Insight, 8 * 3600)]
    #[test_case(SourceId::Donki, 3 * 3600)]
    fn test_ttl_table(source: SourceId, secs: u64) {
        assert_eq!(source.ttl(), Duration::from_secs(secs));
    }

    #[test]
    fn test_next_previous_wrap() {
        assert_eq!(SourceId::Apod.next(), SourceId::Epic);
        assert_eq!(SourceId::Donki.next(), SourceId::Apod);
        assert_eq!(SourceId::Apod.previous(), SourceId::Donki);
        assert_eq!(SourceId::Neo.previous(), SourceId::Iss);

        for source in SourceId::ALL {
            assert_eq!(source.next().previous(), source);
        }
    }

    #[test]
    fn test_display_name_lookup() {
        assert_eq!(SourceId::from_display_name("Mars Archive"), Some(SourceId::Insight));
        assert_eq!(SourceId::from_display_name("mars archive"), None);
    }

    #[test]
    fn test_label_and_serde() {
        assert_eq!(SourceId::Donki.label(), "DONKI");
        assert_eq!(serde_json::to_string(&SourceId::Insight).unwrap(), "\"insight\"");
        let parsed: SourceId = serde_json::from_str("\"epic\"").unwrap();
        assert_eq!(parsed, SourceId::Epic);
    }
}
