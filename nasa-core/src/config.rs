//! Driver configuration.
//!
//! [`DriverConfig`] is the small JSON document the integration persists
//! between runs. [`Endpoints`] lists the upstream URLs; it is not persisted and
//! exists so the client can be pointed at a local mock server.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constants::{
    APOD_URL, DEMO_API_KEY, DONKI_URL, EPIC_URL, ISS_CREW_URL, ISS_POSITION_URL, MARS_ROVERS_URL,
    NEO_FEED_URL,
};
use crate::error::Result;

const DEFAULT_REFRESH_MINUTES: u64 = 10;
const DEFAULT_DEVICE_ID: &str = "nasa_mission_control";
const DEFAULT_DEVICE_NAME: &str = "NASA Mission Control";

/// Persisted driver settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// NASA API key; empty means the public demo key
    pub api_key: String,
    /// Polling cadence in minutes
    pub refresh_interval: u64,
    /// Entity identifier on the remote
    pub device_id: String,
    /// Entity name on the remote
    pub device_name: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            refresh_interval: DEFAULT_REFRESH_MINUTES,
            device_id: DEFAULT_DEVICE_ID.into(),
            device_name: DEFAULT_DEVICE_NAME.into(),
        }
    }
}

impl DriverConfig {
    /// Loads the configuration file, or the defaults if it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "Configuration file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Like [`DriverConfig::load`], but falls back to the defaults on any error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path.as_ref()).unwrap_or_else(|e| {
            warn!(path = %path.as_ref().display(), error = %e, "Failed to load configuration");
            Self::default()
        })
    }

    /// Writes the configuration as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// The credential to send upstream.
    pub fn effective_api_key(&self) -> &str {
        resolve_api_key(&self.api_key)
    }

    /// Returns true if a personal API key is configured.
    pub fn has_personal_key(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && key != DEMO_API_KEY
    }

    /// API key with all but the last four characters hidden, for display.
    pub fn masked_api_key(&self) -> String {
        if !self.has_personal_key() {
            return DEMO_API_KEY.into();
        }
        let chars: Vec<char> = self.api_key.trim().chars().collect();
        let visible = chars.len().min(4);
        let hidden = chars.len() - visible;
        let tail: String = chars[hidden..].iter().collect();
        format!("{}{}", "*".repeat(hidden), tail)
    }
}

/// Maps an empty credential to the public demo key.
pub fn resolve_api_key(api_key: &str) -> &str {
    let trimmed = api_key.trim();
    if trimmed.is_empty() {
        DEMO_API_KEY
    } else {
        trimmed
    }
}

/// Upstream base URLs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Astronomy Picture of the Day
    pub apod: String,
    /// EPIC imagery metadata
    pub epic: String,
    /// ISS position
    pub iss_position: String,
    /// People in space
    pub iss_crew: String,
    /// Today's near-earth objects
    pub neo_feed: String,
    /// Mars rover archive base (rover name is appended)
    pub mars_rovers: String,
    /// DONKI notifications
    pub donki: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            apod: APOD_URL.into(),
            epic: EPIC_URL.into(),
            iss_position: ISS_POSITION_URL.into(),
            iss_crew: ISS_CREW_URL.into(),
            neo_feed: NEO_FEED_URL.into(),
            mars_rovers: MARS_ROVERS_URL.into(),
            donki: DONKI_URL.into(),
        }
    }
}

impl Endpoints {
    /// Points every feed at one base URL, keeping the upstream paths.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            apod: format!("{base}/planetary/apod"),
            epic: format!("{base}/api/natural"),
            iss_position: format!("{base}/iss-now.json"),
            iss_crew: format!("{base}/astros.json"),
            neo_feed: format!("{base}/neo/rest/v1/feed/today"),
            mars_rovers: format!("{base}/mars-photos/api/v1/rovers"),
            donki: format!("{base}/DONKI/notifications"),
        }
    }

    /// Photo listing URL for one rover.
    pub fn mars_photos(&self, rover: &str) -> String {
        format!("{}/{}/photos", self.mars_rovers.trim_end_matches('/'), rover)
    }
}
