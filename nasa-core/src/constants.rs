//! Constants for the NASA Mission Control driver.
//!
//! Upstream endpoints, per-source cache intervals, transport limits and the
//! fixed display strings the remote shows while data is unavailable.

// ═══════════════════════════════════════════════════════════════════════════════
// UPSTREAM ENDPOINTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Astronomy Picture of the Day.
pub const APOD_URL: &str = "https://api.nasa.gov/planetary/apod";

/// EPIC natural-color Earth imagery metadata (no credential).
pub const EPIC_URL: &str = "https://epic.gsfc.nasa.gov/api/natural";

/// Live ISS position. Plain HTTP upstream.
pub const ISS_POSITION_URL: &str = "http://api.open-notify.org/iss-now.json";

/// People currently in space. Plain HTTP upstream.
pub const ISS_CREW_URL: &str = "http://api.open-notify.org/astros.json";

/// Near-earth object feed for the current day.
pub const NEO_FEED_URL: &str = "https://api.nasa.gov/neo/rest/v1/feed/today";

/// Mars rover photo archive; the rover name and `/photos` are appended.
pub const MARS_ROVERS_URL: &str = "https://api.nasa.gov/mars-photos/api/v1/rovers";

/// DONKI space-weather notifications.
pub const DONKI_URL: &str = "https://api.nasa.gov/DONKI/notifications";

/// Public rate-limited credential used when no API key is configured.
pub const DEMO_API_KEY: &str = "DEMO_KEY";

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE INTERVALS (seconds)
// ═══════════════════════════════════════════════════════════════════════════════

/// Daily image: 6 hours.
pub const APOD_TTL_SECS: u64 = 6 * 3600;

/// Earth imagery: 2 hours.
pub const EPIC_TTL_SECS: u64 = 2 * 3600;

/// Station position: 2 minutes.
pub const ISS_TTL_SECS: u64 = 2 * 60;

/// Near-earth objects: 4 hours.
pub const NEO_TTL_SECS: u64 = 4 * 3600;

/// Rover archive: 8 hours.
pub const INSIGHT_TTL_SECS: u64 = 8 * 3600;

/// Space weather: 3 hours.
pub const DONKI_TTL_SECS: u64 = 3 * 3600;

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSPORT
// ═══════════════════════════════════════════════════════════════════════════════

/// Total request ceiling.
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

/// TCP/TLS connect ceiling.
pub const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Socket read ceiling.
pub const READ_TIMEOUT_SECS: u64 = 10;

/// Idle connections kept per host.
pub const POOL_MAX_IDLE_PER_HOST: usize = 5;

/// Requests allowed on the wire at once, across all hosts
pub const POOL_MAX_TOTAL: usize = 10;

/// Idle keep-alive before a pooled connection is dropped.
pub const POOL_IDLE_TIMEOUT_SECS: u64 = 30;

/// Attempts per request, including the first.
pub const MAX_ATTEMPTS: u32 = 2;

/// Backoff after a timeout, connect failure or unexpected status.
pub const RETRY_BACKOFF_MS: u64 = 1_000;

/// Backoff after HTTP 429.
pub const RATE_LIMIT_BACKOFF_MS: u64 = 2_000;

/// User agent presented to upstream APIs.
pub const USER_AGENT: &str = "Mozilla/5.0 (Unfolded Circle NASA Integration) AppleWebKit/537.36";

// ═══════════════════════════════════════════════════════════════════════════════
// DISPATCH
// ═══════════════════════════════════════════════════════════════════════════════

/// Hard ceiling for one dispatched fetch, independent of the transport timeout.
pub const FETCH_TIMEOUT_SECS: u64 = 10;

/// Length of the title excerpt reported by cache diagnostics.
pub const STATS_TITLE_EXCERPT: usize = 30;

// ═══════════════════════════════════════════════════════════════════════════════
// FEED PARAMETERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Mean orbital speed of the ISS as displayed.
pub const ISS_SPEED_LABEL: &str = "27,600 km/h";

/// Rovers in the photo archive with their last sol.
pub const MARS_ROVERS: [(&str, u32); 3] = [("curiosity", 4000), ("opportunity", 5111), ("spirit", 2210)];

/// Lowest sol picked at random.
pub const MARS_MIN_SOL: u32 = 100;

/// Highest sol picked at random, capped by each rover's own range.
pub const MARS_MAX_SOL: u32 = 1500;

/// Photo count above which a sol is described as active.
pub const MARS_ACTIVE_SOL_PHOTOS: usize = 50;

/// Trailing window for space-weather notifications.
pub const DONKI_WINDOW_DAYS: i64 = 7;

/// Summaries listed in the space-weather title.
pub const DONKI_MAX_SUMMARIES: usize = 3;

/// First sentences up to this length are shown verbatim.
pub const APOD_SENTENCE_MAX: usize = 30;

/// Word budget for a shortened first sentence, before the ellipsis.
pub const APOD_SHORT_BUDGET: usize = 28;

// ═══════════════════════════════════════════════════════════════════════════════
// PLACEHOLDER TEXT
// ═══════════════════════════════════════════════════════════════════════════════

/// Title while the first fetch of a source is still in flight.
pub const CONNECTING_TITLE: &str = "Fetching live data...";

/// Description while the first fetch of a source is still in flight.
pub const CONNECTING_DESCRIPTION: &str = "Connecting to NASA...";

/// Title for an unrecognized source identifier.
pub const UNKNOWN_SOURCE_TITLE: &str = "Unknown data source";

/// Description for an unrecognized source identifier.
pub const UNKNOWN_SOURCE_DESCRIPTION: &str = "Invalid request";

/// Description paired with the "service timeout" title.
pub const TIMEOUT_DESCRIPTION: &str = "Connection slow";

/// Description paired with the "service error" title.
pub const ERROR_DESCRIPTION: &str = "Check connection";
