//! In-memory TTL cache for feed results.

use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use nasa_core::constants::STATS_TITLE_EXCERPT;
use nasa_core::types::{MediaTriple, SourceId};

/// Last successful fetch of one source.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    /// The triple as fetched
    pub triple: MediaTriple,
    /// When the fetch completed
    pub fetched_at: Instant,
}

impl CacheEntry {
    fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.fetched_at)
    }

    fn is_fresh_at(&self, source: SourceId, now: Instant) -> bool {
        self.age_at(now) < source.ttl()
    }
}

/// Cache of the latest triple per source.
///
/// Exactly one slot per [`SourceId`]; nothing is ever evicted. A stale entry
/// stays readable through [`SourceCache::get`] so it can still be shown while a
/// refresh is in flight, but [`SourceCache::is_valid`] reports it as expired.
///
/// Thread-safe; reads never block each other.
pub struct SourceCache {
    slots: RwLock<[Option<CacheEntry>; SourceId::COUNT]>,
}

impl SourceCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(Default::default()),
        }
    }

    /// Returns true if `source` has a record younger than its TTL.
    pub fn is_valid(&self, source: SourceId) -> bool {
        self.is_valid_at(source, Instant::now())
    }

    /// [`SourceCache::is_valid`] evaluated at an arbitrary instant.
    pub fn is_valid_at(&self, source: SourceId, now: Instant) -> bool {
        self.slots.read()[source.index()]
            .as_ref()
            .is_some_and(|e| e.is_fresh_at(source, now))
    }

    /// Last fetched triple for `source`, fresh or stale.
    pub fn get(&self, source: SourceId) -> Option<MediaTriple> {
        self.slots.read()[source.index()]
            .as_ref()
            .map(|e| e.triple.clone())
    }

    /// Last fetched triple for `source`, only while it is fresh.
    pub fn get_fresh(&self, source: SourceId) -> Option<MediaTriple> {
        let now = Instant::now();
        self.slots.read()[source.index()]
            .as_ref()
            .filter(|e| e.is_fresh_at(source, now))
            .map(|e| e.triple.clone())
    }

    /// Replaces the record for `source`, stamped with the current time.
    pub fn put(&self, source: SourceId, triple: MediaTriple) {
        self.put_at(source, triple, Instant::now());
    }

    /// Replaces the record for `source` with an explicit fetch time.
    pub fn put_at(&self, source: SourceId, triple: MediaTriple, fetched_at: Instant) {
        self.slots.write()[source.index()] = Some(CacheEntry { triple, fetched_at });
    }

    /// Number of sources with a record.
    pub fn len(&self) -> usize {
        self.slots.read().iter().filter(|s| s.is_some()).count()
    }

    /// Returns true if no source has been fetched yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Diagnostics for every source.
    pub fn stats(&self) -> CacheStats {
        self.stats_at(Instant::now())
    }

    /// [`SourceCache::stats`] evaluated at an arbitrary instant.
    pub fn stats_at(&self, now: Instant) -> CacheStats {
        let slots = self.slots.read();
        let sources = SourceId::ALL
            .into_iter()
            .map(|source| match &slots[source.index()] {
                Some(entry) => SourceCacheStats {
                    source,
                    cached: true,
                    age_seconds: Some(entry.age_at(now).as_secs()),
                    valid: entry.is_fresh_at(source, now),
                    last_title: Some(entry.triple.title.chars().take(STATS_TITLE_EXCERPT).collect()),
                },
                None => SourceCacheStats {
                    source,
                    cached: false,
                    age_seconds: None,
                    valid: false,
                    last_title: None,
                },
            })
            .collect();

        CacheStats { sources }
    }
}

impl Default for SourceCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache diagnostics for one source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCacheStats {
    /// Source these figures describe
    pub source: SourceId,
    /// Whether a record exists
    pub cached: bool,
    /// Age of the record in whole seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_seconds: Option<u64>,
    /// Whether the record is younger than the source TTL
    pub valid: bool,
    /// First characters of the cached title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_title: Option<String>,
}

/// Cache diagnostics for all sources, in catalog order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheStats {
    /// One entry per source
    pub sources: Vec<SourceCacheStats>,
}

impl CacheStats {
    /// Figures for one source.
    pub fn get(&self, source: SourceId) -> Option<&SourceCacheStats> {
        self.sources.iter().find(|s| s.source == source)
    }

    /// Number of sources with a fresh record.
    pub fn valid_count(&self) -> usize {
        self.sources.iter().filter(|s| s.valid).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn triple(title: &str) -> MediaTriple {
        MediaTriple::text(title, "desc")
    }

    #[test]
    fn test_empty_cache() {
        let cache = SourceCache::new();
        assert!(cache.is_empty());
        for source in SourceId::ALL {
            assert!(!cache.is_valid(source));
            assert!(cache.get(source).is_none());
        }
    }

    #[test]
    fn test_put_get() {
        let cache = SourceCache::new();
        cache.put(SourceId::Neo, triple("Today: 3 asteroids"));

        assert!(cache.is_valid(SourceId::Neo));
        assert_eq!(cache.get(SourceId::Neo).unwrap().title, "Today: 3 asteroids");
        assert!(cache.get(SourceId::Iss).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_overwrites_whole_triple() {
        let cache = SourceCache::new();
        cache.put(SourceId::Apod, MediaTriple::new("http://x/a.jpg", "A", "first"));
        cache.put(SourceId::Apod, MediaTriple::text("B", "second"));

        let stored = cache.get(SourceId::Apod).unwrap();
        assert_eq!(stored, MediaTriple::text("B", "second"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_stale_entry_stays_readable() {
        let cache = SourceCache::new();
        let t0 = Instant::now();
        cache.put_at(SourceId::Iss, triple("ISS over Europe"), t0);

        let later = t0 + SourceId::Iss.ttl() + Duration::from_secs(1);
        assert!(!cache.is_valid_at(SourceId::Iss, later));
        assert_eq!(cache.get(SourceId::Iss).unwrap().title, "ISS over Europe");
    }

    #[test]
    fn test_ttl_boundary() {
        let cache = SourceCache::new();
        let t0 = Instant::now();
        cache.put_at(SourceId::Iss, triple("ISS"), t0);

        assert!(cache.is_valid_at(SourceId::Iss, t0));
        assert!(cache.is_valid_at(SourceId::Iss, t0 + Duration::from_secs(119)));
        assert!(!cache.is_valid_at(SourceId::Iss, t0 + Duration::from_secs(120)));
    }

    #[test]
    fn test_stats() {
        let cache = SourceCache::new();
        let t0 = Instant::now();
        cache.put_at(
            SourceId::Donki,
            triple("Solar activity: Quiet period (7 days)"),
            t0,
        );

        let stats = cache.stats_at(t0 + Duration::from_secs(42));
        assert_eq!(stats.sources.len(), SourceId::COUNT);
        assert_eq!(stats.valid_count(), 1);

        let donki = stats.get(SourceId::Donki).unwrap();
        assert!(donki.cached);
        assert!(donki.valid);
        assert_eq!(donki.age_seconds, Some(42));
        assert_eq!(donki.last_title.as_deref(), Some("Solar activity: Quiet period ("));

        let apod = stats.get(SourceId::Apod).unwrap();
        assert!(!apod.cached);
        assert_eq!(apod.age_seconds, None);
    }

    #[test]
    fn test_stats_serialization_skips_absent_fields() {
        let stats = SourceCache::new().stats();
        let json = serde_json::to_value(&stats.sources[0]).unwrap();
        assert_eq!(json, serde_json::json!({"source": "apod", "cached": false, "valid": false}));
    }

    proptest! {
        #[test]
        fn prop_valid_within_ttl_window(idx in 0usize..SourceId::COUNT, frac in 0.0f64..1.0) {
            let source = SourceId::ALL[idx];
            let cache = SourceCache::new();
            let t0 = Instant::now();
            cache.put_at(source, triple("x"), t0);

            let ttl = source.ttl();
            let inside = Duration::from_secs_f64(ttl.as_secs_f64() * frac).min(ttl - Duration::from_millis(1));
            prop_assert!(cache.is_valid_at(source, t0 + inside));
        }

        #[test]
        fn prop_invalid_from_ttl_on(idx in 0usize..SourceId::COUNT, extra_secs in 0u64..100_000) {
            let source = SourceId::ALL[idx];
            let cache = SourceCache::new();
            let t0 = Instant::now();
            cache.put_at(source, triple("x"), t0);

            prop_assert!(!cache.is_valid_at(source, t0 + source.ttl() + Duration::from_secs(extra_secs)));
        }
    }
}
