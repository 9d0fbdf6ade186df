//! Connectivity probe run before a client is put into service.
//!
//! Tries the daily image, the station position and the asteroid feed directly
//! (bypassing the cache) and passes if at least one of them answers with
//! plausible data.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use nasa_core::types::{MediaTriple, SourceId};

use crate::client::NasaClient;

/// Sources exercised by the probe, in order.
pub const PROBED_SOURCES: [SourceId; 3] = [SourceId::Apod, SourceId::Iss, SourceId::Neo];

/// Probe timing.
#[derive(Clone, Debug)]
pub struct ProbeConfig {
    /// Attempts per source
    pub attempts: u32,
    /// Ceiling for one attempt
    pub attempt_timeout: Duration,
    /// Pause between attempts on the same source
    pub retry_pause: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            attempts: 2,
            attempt_timeout: Duration::from_secs(3),
            retry_pause: Duration::from_millis(500),
        }
    }
}

/// Why a probed source did not pass.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProbeFailure {
    /// The attempt exceeded its ceiling.
    #[error("Timeout")]
    Timeout,
    /// Data arrived but did not look like this source.
    #[error("Invalid data format")]
    InvalidData,
    /// The fetcher reported an error.
    #[error("{0}")]
    Fetch(String),
}

impl ProbeFailure {
    fn is_network(&self) -> bool {
        match self {
            ProbeFailure::Timeout => true,
            ProbeFailure::InvalidData => false,
            ProbeFailure::Fetch(message) => {
                let message = message.to_lowercase();
                message.contains("timeout") || message.contains("connection")
            }
        }
    }
}

/// Outcome of a probe run.
#[derive(Clone, Debug, Serialize)]
pub struct ProbeReport {
    /// Whether at least one source passed
    pub success: bool,
    /// Sources that passed
    pub passed: Vec<SourceId>,
    /// Last failure of every source that did not pass
    pub failures: Vec<(SourceId, String)>,
    /// Summary for the user when nothing passed
    pub error: Option<String>,
}

/// Checks whether a probed source's triple looks like real data.
pub fn looks_valid(source: SourceId, triple: &MediaTriple) -> bool {
    let title = triple.title.as_str();
    match source {
        SourceId::Apod => title.chars().count() > 5,
        SourceId::Iss => title.contains("ISS") && (title.contains('°') || title.contains("over")),
        SourceId::Neo => {
            let lower = title.to_lowercase();
            lower.contains("asteroid") || lower.contains("today")
        }
        _ => !title.is_empty(),
    }
}

/// Probes with the default timing.
pub async fn check_connectivity(client: &NasaClient) -> ProbeReport {
    check_connectivity_with(client, &ProbeConfig::default()).await
}

/// Probes with explicit timing.
pub async fn check_connectivity_with(client: &NasaClient, config: &ProbeConfig) -> ProbeReport {
    info!("Testing NASA API connectivity");

    let mut passed = Vec::new();
    let mut failures = Vec::new();

    for source in PROBED_SOURCES {
        match probe_source(client, source, config).await {
            Ok(title) => {
                info!(source = %source, title = %title, "Probe passed");
                passed.push(source);
            }
            Err(failure) => failures.push((source, failure)),
        }
    }

    let error = if passed.is_empty() {
        let message = classify(&failures);
        warn!(error = message, "All probes failed");
        Some(message.to_string())
    } else {
        None
    };

    ProbeReport {
        success: !passed.is_empty(),
        passed,
        failures: failures
            .into_iter()
            .map(|(source, failure)| (source, failure.to_string()))
            .collect(),
        error,
    }
}

async fn probe_source(
    client: &NasaClient,
    source: SourceId,
    config: &ProbeConfig,
) -> Result<String, ProbeFailure> {
    let attempts = config.attempts.max(1);
    let mut attempt = 1;

    loop {
        debug!(source = %source, attempt, attempts, "Probing");

        let failure = match tokio::time::timeout(config.attempt_timeout, client.fetch_uncached(source)).await {
            Ok(Ok(triple)) if looks_valid(source, &triple) => return Ok(triple.title),
            Ok(Ok(_)) => ProbeFailure::InvalidData,
            Ok(Err(e)) => ProbeFailure::Fetch(e.to_string()),
            Err(_) => ProbeFailure::Timeout,
        };
        debug!(source = %source, attempt, failure = %failure, "Probe attempt failed");

        if attempt >= attempts {
            return Err(failure);
        }
        attempt += 1;
        tokio::time::sleep(config.retry_pause).await;
    }
}

fn classify(failures: &[(SourceId, ProbeFailure)]) -> &'static str {
    if failures.iter().all(|(_, f)| f.is_network()) {
        "Network connectivity issue - check internet connection"
    } else if failures.iter().any(|(source, _)| *source == SourceId::Apod) {
        "NASA API key may be invalid or rate limited"
    } else {
        "Multiple API failures detected"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use nasa_core::config::Endpoints;
    use nasa_core::traits::JsonTransport;

    use crate::client::ClientConfig;
    use crate::fetchers::testing::CannedTransport;

    fn fast() -> ProbeConfig {
        ProbeConfig {
            attempts: 2,
            attempt_timeout: Duration::from_millis(100),
            retry_pause: Duration::from_millis(1),
        }
    }

    struct StallingTransport;

    #[async_trait]
    impl JsonTransport for StallingTransport {
        async fn get_json(&self, _: &str, _: &[(&str, String)], _: &[(&str, &str)]) -> Option<Value> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            None
        }
    }

    #[test]
    fn test_validation_rules() {
        assert!(looks_valid(SourceId::Apod, &MediaTriple::text("Pretty Nebula", "")));
        assert!(!looks_valid(SourceId::Apod, &MediaTriple::text("Moon", "")));
        assert!(looks_valid(SourceId::Iss, &MediaTriple::text("ISS over Europe • 1.00°, 2.00°", "")));
        assert!(!looks_valid(SourceId::Iss, &MediaTriple::text("ISS tracking offline", "")));
        assert!(looks_valid(SourceId::Neo, &MediaTriple::text("Today: 3 asteroids", "")));
        assert!(!looks_valid(SourceId::Neo, &MediaTriple::text("Nothing", "")));
    }

    #[tokio::test]
    async fn test_one_passing_source_is_enough() {
        let endpoints = Endpoints::default();
        let transport = CannedTransport::default().with(
            &endpoints.iss_position,
            json!({"message": "success", "timestamp": 0, "iss_position": {"latitude": "51.5", "longitude": "0.1"}}),
        );
        let client = NasaClient::with_transport(ClientConfig::default(), Arc::new(transport));

        let report = check_connectivity_with(&client, &fast()).await;
        assert!(report.success);
        assert_eq!(report.passed, vec![SourceId::Iss]);
        assert_eq!(report.failures.len(), 2);
        assert!(report.error.is_none());
    }

    #[tokio::test]
    async fn test_api_failures_blame_the_key() {
        let client = NasaClient::with_transport(
            ClientConfig::default(),
            Arc::new(CannedTransport::default()),
        );

        let report = check_connectivity_with(&client, &fast()).await;
        assert!(!report.success);
        assert_eq!(report.error.as_deref(), Some("NASA API key may be invalid or rate limited"));
    }

    #[tokio::test]
    async fn test_timeouts_blame_the_network() {
        let client = NasaClient::with_transport(ClientConfig::default(), Arc::new(StallingTransport));

        let report = check_connectivity_with(&client, &fast()).await;
        assert!(!report.success);
        assert_eq!(
            report.error.as_deref(),
            Some("Network connectivity issue - check internet connection")
        );
        assert!(report.failures.iter().all(|(_, f)| f == "Timeout"));
    }

    #[test]
    fn test_classify_without_daily_image() {
        let failures = vec![
            (SourceId::Iss, ProbeFailure::InvalidData),
            (SourceId::Neo, ProbeFailure::Fetch("neo payload malformed: x".into())),
        ];
        assert_eq!(classify(&failures), "Multiple API failures detected");
    }
}
