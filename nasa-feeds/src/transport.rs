//! Pooled HTTP transport with a small uniform retry loop.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{debug, error, instrument, warn};

use nasa_core::constants::{
    CONNECT_TIMEOUT_SECS, MAX_ATTEMPTS, POOL_IDLE_TIMEOUT_SECS, POOL_MAX_IDLE_PER_HOST, POOL_MAX_TOTAL,
    RATE_LIMIT_BACKOFF_MS, READ_TIMEOUT_SECS, REQUEST_TIMEOUT_SECS, RETRY_BACKOFF_MS, USER_AGENT,
};
use nasa_core::error::{NasaError, Result};
use nasa_core::traits::JsonTransport;

/// HTTP transport configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Total request ceiling in milliseconds
    pub request_timeout_ms: u64,
    /// Connect ceiling in milliseconds
    pub connect_timeout_ms: u64,
    /// Socket read ceiling in milliseconds
    pub read_timeout_ms: u64,
    /// Idle connections kept per host
    pub pool_max_idle_per_host: usize,
    /// Requests in flight at once, across all hosts
    pub pool_max_total: usize,
    /// Idle keep-alive in seconds
    pub pool_idle_timeout_secs: u64,
    /// Attempts per request, including the first
    pub max_attempts: u32,
    /// Pause before retrying a timeout, connect failure or unexpected status
    pub retry_backoff_ms: u64,
    /// Pause before retrying after HTTP 429
    pub rate_limit_backoff_ms: u64,
    /// User agent header
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: REQUEST_TIMEOUT_SECS * 1000,
            connect_timeout_ms: CONNECT_TIMEOUT_SECS * 1000,
            read_timeout_ms: READ_TIMEOUT_SECS * 1000,
            pool_max_idle_per_host: POOL_MAX_IDLE_PER_HOST,
            pool_max_total: POOL_MAX_TOTAL,
            pool_idle_timeout_secs: POOL_IDLE_TIMEOUT_SECS,
            max_attempts: MAX_ATTEMPTS,
            retry_backoff_ms: RETRY_BACKOFF_MS,
            rate_limit_backoff_ms: RATE_LIMIT_BACKOFF_MS,
            user_agent: USER_AGENT.into(),
        }
    }
}

/// What one attempt decided.
#[derive(Debug)]
enum Attempt {
    /// Stop here with this result.
    Done(Option<Value>),
    /// Sleep, then try again if attempts remain.
    Retry(Duration),
}

/// [`JsonTransport`] backed by a shared `reqwest` connection pool.
///
/// Certificates and hostnames are always verified (rustls with the bundled
/// web-pki roots). The client is cheap to clone and safe to share between
/// concurrent fetches.
///
/// `reqwest` only bounds idle connections per host, so the total is capped by
/// a semaphore held for the duration of each attempt. Backoff sleeps do not
/// hold a permit.
#[derive(Clone)]
pub struct HttpTransport {
    config: TransportConfig,
    http_client: reqwest::Client,
    permits: Arc<Semaphore>,
}

impl HttpTransport {
    /// Creates a transport with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(TransportConfig::default())
    }

    /// Creates a transport with a custom configuration.
    pub fn with_config(config: TransportConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .read_timeout(Duration::from_millis(config.read_timeout_ms))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .build()
            .map_err(|e| NasaError::ConfigError(format!("Failed to create HTTP client: {e}")))?;

        let permits = Arc::new(Semaphore::new(config.pool_max_total.max(1)));

        Ok(Self {
            config,
            http_client,
            permits,
        })
    }

    /// Returns the transport configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    async fn attempt(
        &self,
        url: &str,
        query: &[(&str, String)],
        headers: &[(&str, &str)],
    ) -> Attempt {
        let mut request = self.http_client.get(url).query(query);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return self.classify_error(url, &e),
        };

        let status = response.status();
        debug!(url, status = status.as_u16(), "Response received");

        match status {
            StatusCode::OK => {}
            StatusCode::TOO_MANY_REQUESTS => {
                warn!(url, "Rate limited");
                return Attempt::Retry(Duration::from_millis(self.config.rate_limit_backoff_ms));
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!(url, status = status.as_u16(), "Authentication error");
                return Attempt::Done(None);
            }
            _ => {
                debug!(url, status = status.as_u16(), "Unexpected status");
                return Attempt::Retry(Duration::from_millis(self.config.retry_backoff_ms));
            }
        }

        let json_labeled = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return self.classify_error(url, &e),
        };

        Attempt::Done(decode_body(url, &body, json_labeled))
    }

    fn classify_error(&self, url: &str, e: &reqwest::Error) -> Attempt {
        if e.is_timeout() || e.is_connect() {
            debug!(url, error = %e, "Timeout or connection error");
            Attempt::Retry(Duration::from_millis(self.config.retry_backoff_ms))
        } else {
            debug!(url, error = %e, "Client error");
            Attempt::Done(None)
        }
    }
}

/// Parses a 200 body: JSON-labeled bodies always, anything else only if it looks like JSON.
fn decode_body(url: &str, body: &str, json_labeled: bool) -> Option<Value> {
    let trimmed = body.trim_start();
    if !json_labeled && !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        debug!(url, body = %excerpt(body), "Non-JSON response");
        return None;
    }

    match serde_json::from_str(body) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(url, error = %e, body = %excerpt(body), "Invalid JSON");
            None
        }
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(100).collect()
}

#[async_trait]
impl JsonTransport for HttpTransport {
    #[instrument(skip(self, query, headers))]
    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
        headers: &[(&str, &str)],
    ) -> Option<Value> {
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            debug!(url, attempt, max_attempts, "Making request");

            let outcome = match self.permits.acquire().await {
                Ok(_permit) => self.attempt(url, query, headers).await,
                Err(_) => return None,
            };

            match outcome {
                Attempt::Done(result) => return result,
                Attempt::Retry(delay) if attempt < max_attempts => {
                    debug!(url, attempt, delay_ms = delay.as_millis() as u64, "Retrying");
                    tokio::time::sleep(delay).await;
                }
                Attempt::Retry(_) => {}
            }
        }

        error!(url, attempts = max_attempts, "Request failed after retries");
        None
    }
}
