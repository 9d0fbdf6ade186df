//! Common traits for the driver.

use async_trait::async_trait;

// ═══════════════════════════════════════════════════════════════════════════════
// JSON TRANSPORT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface every fetcher uses to reach its upstream.
///
/// Implementations own retry and timeout policy. A call either yields a parsed
/// JSON document or `None`; the reason for a failure is logged by the
/// implementation, never returned, since every failure degrades the same way.
///
/// Implementations might use:
/// - A pooled HTTP client (production)
/// - Canned responses (tests)
#[async_trait]
pub trait JsonTransport: Send + Sync {
    /// Issues a GET and returns the decoded body, or `None` if no usable JSON arrived.
    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
        headers: &[(&str, &str)],
    ) -> Option<serde_json::Value>;
}
