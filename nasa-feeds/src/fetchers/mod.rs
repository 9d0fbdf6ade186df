//! Source-specific fetchers.
//!
//! Every fetcher follows the same shape: one or two transport calls, then a
//! pure `summarize` step that turns the upstream JSON into a [`MediaTriple`].
//! A missing response is reported as [`NasaError::FeedUnavailable`], a
//! response of the wrong shape as [`NasaError::MalformedPayload`]; the
//! dispatch layer maps both to the per-source offline triple.

pub mod apod;
pub mod donki;
pub mod epic;
pub mod iss;
pub mod mars;
pub mod neo;

use serde::de::DeserializeOwned;
use serde_json::Value;

use nasa_core::config::Endpoints;
use nasa_core::error::{NasaError, Result};
use nasa_core::traits::JsonTransport;
use nasa_core::types::{MediaTriple, SourceId};

/// Everything a fetcher needs to reach its upstream.
#[derive(Clone, Copy)]
pub struct FeedContext<'a> {
    /// Shared transport
    pub transport: &'a dyn JsonTransport,
    /// Upstream URLs
    pub endpoints: &'a Endpoints,
    /// Resolved credential (never empty)
    pub api_key: &'a str,
}

impl<'a> FeedContext<'a> {
    /// GET with the credential as the only query parameter.
    pub(crate) async fn get_with_key(&self, source: SourceId, url: &str) -> Result<Value> {
        self.get(source, url, &[("api_key", self.api_key.to_string())]).await
    }

    /// GET with an explicit query; an absent response becomes `FeedUnavailable`.
    pub(crate) async fn get(
        &self,
        source: SourceId,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Value> {
        self.transport
            .get_json(url, query, &[])
            .await
            .ok_or_else(|| NasaError::unavailable(source, "no usable response"))
    }
}

/// Runs the fetcher for `source`.
pub async fn fetch(source: SourceId, ctx: &FeedContext<'_>) -> Result<MediaTriple> {
    match source {
        SourceId::Apod => apod::fetch(ctx).await,
        SourceId::Epic => epic::fetch(ctx).await,
        SourceId::Iss => iss::fetch(ctx).await,
        SourceId::Neo => neo::fetch(ctx).await,
        SourceId::Insight => mars::fetch(ctx).await,
        SourceId::Donki => donki::fetch(ctx).await,
    }
}

/// Decodes a JSON object into a typed payload.
///
/// Non-objects are rejected up front so that derive-generated sequence
/// visitors never accept an array as a struct.
pub(crate) fn decode_object<T: DeserializeOwned>(source: SourceId, value: &Value) -> Result<T> {
    if !value.is_object() {
        return Err(NasaError::malformed(source, "expected a JSON object"));
    }
    T::deserialize(value).map_err(|e| NasaError::malformed(source, e.to_string()))
}

#[cfg(test)]
pub(crate) mod testing {
    //! Canned transport for fetcher tests.

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::Value;

    use nasa_core::traits::JsonTransport;

    /// Answers by URL; unknown URLs get `None`. Records every query.
    #[derive(Default)]
    pub struct CannedTransport {
        responses: HashMap<String, Value>,
        pub calls: AtomicUsize,
        pub queries: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl CannedTransport {
        pub fn with(mut self, url: &str, value: Value) -> Self {
            self.responses.insert(url.to_string(), value);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl JsonTransport for CannedTransport {
        async fn get_json(
            &self,
            url: &str,
            query: &[(&str, String)],
            _headers: &[(&str, &str)],
        ) -> Option<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().push((
                url.to_string(),
                query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            ));
            self.responses.get(url).cloned()
        }
    }
}
