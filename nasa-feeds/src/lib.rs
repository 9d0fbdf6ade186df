//! # NASA Feeds
//!
//! Fetchers for the six upstream feeds, the HTTP transport they share, and the
//! [`NasaClient`] dispatch layer that adds per-source caching, in-flight
//! collapse and a hard per-fetch ceiling.
//!
//! ## Example
//!
//! ```rust,no_run
//! use nasa_feeds::NasaClient;
//!
//! # async fn demo() -> nasa_core::Result<()> {
//! let client = NasaClient::new("")?; // empty key -> DEMO_KEY
//! let triple = client.fetch("iss").await;
//! println!("{} / {}", triple.title, triple.description);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod client;
pub mod fetchers;
pub mod format;
pub mod probe;
pub mod transport;

pub use client::{ClientConfig, NasaClient};
pub use probe::{check_connectivity, ProbeConfig, ProbeReport};
pub use transport::{HttpTransport, TransportConfig};
