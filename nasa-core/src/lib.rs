//! # NASA Core
//!
//! Core types, errors, and configuration shared by the NASA Mission Control crates.
//!
//! This crate provides the foundational building blocks used by the cache, the
//! feed fetchers and the command-line driver:
//!
//! - **Types**: The six feed sources and the `(image_url, title, description)` triple
//! - **Errors**: Transport, feed and coordination error variants
//! - **Constants**: Upstream URLs, cache intervals, timeouts and display strings
//! - **Traits**: The JSON transport seam used by every fetcher
//! - **Config**: Persisted driver settings and upstream endpoints
//!
//! ## Example
//!
//! ```rust
//! use nasa_core::{MediaTriple, SourceId};
//!
//! let source: SourceId = "iss".parse().unwrap();
//! assert_eq!(source.display_name(), "ISS Tracker");
//!
//! let offline = MediaTriple::offline(source);
//! assert_eq!(offline.title, "ISS tracking offline");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod config;
pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{DriverConfig, Endpoints};
pub use error::{NasaError, Result};
pub use traits::JsonTransport;
pub use types::*;
