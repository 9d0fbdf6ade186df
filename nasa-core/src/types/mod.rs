//! Domain types for the driver.
//!
//! - [`SourceId`]: One of the six upstream feeds, with its catalog metadata
//! - [`MediaTriple`]: The `(image_url, title, description)` shown on the remote

mod source;
mod triple;

pub use source::*;
pub use triple::*;
