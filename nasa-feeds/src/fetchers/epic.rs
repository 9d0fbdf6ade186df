//! EPIC full-disc Earth imagery.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use nasa_core::error::{NasaError, Result};
use nasa_core::types::{MediaTriple, SourceId};

use super::{decode_object, FeedContext};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EpicImage {
    date: Option<String>,
    caption: Option<String>,
    centroid_coordinates: Option<Centroid>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Centroid {
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Fetches the most recent natural-color image metadata.
pub async fn fetch(ctx: &FeedContext<'_>) -> Result<MediaTriple> {
    debug!("Fetching EPIC");
    let data = ctx.get(SourceId::Epic, &ctx.endpoints.epic, &[]).await?;
    let triple = summarize(&data)?;
    info!(title = %triple.title, "EPIC data fetched");
    Ok(triple)
}

/// Builds the triple from the first image of an EPIC listing.
pub fn summarize(data: &Value) -> Result<MediaTriple> {
    let first = data
        .as_array()
        .and_then(|images| images.first())
        .ok_or_else(|| NasaError::malformed(SourceId::Epic, "expected a non-empty list"))?;

    let image: EpicImage = decode_object(SourceId::Epic, first)?;
    let date = image.date.unwrap_or_default();
    if date.is_empty() {
        return Err(NasaError::malformed(SourceId::Epic, "image has no date"));
    }

    let day = day_label(&date);
    let title = match image.caption.as_deref() {
        Some(caption) if !caption.is_empty() => format!("Earth {day} • {caption}"),
        _ => format!("Earth full-disc imagery from {day}"),
    };

    let description = match image.centroid_coordinates {
        Some(Centroid {
            lat: Some(lat),
            lon: Some(lon),
        }) => format!("Center: {lat:.1}°, {lon:.1}°"),
        _ => format!("DSCOVR • {day}"),
    };

    Ok(MediaTriple::text(title, description))
}

/// `"2024-01-05 00:31:45"` -> `"Jan 05"`; unparseable dates keep their first ten characters.
fn day_label(date: &str) -> String {
    date.split_whitespace()
        .next()
        .and_then(|token| NaiveDate::parse_from_str(token, "%Y-%m-%d").ok())
        .map(|d| d.format("%b %d").to_string())
        .unwrap_or_else(|| date.chars().take(10).collect())
}
