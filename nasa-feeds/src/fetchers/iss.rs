//! International Space Station position and crew.

use chrono::DateTime;
use serde_json::Value;
use tracing::{debug, info};

use nasa_core::constants::ISS_SPEED_LABEL;
use nasa_core::error::{NasaError, Result};
use nasa_core::types::{MediaTriple, SourceId};

use super::FeedContext;
use crate::format::loose_f64;

/// Fetches the live position and the crew roster concurrently.
pub async fn fetch(ctx: &FeedContext<'_>) -> Result<MediaTriple> {
    debug!("Fetching ISS position and crew");
    let (position, crew) = tokio::join!(
        ctx.transport.get_json(&ctx.endpoints.iss_position, &[], &[]),
        ctx.transport.get_json(&ctx.endpoints.iss_crew, &[], &[]),
    );

    let position =
        position.ok_or_else(|| NasaError::unavailable(SourceId::Iss, "no position response"))?;
    let triple = summarize(&position, crew.as_ref())?;
    info!(title = %triple.title, "ISS data fetched");
    Ok(triple)
}

/// Builds the triple from the position feed and, if available, the crew feed.
pub fn summarize(position: &Value, crew: Option<&Value>) -> Result<MediaTriple> {
    if position.get("message").and_then(Value::as_str) != Some("success") {
        return Err(NasaError::malformed(SourceId::Iss, "position feed did not report success"));
    }

    let coords = position.get("iss_position");
    let lat = coordinate(coords, "latitude")?;
    let lon = coordinate(coords, "longitude")?;

    let timestamp = match position.get("timestamp") {
        None | Some(Value::Null) => 0,
        Some(v) => loose_f64(v)
            .map(|t| t as i64)
            .ok_or_else(|| NasaError::malformed(SourceId::Iss, "timestamp is not a number"))?,
    };
    let time = DateTime::from_timestamp(timestamp, 0)
        .ok_or_else(|| NasaError::malformed(SourceId::Iss, "timestamp out of range"))?
        .format("%H:%M UTC");

    let title = format!("ISS {} • {lat:.2}°, {lon:.2}° • {time}", region(lat, lon));

    let description = match crew.map(crew_count) {
        Some(n) if n > 0 => format!("{n} crew • {ISS_SPEED_LABEL}"),
        _ => ISS_SPEED_LABEL.to_string(),
    };

    Ok(MediaTriple::text(title, description))
}

/// Reads a coordinate that may be a string or a number; absent means zero.
fn coordinate(coords: Option<&Value>, key: &str) -> Result<f64> {
    match coords.and_then(|c| c.get(key)) {
        None | Some(Value::Null) => Ok(0.0),
        Some(v) => loose_f64(v)
            .ok_or_else(|| NasaError::malformed(SourceId::Iss, format!("{key} is not a number"))),
    }
}

/// People aboard the station according to the crew feed.
fn crew_count(crew: &Value) -> usize {
    if crew.get("message").and_then(Value::as_str) != Some("success") {
        return 0;
    }
    crew.get("people")
        .and_then(Value::as_array)
        .map(|people| {
            people
                .iter()
                .filter(|p| p.get("craft").and_then(Value::as_str) == Some("ISS"))
                .count()
        })
        .unwrap_or(0)
}

/// Coarse region label for a ground-track position.
///
/// Bands and longitude cut-offs are kept exactly as displayed historically,
/// including the boundary values that fall through to the last sector of a
/// band (for example `lon == 60` near the equator reads as Atlantic).
pub fn region(lat: f64, lon: f64) -> &'static str {
    if -30.0 < lat && lat < 30.0 {
        if -20.0 < lon && lon < 60.0 {
            "over Africa"
        } else if 60.0 < lon && lon < 150.0 {
            "over Asia"
        } else if 150.0 < lon || lon < -150.0 {
            "over Pacific"
        } else if -150.0 < lon && lon < -50.0 {
            "over Americas"
        } else {
            "over Atlantic"
        }
    } else if lat > 30.0 {
        if -150.0 < lon && lon < -50.0 {
            "over N.America"
        } else if -50.0 < lon && lon < 60.0 {
            "over Europe"
        } else {
            "over N.Asia"
        }
    } else if -80.0 < lon && lon < 20.0 {
        "over S.America"
    } else if 20.0 < lon && lon < 150.0 {
        "over S.Africa"
    } else {
        "over Oceania"
    }
}
