//! Near-earth objects approaching today.

use serde_json::Value;
use tracing::{debug, info};

use nasa_core::error::{NasaError, Result};
use nasa_core::types::{MediaTriple, SourceId};

use super::FeedContext;
use crate::format::{loose_f64, thousands};

/// Figures taken from one object of the feed.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Approach {
    speed_kmh: f64,
    miss_km: f64,
    diameter_km: f64,
    hazardous: bool,
}

/// Fetches today's near-earth-object feed.
pub async fn fetch(ctx: &FeedContext<'_>) -> Result<MediaTriple> {
    debug!("Fetching NEO feed");
    let data = ctx.get_with_key(SourceId::Neo, &ctx.endpoints.neo_feed).await?;
    let triple = summarize(&data)?;
    info!(title = %triple.title, "NEO data fetched");
    Ok(triple)
}

/// Aggregates the first day of a NEO feed into a triple.
///
/// Objects whose numbers cannot be read are left out of every figure; the
/// headline count is the feed's own `element_count`.
pub fn summarize(data: &Value) -> Result<MediaTriple> {
    let count = data.get("element_count").and_then(Value::as_u64).unwrap_or(0);
    if count == 0 {
        return Err(NasaError::malformed(SourceId::Neo, "no objects reported"));
    }

    let objects = data
        .get("near_earth_objects")
        .and_then(Value::as_object)
        .and_then(|days| days.values().next())
        .and_then(Value::as_array)
        .filter(|objects| !objects.is_empty())
        .ok_or_else(|| NasaError::malformed(SourceId::Neo, "no objects listed for today"))?;

    let approaches: Vec<Approach> = objects.iter().filter_map(parse_approach).collect();
    if approaches.len() < objects.len() {
        debug!(skipped = objects.len() - approaches.len(), "Skipped malformed NEO entries");
    }

    let positive = |f: fn(&Approach) -> f64| -> Vec<f64> {
        approaches.iter().map(f).filter(|v| *v > 0.0).collect()
    };
    let speeds = positive(|a| a.speed_kmh);
    let distances = positive(|a| a.miss_km);
    let sizes = positive(|a| a.diameter_km);
    let hazardous = approaches.iter().filter(|a| a.hazardous).count();

    let mut parts = vec![format!("Today: {count} asteroids")];
    if let (Some(slowest), Some(fastest)) = (min(&speeds), max(&speeds)) {
        parts.push(format!("Speed: {}-{} km/h", thousands(slowest), thousands(fastest)));
    }
    if let Some(closest) = min(&distances) {
        if closest > 1_000_000.0 {
            parts.push(format!("Closest: {:.2}M km", closest / 1_000_000.0));
        } else {
            parts.push(format!("Closest: {} km", thousands(closest)));
        }
    }

    let description = if hazardous > 0 {
        format!("{hazardous} hazardous")
    } else if let Some(largest) = max(&sizes) {
        if largest >= 1.0 {
            format!("Largest: {largest:.1} km")
        } else {
            format!("Largest: {:.0} m", largest * 1000.0)
        }
    } else {
        format!("{count} tracked today")
    };

    Ok(MediaTriple::text(parts.join(" • "), description))
}

/// Reads one object; `None` if any numeric field is present but unreadable.
fn parse_approach(object: &Value) -> Option<Approach> {
    let object = object.as_object()?;
    let approach = match object.get("close_approach_data") {
        None => None,
        Some(list) => Some(list.as_array()?.first()?),
    };

    let speed_kmh = number_or_zero(
        approach
            .and_then(|a| a.get("relative_velocity"))
            .and_then(|v| v.get("kilometers_per_hour")),
    )?;
    let miss_km = number_or_zero(
        approach
            .and_then(|a| a.get("miss_distance"))
            .and_then(|m| m.get("kilometers")),
    )?;
    let diameter_km = number_or_zero(
        object
            .get("estimated_diameter")
            .and_then(|d| d.get("kilometers"))
            .and_then(|k| k.get("estimated_diameter_max")),
    )?;
    let hazardous = object
        .get("is_potentially_hazardous_asteroid")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Some(Approach {
        speed_kmh,
        miss_km,
        diameter_km,
        hazardous,
    })
}

fn number_or_zero(value: Option<&Value>) -> Option<f64> {
    match value {
        None | Some(Value::Null) => Some(0.0),
        Some(v) => loose_f64(v).filter(|n| n.is_finite()),
    }
}

fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}
