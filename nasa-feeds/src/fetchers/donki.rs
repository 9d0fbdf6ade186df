//! DONKI space-weather notifications.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use nasa_core::constants::{DONKI_MAX_SUMMARIES, DONKI_WINDOW_DAYS};
use nasa_core::error::{NasaError, Result};
use nasa_core::types::{MediaTriple, SourceId};

use super::FeedContext;

const QUIET_TITLE: &str = "Solar activity: Quiet period (7 days)";
const QUIET_DESCRIPTION: &str = "No major events";

/// Fetches notifications over the trailing window.
pub async fn fetch(ctx: &FeedContext<'_>) -> Result<MediaTriple> {
    let now = Utc::now();
    let start = now - Duration::days(DONKI_WINDOW_DAYS);
    debug!(start = %start.date_naive(), end = %now.date_naive(), "Fetching DONKI notifications");

    let query = [
        ("api_key", ctx.api_key.to_string()),
        ("startDate", start.format("%Y-%m-%d").to_string()),
        ("endDate", now.format("%Y-%m-%d").to_string()),
    ];
    let data = ctx.get(SourceId::Donki, &ctx.endpoints.donki, &query).await?;

    let triple = summarize(&data, now)?;
    info!(title = %triple.title, "DONKI data fetched");
    Ok(triple)
}

/// Summarizes a notification list as seen at `now`.
///
/// An empty list is a quiet week, not a failure.
pub fn summarize(data: &Value, now: DateTime<Utc>) -> Result<MediaTriple> {
    let events = data
        .as_array()
        .ok_or_else(|| NasaError::malformed(SourceId::Donki, "expected a list"))?;

    if events.is_empty() {
        return Ok(MediaTriple::text(QUIET_TITLE, QUIET_DESCRIPTION));
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    // Latest by string comparison of the issue time.
    let mut latest: Option<(&str, &str)> = None;

    for event in events {
        let kind = event.get("messageType").and_then(Value::as_str).unwrap_or_default();
        if kind.is_empty() {
            continue;
        }
        *counts.entry(kind).or_default() += 1;

        let issued = event.get("messageIssueTime").and_then(Value::as_str).unwrap_or_default();
        if !issued.is_empty() && latest.map_or(true, |(time, _)| issued > time) {
            latest = Some((issued, kind));
        }
    }

    let (issued, latest_kind) = latest
        .ok_or_else(|| NasaError::malformed(SourceId::Donki, "no dated notifications"))?;

    let when = match parse_issue_time(issued) {
        Some(time) => match (now - time).num_days() {
            days if days > 0 => format!("{days}d ago"),
            _ => "Today".to_string(),
        },
        None => "Recent".to_string(),
    };

    let summaries: Vec<String> = counts
        .iter()
        .take(DONKI_MAX_SUMMARIES)
        .map(|(kind, count)| {
            if *count > 1 {
                format!("{count} {kind}s")
            } else {
                format!("{count} {kind}")
            }
        })
        .collect();

    Ok(MediaTriple::text(
        format!("Solar activity: {} ({DONKI_WINDOW_DAYS} days)", summaries.join(", ")),
        format!("Latest: {latest_kind} {when}"),
    ))
}

/// Parses DONKI issue times such as `2024-01-01T12:34Z`.
fn parse_issue_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Some(time.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%MZ", "%Y-%m-%dT%H:%M:%SZ"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}
