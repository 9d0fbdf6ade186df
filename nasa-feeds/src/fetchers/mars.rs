//! Mars rover photo archive.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;
use tracing::{debug, info};

use nasa_core::constants::{MARS_ACTIVE_SOL_PHOTOS, MARS_MAX_SOL, MARS_MIN_SOL, MARS_ROVERS};
use nasa_core::error::{NasaError, Result};
use nasa_core::types::{MediaTriple, SourceId};

use super::FeedContext;

/// Fetches the first page of photos for a random rover and sol.
pub async fn fetch(ctx: &FeedContext<'_>) -> Result<MediaTriple> {
    let (rover, sol) = pick_rover_and_sol(&mut rand::thread_rng());
    debug!(rover, sol, "Fetching Mars rover photos");

    let query = [
        ("api_key", ctx.api_key.to_string()),
        ("sol", sol.to_string()),
        ("page", "1".to_string()),
    ];
    let data = ctx
        .get(SourceId::Insight, &ctx.endpoints.mars_photos(rover), &query)
        .await?;

    let triple = summarize(rover, sol, &data)?;
    info!(rover, sol, title = %triple.title, "Mars data fetched");
    Ok(triple)
}

/// Uniform rover, then a uniform sol in `[MARS_MIN_SOL, min(MARS_MAX_SOL, rover max)]`.
pub fn pick_rover_and_sol<R: Rng + ?Sized>(rng: &mut R) -> (&'static str, u32) {
    let (rover, max_sol) = MARS_ROVERS.choose(&mut *rng).copied().unwrap_or(MARS_ROVERS[0]);
    let sol = rng.gen_range(MARS_MIN_SOL..=MARS_MAX_SOL.min(max_sol));
    (rover, sol)
}

/// Builds the triple from one page of rover photos.
pub fn summarize(rover: &str, sol: u32, data: &Value) -> Result<MediaTriple> {
    let photos = data
        .get("photos")
        .and_then(Value::as_array)
        .filter(|photos| !photos.is_empty())
        .ok_or_else(|| NasaError::malformed(SourceId::Insight, "no photos for this sol"))?;

    let count = photos.len();
    let cameras: BTreeSet<&str> = photos
        .iter()
        .map(|p| {
            p.get("camera")
                .and_then(|c| c.get("name"))
                .and_then(Value::as_str)
                .unwrap_or("UNK")
        })
        .collect();
    let camera_summary = match cameras.len() {
        1 => cameras.iter().next().copied().unwrap_or("UNK").to_string(),
        n => format!("{n} cameras"),
    };

    let earth_date = photos[0]
        .get("earth_date")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let date = if earth_date.is_empty() {
        "Date unknown".to_string()
    } else {
        NaiveDate::parse_from_str(earth_date, "%Y-%m-%d")
            .map(|d| d.format("%b %d, %Y").to_string())
            .unwrap_or_else(|_| earth_date.to_string())
    };

    let title = format!(
        "{} Sol {sol} • {camera_summary} • {count} images • {date}",
        capitalize(rover)
    );
    let description = if count > MARS_ACTIVE_SOL_PHOTOS {
        format!("Active Sol • {count} pics")
    } else {
        format!("Sol {sol} • {count} images")
    };

    Ok(MediaTriple::text(title, description))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn photo(camera: &str, date: &str) -> Value {
        json!({"id": 1, "camera": {"name": camera}, "earth_date": date, "img_src": "http://mars/x.jpg"})
    }

    #[test]
    fn test_single_camera() {
        let data = json!({"photos": [photo("NAVCAM", "2015-06-03"), photo("NAVCAM", "2015-06-03")]});
        let triple = summarize("curiosity", 1000, &data).unwrap();
        assert_eq!(triple.title, "Curiosity Sol 1000 • NAVCAM • 2 images • Jun 03, 2015");
        assert_eq!(triple.description, "Sol 1000 • 2 images");
    }

    #[test]
    fn test_active_sol_with_many_cameras() {
        let mut photos: Vec<Value> = (0..60).map(|_| photo("FHAZ", "2004-02-10")).collect();
        photos.push(photo("RHAZ", "2004-02-10"));
        photos.push(json!({"earth_date": "2004-02-10"}));

        let triple = summarize("spirit", 150, &json!({"photos": photos})).unwrap();
        assert_eq!(triple.title, "Spirit Sol 150 • 3 cameras • 62 images • Feb 10, 2004");
        assert_eq!(triple.description, "Active Sol • 62 pics");
    }

    #[test]
    fn test_date_fallbacks() {
        let raw = summarize("opportunity", 200, &json!({"photos": [photo("PANCAM", "sol-200")]})).unwrap();
        assert!(raw.title.ends_with("• sol-200"));

        let missing = summarize("opportunity", 200, &json!({"photos": [{"camera": {"name": "PANCAM"}}]})).unwrap();
        assert!(missing.title.ends_with("• Date unknown"));
    }

    #[test]
    fn test_no_photos_is_malformed() {
        assert!(summarize("curiosity", 100, &json!({"photos": []})).is_err());
        assert!(summarize("curiosity", 100, &json!({})).is_err());
    }

    #[test]
    fn test_pick_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let (rover, sol) = pick_rover_and_sol(&mut rng);
            let max_sol = MARS_ROVERS
                .iter()
                .find(|(name, _)| *name == rover)
                .map(|(_, max)| *max)
                .unwrap();
            assert!((MARS_MIN_SOL..=MARS_MAX_SOL.min(max_sol)).contains(&sol));
        }
    }
}
