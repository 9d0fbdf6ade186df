//! Astronomy Picture of the Day.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use nasa_core::constants::{APOD_SENTENCE_MAX, APOD_SHORT_BUDGET};
use nasa_core::error::{NasaError, Result};
use nasa_core::types::{MediaTriple, SourceId};

use super::{decode_object, FeedContext};
use crate::format::truncate_chars;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApodPayload {
    url: Option<String>,
    hdurl: Option<String>,
    title: Option<String>,
    explanation: Option<String>,
    date: Option<String>,
}

/// Fetches today's picture.
pub async fn fetch(ctx: &FeedContext<'_>) -> Result<MediaTriple> {
    debug!("Fetching APOD");
    let data = ctx.get_with_key(SourceId::Apod, &ctx.endpoints.apod).await?;
    let triple = summarize(&data)?;
    info!(title = %truncate_chars(&triple.title, 30), "APOD data fetched");
    Ok(triple)
}

/// Builds the triple from an APOD response.
pub fn summarize(data: &Value) -> Result<MediaTriple> {
    let payload: ApodPayload = decode_object(SourceId::Apod, data)?;

    let title = payload.title.unwrap_or_default();
    let explanation = payload.explanation.unwrap_or_default();
    if title.is_empty() || explanation.is_empty() {
        return Err(NasaError::malformed(SourceId::Apod, "missing title or explanation"));
    }

    let image_url = [payload.hdurl, payload.url]
        .into_iter()
        .flatten()
        .find(|u| !u.is_empty())
        .unwrap_or_default();
    let date = payload.date.unwrap_or_default();

    Ok(MediaTriple::new(
        image_url,
        title,
        short_description(&explanation, &date),
    ))
}

/// Condenses the explanation to its first sentence, shortened to fit the subtitle.
pub fn short_description(explanation: &str, date: &str) -> String {
    let cleaned = explanation.replace("Explanation:", "");
    let cleaned = cleaned.trim();

    // The terminating period is shown but never counted.
    let (sentence, first) = match cleaned.find(". ") {
        Some(end) => (&cleaned[..end], &cleaned[..=end]),
        None => (cleaned, cleaned),
    };

    if sentence.is_empty() {
        return format!("NASA • {date}");
    }
    if sentence.chars().count() <= APOD_SENTENCE_MAX {
        return first.to_string();
    }

    let mut short = String::new();
    let mut len = 0;
    for word in sentence.split_whitespace() {
        let word_len = word.chars().count();
        // The separator is counted even before the first word.
        if len + 1 + word_len > APOD_SHORT_BUDGET {
            break;
        }
        if !short.is_empty() {
            short.push(' ');
            len += 1;
        }
        short.push_str(word);
        len += word_len;
    }

    if short.is_empty() {
        format!("Image from {date}")
    } else {
        format!("{short}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn test_summarize_prefers_hd_url() {
        let data = json!({
            "url": "http://x/img.jpg",
            "hdurl": "http://x/img_hd.jpg",
            "title": "Pretty Nebula",
            "explanation": "This is a nebula. It is pretty far away.",
            "date": "2024-01-01"
        });

        let triple = summarize(&data).unwrap();
        assert_eq!(triple.image_url, "http://x/img_hd.jpg");
        assert_eq!(triple.title, "Pretty Nebula");
        assert_eq!(triple.description, "This is a nebula.");
    }

    #[test]
    fn test_summarize_falls_back_to_url() {
        let data = json!({
            "url": "https://www.youtube.com/embed/xyz",
            "title": "A Video",
            "explanation": "Watch.",
            "media_type": "video"
        });
        let triple = summarize(&data).unwrap();
        assert_eq!(triple.image_url, "https://www.youtube.com/embed/xyz");
        assert_eq!(triple.description, "Watch.");
    }

    #[test]
    fn test_summarize_rejects_incomplete_payloads() {
        assert!(summarize(&json!({"title": "No text"})).is_err());
        assert!(summarize(&json!({"title": "", "explanation": "x"})).is_err());
        assert!(summarize(&json!({"title": 7, "explanation": "x"})).is_err());
        assert!(summarize(&json!([])).is_err());
    }

    #[test_case("Explanation: Short one. More text.", "Short one." ; "strips label")]
    #[test_case(
        "The Horsehead Nebula is one of the most identifiable nebulae in the sky.",
        "The Horsehead Nebula is one..." ; "greedy word budget"
    )]
    #[test_case(
        "Supercalifragilisticexpialidocious-nebulosity is a word.",
        "Image from 2024-03-05" ; "no word fits"
    )]
    #[test_case("Explanation:   ", "NASA • 2024-03-05" ; "empty sentence")]
    #[test_case(
        "abcdefghij abcdefghij abcdefgh. More text here.",
        "abcdefghij abcdefghij abcdefgh." ; "thirty chars before the period"
    )]
    #[test_case(
        "abcdefghij abcdefghij abcdefghi. More text here.",
        "abcdefghij abcdefghij..." ; "thirty one chars is shortened"
    )]
    fn test_short_description(explanation: &str, expected: &str) {
        assert_eq!(short_description(explanation, "2024-03-05"), expected);
    }

    #[tokio::test]
    async fn test_fetch_sends_credential() {
        use crate::fetchers::testing::CannedTransport;
        use nasa_core::config::Endpoints;

        let endpoints = Endpoints::default();
        let transport = CannedTransport::default().with(
            &endpoints.apod,
            json!({"url": "http://x/a.jpg", "title": "T", "explanation": "E."}),
        );
        let ctx = FeedContext {
            transport: &transport,
            endpoints: &endpoints,
            api_key: "my-key",
        };

        let triple = fetch(&ctx).await.unwrap();
        assert_eq!(triple.image_url, "http://x/a.jpg");

        let queries = transport.queries.lock();
        assert_eq!(queries[0].1, vec![("api_key".to_string(), "my-key".to_string())]);
    }
}
