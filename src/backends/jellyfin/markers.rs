use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::api::JellyfinApi;
use crate::models::{ItemId, SkipMarkers};
use crate::utils::{PlaybackError, PlaybackResult};

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(rename_all = "PascalCase")]
struct IntroTimestamp {
    intro_start: f64,
    intro_end: f64,
    #[serde(default = "default_valid")]
    valid: bool,
}

fn default_valid() -> bool {
    true
}

impl IntroTimestamp {
    fn is_usable(&self) -> bool {
        self.valid
            && self.intro_start.is_finite()
            && self.intro_end.is_finite()
            && self.intro_start >= 0.0
            && self.intro_end > self.intro_start
    }
}

/// Older servers answer with a single segment, newer ones with segments keyed
/// by segment kind.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IntroTimestampsResponse {
    Single(IntroTimestamp),
    Keyed(HashMap<String, IntroTimestamp>),
}

fn is_credits_key(key: &str) -> bool {
    key.eq_ignore_ascii_case("credits") || key.eq_ignore_ascii_case("outro")
}

fn is_intro_key(key: &str) -> bool {
    key.eq_ignore_ascii_case("introduction") || key.eq_ignore_ascii_case("intro")
}

/// Turns an `IntroTimestamps` body into markers. Returns `None` when it holds
/// no usable intro segment.
pub fn parse_intro_timestamps(body: &str) -> PlaybackResult<Option<SkipMarkers>> {
    let response: IntroTimestampsResponse =
        serde_json::from_str(body).map_err(|e| PlaybackError::Parse(e.to_string()))?;

    let markers = match response {
        IntroTimestampsResponse::Single(intro) => {
            intro.is_usable().then_some(SkipMarkers {
                intro_start: intro.intro_start,
                intro_end: intro.intro_end,
                credits_start: None,
            })
        }
        IntroTimestampsResponse::Keyed(segments) => {
            let credits_start = segments
                .iter()
                .filter(|(key, segment)| is_credits_key(key) && segment.is_usable())
                .map(|(_, segment)| segment.intro_start)
                .reduce(f64::min);

            let mut candidates: Vec<(&String, &IntroTimestamp)> = segments
                .iter()
                .filter(|(key, segment)| !is_credits_key(key) && segment.is_usable())
                .collect();
            // A segment explicitly named as the intro wins, otherwise the earliest one
            candidates.sort_by(|(ka, a), (kb, b)| {
                is_intro_key(kb)
                    .cmp(&is_intro_key(ka))
                    .then(a.intro_start.total_cmp(&b.intro_start))
            });

            candidates.first().map(|(_, intro)| SkipMarkers {
                intro_start: intro.intro_start,
                intro_end: intro.intro_end,
                credits_start,
            })
        }
    };

    Ok(markers)
}

impl JellyfinApi {
    /// Fetch intro/credits timestamps. A 404 means the server has no markers
    /// for this item.
    pub async fn get_intro_timestamps(&self, item_id: &ItemId) -> PlaybackResult<Option<SkipMarkers>> {
        let url = format!("{}/Shows/{}/IntroTimestamps", self.base_url(), item_id);
        debug!("Fetching skip markers from {}", url);

        let response = self
            .client()
            .get(&url)
            .header("X-Emby-Authorization", self.auth_header())
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!("No skip markers for item {}", item_id);
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Failed to fetch skip markers for {}: {}", item_id, status);
            return Err(PlaybackError::from_status(status.as_u16(), body));
        }

        let body = response.text().await?;
        let markers = parse_intro_timestamps(&body)?;
        if let Some(ref markers) = markers {
            info!(
                "Skip markers for {}: intro {:.1}s-{:.1}s, credits {:?}",
                item_id, markers.intro_start, markers.intro_end, markers.credits_start
            );
        }
        Ok(markers)
    }
}
