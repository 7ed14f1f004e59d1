use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::streaming::server_base_url;
use crate::backends::traits::{PlayMethod, PlaybackBackend, PlaybackReport};
use crate::models::{
    Credentials, DeviceId, ItemId, MediaItem, MediaType, SkipMarkers, UserData, UserId,
};
use crate::utils::{PlaybackError, PlaybackResult};

const JELLYFIN_CLIENT_NAME: &str = "Reel TV";
const JELLYFIN_VERSION: &str = env!("CARGO_PKG_VERSION");
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct JellyfinApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    user_id: UserId,
    device_id: DeviceId,
}

impl std::fmt::Debug for JellyfinApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JellyfinApi")
            .field("base_url", &self.base_url)
            .field("user_id", &self.user_id)
            .field("device_id", &self.device_id)
            .finish()
    }
}

impl JellyfinApi {
    pub fn new(credentials: &Credentials, device_id: DeviceId) -> PlaybackResult<Self> {
        let base_url = server_base_url(&credentials.server_url)?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PlaybackError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            api_key: credentials.access_token.clone(),
            user_id: credentials.user_id.clone(),
            device_id,
        })
    }

    pub(super) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(super) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub(super) fn auth_header(&self) -> String {
        format!(
            r#"MediaBrowser Client="{}", Device="TV", DeviceId="{}", Version="{}", Token="{}""#,
            JELLYFIN_CLIENT_NAME, self.device_id, JELLYFIN_VERSION, self.api_key
        )
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> PlaybackResult<()> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .header("X-Emby-Authorization", self.auth_header())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PlaybackError::from_status(status.as_u16(), text));
        }
        Ok(())
    }

    /// Fetch a single item as seen by the signed-in user.
    pub async fn get_item(&self, item_id: &ItemId) -> PlaybackResult<MediaItem> {
        let url = format!(
            "{}/Users/{}/Items/{}",
            self.base_url, self.user_id, item_id
        );

        let response = self
            .client
            .get(&url)
            .header("X-Emby-Authorization", self.auth_header())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PlaybackError::from_status(status.as_u16(), text));
        }

        let item: JellyfinItem = response.json().await?;
        item.into_media_item()
    }

    pub async fn report_playback_start(&self, report: &PlaybackReport) -> PlaybackResult<()> {
        debug!(
            "Reporting playback start for {} at {} ticks",
            report.item_id, report.position_ticks
        );
        self.post_json("/Sessions/Playing", &PlaybackProgressInfo::from(report))
            .await
    }

    pub async fn report_playback_progress(&self, report: &PlaybackReport) -> PlaybackResult<()> {
        self.post_json(
            "/Sessions/Playing/Progress",
            &PlaybackProgressInfo::from(report),
        )
        .await
    }

    pub async fn report_playback_stopped(&self, report: &PlaybackReport) -> PlaybackResult<()> {
        info!(
            "Reporting playback stopped for {} at {} ticks",
            report.item_id, report.position_ticks
        );
        self.post_json(
            "/Sessions/Playing/Stopped",
            &PlaybackStopInfo::from(report),
        )
        .await
    }

    pub async fn mark_watched(&self, item_id: &ItemId) -> PlaybackResult<()> {
        let url = format!(
            "{}/Users/{}/PlayedItems/{}",
            self.base_url, self.user_id, item_id
        );

        let response = self
            .client
            .post(&url)
            .header("X-Emby-Authorization", self.auth_header())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PlaybackError::from_status(status.as_u16(), text));
        }
        info!("Marked {} as watched", item_id);
        Ok(())
    }

    /// HEAD request against a stream URL. Some servers reject HEAD on
    /// playlists, callers are expected to tolerate failures.
    pub async fn probe_stream(&self, url: &Url) -> PlaybackResult<()> {
        let response = self.client.head(url.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Stream probe returned {}", status);
            return Err(PlaybackError::from_status(status.as_u16(), String::new()));
        }
        Ok(())
    }
}

#[async_trait]
impl PlaybackBackend for JellyfinApi {
    async fn report_playback_start(&self, report: &PlaybackReport) -> PlaybackResult<()> {
        JellyfinApi::report_playback_start(self, report).await
    }

    async fn report_playback_progress(&self, report: &PlaybackReport) -> PlaybackResult<()> {
        JellyfinApi::report_playback_progress(self, report).await
    }

    async fn report_playback_stopped(&self, report: &PlaybackReport) -> PlaybackResult<()> {
        JellyfinApi::report_playback_stopped(self, report).await
    }

    async fn mark_watched(&self, item_id: &ItemId) -> PlaybackResult<()> {
        JellyfinApi::mark_watched(self, item_id).await
    }

    async fn fetch_skip_markers(&self, item_id: &ItemId) -> PlaybackResult<Option<SkipMarkers>> {
        self.get_intro_timestamps(item_id).await
    }

    async fn probe_stream(&self, url: &Url) -> PlaybackResult<()> {
        JellyfinApi::probe_stream(self, url).await
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PlaybackProgressInfo<'a> {
    item_id: &'a str,
    session_id: &'a str,
    play_session_id: &'a str,
    media_source_id: &'a str,
    position_ticks: i64,
    is_paused: bool,
    is_muted: bool,
    play_method: PlayMethod,
}

impl<'a> From<&'a PlaybackReport> for PlaybackProgressInfo<'a> {
    fn from(report: &'a PlaybackReport) -> Self {
        Self {
            item_id: report.item_id.as_str(),
            session_id: report.play_session_id.as_str(),
            play_session_id: report.play_session_id.as_str(),
            media_source_id: report.item_id.as_str(),
            position_ticks: report.position_ticks,
            is_paused: report.is_paused,
            is_muted: report.is_muted,
            play_method: report.play_method,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PlaybackStopInfo<'a> {
    item_id: &'a str,
    play_session_id: &'a str,
    media_source_id: &'a str,
    position_ticks: i64,
    play_method: PlayMethod,
}

impl<'a> From<&'a PlaybackReport> for PlaybackStopInfo<'a> {
    fn from(report: &'a PlaybackReport) -> Self {
        Self {
            item_id: report.item_id.as_str(),
            play_session_id: report.play_session_id.as_str(),
            media_source_id: report.item_id.as_str(),
            position_ticks: report.position_ticks,
            play_method: report.play_method,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct JellyfinItem {
    id: String,
    name: String,
    #[serde(rename = "Type")]
    item_type: String,
    run_time_ticks: Option<i64>,
    user_data: Option<JellyfinUserData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct JellyfinUserData {
    playback_position_ticks: Option<i64>,
    #[serde(default)]
    is_favorite: bool,
}

impl JellyfinItem {
    fn into_media_item(self) -> PlaybackResult<MediaItem> {
        let media_type = match self.item_type.as_str() {
            "Movie" => MediaType::Movie,
            "Series" => MediaType::Series,
            "Episode" => MediaType::Episode,
            other => {
                return Err(PlaybackError::Parse(format!(
                    "Unsupported item type '{}' for {}",
                    other, self.id
                )));
            }
        };

        Ok(MediaItem {
            id: ItemId::new(self.id),
            name: self.name,
            media_type,
            runtime_ticks: self.run_time_ticks.unwrap_or(0),
            user_data: self.user_data.map(|data| UserData {
                playback_position_ticks: data.playback_position_ticks,
                is_favorite: data.is_favorite,
            }),
        })
    }
}
