use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use crate::models::{ItemId, PlaySessionId, SkipMarkers};
use crate::utils::PlaybackResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlayMethod {
    Transcode,
    DirectPlay,
}

/// Position report for one item of a play session.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackReport {
    pub item_id: ItemId,
    pub play_session_id: PlaySessionId,
    pub position_ticks: i64,
    pub is_paused: bool,
    pub is_muted: bool,
    pub play_method: PlayMethod,
}

/// Server calls a playback session depends on.
#[async_trait]
pub trait PlaybackBackend: Send + Sync + std::fmt::Debug {
    async fn report_playback_start(&self, report: &PlaybackReport) -> PlaybackResult<()>;

    async fn report_playback_progress(&self, report: &PlaybackReport) -> PlaybackResult<()>;

    async fn report_playback_stopped(&self, report: &PlaybackReport) -> PlaybackResult<()>;

    async fn mark_watched(&self, item_id: &ItemId) -> PlaybackResult<()>;

    /// Intro/credits markers for an item. `Ok(None)` when the server has none.
    async fn fetch_skip_markers(&self, item_id: &ItemId) -> PlaybackResult<Option<SkipMarkers>>;

    /// Existence check for a stream URL before handing it to the player.
    /// Servers that can't answer it are fine; the default does nothing.
    async fn probe_stream(&self, _url: &Url) -> PlaybackResult<()> {
        Ok(())
    }
}
