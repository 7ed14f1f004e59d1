mod identifiers;
pub mod preferences;

pub use identifiers::{DeviceId, ItemId, PlaySessionId, UserId};
pub use preferences::{AudioQuality, QualityTier, StreamingPreferences, SubtitleMode, VideoCodec};

use serde::{Deserialize, Serialize};

/// Server positions and runtimes are expressed in 100ns ticks.
pub const TICKS_PER_SECOND: i64 = 10_000_000;

pub fn ticks_to_seconds(ticks: i64) -> f64 {
    ticks as f64 / TICKS_PER_SECOND as f64
}

pub fn seconds_to_ticks(seconds: f64) -> i64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * TICKS_PER_SECOND as f64).round() as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    Movie,
    Series,
    Episode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    pub playback_position_ticks: Option<i64>,
    pub is_favorite: bool,
}

/// Immutable snapshot of a library item handed to a playback session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: ItemId,
    pub name: String,
    pub media_type: MediaType,
    /// Total runtime in ticks, zero when the server does not know it
    pub runtime_ticks: i64,
    pub user_data: Option<UserData>,
}

impl MediaItem {
    pub fn duration_seconds(&self) -> f64 {
        ticks_to_seconds(self.runtime_ticks.max(0))
    }

    pub fn playback_position_ticks(&self) -> Option<i64> {
        self.user_data
            .as_ref()
            .and_then(|data| data.playback_position_ticks)
    }
}

/// Intro/credits timestamps in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkipMarkers {
    pub intro_start: f64,
    pub intro_end: f64,
    pub credits_start: Option<f64>,
}

impl SkipMarkers {
    pub fn contains_intro(&self, position: f64) -> bool {
        position >= self.intro_start && position <= self.intro_end
    }
}

/// Subtitle track as exposed by the loaded asset. The index is only
/// meaningful for the asset it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub index: i32,
    pub display_name: String,
    pub language_code: String,
}

/// Server address and token of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub server_url: String,
    pub access_token: String,
    pub user_id: UserId,
}
