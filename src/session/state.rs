use std::fmt;

use crate::models::{ItemId, SkipMarkers};
use crate::utils::PlaybackError;

/// Lifecycle of a playback session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Loading,
    /// The player says ready but an adaptive stream may still be settling
    ReadyUnconfirmed,
    ReadyToPlay,
    Playing,
    Paused,
    Ended,
    Failed,
}

impl SessionState {
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, Loading)
                | (Idle, Ended)
                | (Loading, Failed)
                | (Loading, ReadyUnconfirmed)
                | (Loading, ReadyToPlay)
                | (Loading, Ended)
                | (ReadyUnconfirmed, ReadyToPlay)
                | (ReadyUnconfirmed, Playing)
                | (ReadyUnconfirmed, Failed)
                | (ReadyUnconfirmed, Ended)
                | (ReadyToPlay, Playing)
                | (ReadyToPlay, Failed)
                | (ReadyToPlay, Ended)
                | (Playing, Paused)
                | (Paused, Playing)
                | (Playing, Ended)
                | (Paused, Ended)
                | (Playing, Failed)
                | (Paused, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Ended | SessionState::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Loading => "loading",
            SessionState::ReadyUnconfirmed => "ready (unconfirmed)",
            SessionState::ReadyToPlay => "ready",
            SessionState::Playing => "playing",
            SessionState::Paused => "paused",
            SessionState::Ended => "ended",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Consistent view of a session, published after every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub item_id: Option<ItemId>,
    /// Last observed playhead, in seconds
    pub position: f64,
    pub duration: f64,
    pub buffered: f64,
    pub has_reported_start: bool,
    pub has_skipped_intro: bool,
    pub skip_intro_available: bool,
    pub credits_reached: bool,
    pub subtitle_index: Option<i32>,
    pub skip_markers: Option<SkipMarkers>,
    pub last_error: Option<PlaybackError>,
}
