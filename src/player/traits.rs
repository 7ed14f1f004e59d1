use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::models::SubtitleTrack;

/// Status and time callbacks raised by the native player.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// The asset can be played. `confirmed` is false while an adaptive
    /// stream reports ready but segments are still arriving; duration and
    /// track metadata are only final once confirmed.
    Ready {
        confirmed: bool,
        duration: Option<f64>,
    },
    /// Periodic playhead update, in seconds.
    TimeUpdate { position: f64, buffered: f64 },
    EndOfStream,
    /// Decode, format or authorization failure.
    Failed(String),
}

/// Adapter over the platform decoder. The playback session is its only owner.
#[async_trait]
pub trait MediaPlayer: Send {
    /// Hands out the event stream once. Dropping the receiver removes all observers.
    fn take_event_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<PlayerEvent>>;

    async fn load_media(&mut self, url: &str) -> Result<()>;

    async fn play(&mut self) -> Result<()>;

    async fn pause(&mut self) -> Result<()>;

    /// Resolves once the player confirms the seek completed.
    async fn seek(&mut self, position: Duration) -> Result<()>;

    async fn subtitle_tracks(&mut self) -> Vec<SubtitleTrack>;

    /// Language of the audio track currently playing, if the asset says.
    async fn current_audio_language(&mut self) -> Option<String>;

    /// `None` turns subtitles off.
    async fn set_subtitle_track(&mut self, index: Option<i32>) -> Result<()>;

    /// Frees decoder resources. Called exactly once, last, on teardown.
    async fn release(&mut self);
}
