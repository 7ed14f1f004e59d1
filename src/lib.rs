//! Playback core of a Jellyfin TV client: stream URL construction, the
//! per-item playback session state machine, resume/subtitle policies,
//! intro/credits skipping and server-side progress reporting.

pub mod backends;
pub mod config;
pub mod models;
pub mod player;
pub mod session;
pub mod utils;

pub use backends::jellyfin::{JellyfinApi, StreamUrlBuilder};
pub use session::{PlaybackSession, SessionHandle, SessionOptions, SessionState};
pub use utils::{PlaybackError, PlaybackResult};
