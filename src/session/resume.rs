use tracing::debug;

use crate::models::{MediaItem, ticks_to_seconds};

/// Progress below this fraction of the runtime is treated as noise.
pub const RESUME_MIN_FRACTION: f64 = 0.01;
/// Progress above this fraction is treated as already watched.
pub const RESUME_MAX_FRACTION: f64 = 0.95;
/// Stopping at or past this fraction marks the item watched.
pub const WATCHED_FRACTION: f64 = 0.90;

/// Decides where playback of an item should begin.
pub struct ResumePositionResolver;

impl ResumePositionResolver {
    /// Resume point in seconds for the item's persisted position, if it
    /// falls strictly inside the resume window.
    pub fn resolve(item: &MediaItem) -> Option<f64> {
        let position_ticks = item.playback_position_ticks()?;
        let resume = Self::resolve_ticks(position_ticks, item.runtime_ticks);
        debug!(
            "Resume point for {}: {:?} (saved {} of {} ticks)",
            item.id, resume, position_ticks, item.runtime_ticks
        );
        resume
    }

    pub fn resolve_ticks(position_ticks: i64, runtime_ticks: i64) -> Option<f64> {
        Self::resolve_seconds(ticks_to_seconds(position_ticks), ticks_to_seconds(runtime_ticks))
    }

    pub fn resolve_seconds(position: f64, duration: f64) -> Option<f64> {
        if !(position.is_finite() && duration.is_finite()) || duration <= 0.0 {
            return None;
        }

        let fraction = position / duration;
        (fraction > RESUME_MIN_FRACTION && fraction < RESUME_MAX_FRACTION).then_some(position)
    }
}

pub fn is_watched(position: f64, duration: f64) -> bool {
    duration > 0.0 && position.is_finite() && position / duration >= WATCHED_FRACTION
}
