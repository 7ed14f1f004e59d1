pub mod controller;
pub mod reporter;
pub mod resume;
pub mod skip_markers;
pub mod state;
pub mod subtitles;

pub use controller::{NavigationSink, PlaybackSession, SessionHandle, SessionOptions};
pub use reporter::ProgressReporter;
pub use resume::{ResumePositionResolver, is_watched};
pub use skip_markers::{SkipAction, SkipEvaluation, SkipMarkerManager};
pub use state::{SessionSnapshot, SessionState};
pub use subtitles::{SubtitleTrackSelector, languages_match};
