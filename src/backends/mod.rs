pub mod jellyfin;
pub mod traits;

pub use traits::{PlayMethod, PlaybackBackend, PlaybackReport};
