pub mod errors;

pub use errors::{PlaybackError, PlaybackResult};
