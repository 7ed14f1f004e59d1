mod api;
mod markers;
pub mod streaming;

#[cfg(test)]
mod tests;

pub use api::JellyfinApi;
pub use markers::parse_intro_timestamps;
pub use streaming::StreamUrlBuilder;
