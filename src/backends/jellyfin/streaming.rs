use tracing::debug;
use url::Url;

use crate::models::{Credentials, MediaItem, PlaySessionId, StreamingPreferences};
use crate::utils::{PlaybackError, PlaybackResult};

/// Pure functions turning an item plus settings into stream URLs
pub struct StreamUrlBuilder;

impl StreamUrlBuilder {
    /// HLS master playlist URL with a fresh play session id.
    pub fn build(
        item: &MediaItem,
        prefs: &StreamingPreferences,
        credentials: &Credentials,
    ) -> PlaybackResult<Url> {
        Self::build_for_session(item, prefs, credentials, &PlaySessionId::generate())
    }

    /// HLS master playlist URL for an existing play session.
    ///
    /// `MaxStreamingBitrate` is always present. `MaxHeight` and `AudioBitrate`
    /// are left out when the preference means "no limit".
    pub fn build_for_session(
        item: &MediaItem,
        prefs: &StreamingPreferences,
        credentials: &Credentials,
        play_session_id: &PlaySessionId,
    ) -> PlaybackResult<Url> {
        let mut url = Self::item_url(item, credentials, "master.m3u8")?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("VideoCodec", prefs.video_codec.query_value())
                .append_pair("AudioCodec", prefs.audio_quality.codecs())
                .append_pair(
                    "MaxStreamingBitrate",
                    &prefs.effective_max_bitrate().to_string(),
                )
                .append_pair("PlaySessionId", play_session_id.as_str())
                .append_pair("MediaSourceId", item.id.as_str())
                .append_pair("DeviceId", prefs.device_id.as_str())
                .append_pair("api_key", &credentials.access_token);

            if let Some(height) = prefs.quality.max_height() {
                query.append_pair("MaxHeight", &height.to_string());
            }
            if let Some(bitrate) = prefs.audio_quality.max_bitrate().filter(|b| *b > 0) {
                query.append_pair("AudioBitrate", &bitrate.to_string());
            }
        }

        debug!("Built transcoding URL for item {}", item.id);
        Ok(url)
    }

    /// Static stream of the original file, no transcoding parameters.
    pub fn direct(
        item: &MediaItem,
        prefs: &StreamingPreferences,
        credentials: &Credentials,
    ) -> PlaybackResult<Url> {
        let mut url = Self::item_url(item, credentials, "stream")?;
        url.query_pairs_mut()
            .append_pair("Static", "true")
            .append_pair("MediaSourceId", item.id.as_str())
            .append_pair("DeviceId", prefs.device_id.as_str())
            .append_pair("api_key", &credentials.access_token);

        debug!("Built direct stream URL for item {}", item.id);
        Ok(url)
    }

    fn item_url(item: &MediaItem, credentials: &Credentials, leaf: &str) -> PlaybackResult<Url> {
        if item.id.as_str().is_empty() {
            return Err(PlaybackError::Configuration("Item has no identifier".into()));
        }

        let mut url = server_base_url(&credentials.server_url)?;
        url.path_segments_mut()
            .map_err(|_| {
                PlaybackError::Configuration(format!(
                    "Server address cannot carry a path: {}",
                    credentials.server_url
                ))
            })?
            .pop_if_empty()
            .extend(["Videos", item.id.as_str(), leaf]);
        Ok(url)
    }
}

/// Parses the configured server address. Only absolute http(s) URLs with a
/// host are accepted; a trailing slash is ignored.
pub(crate) fn server_base_url(server_url: &str) -> PlaybackResult<Url> {
    let trimmed = server_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(PlaybackError::Configuration("Server address is empty".into()));
    }

    let mut url = Url::parse(trimmed)?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(PlaybackError::Configuration(format!(
            "Unsupported server address: {}",
            server_url
        )));
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
