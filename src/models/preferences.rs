use serde::{Deserialize, Serialize};

use super::DeviceId;

/// Used whenever the user never picked a bitrate cap.
pub const DEFAULT_MAX_STREAMING_BITRATE: u64 = 120_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QualityTier {
    #[default]
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "4k")]
    Uhd4k,
    #[serde(rename = "1080p")]
    Hd1080,
    #[serde(rename = "720p")]
    Hd720,
    #[serde(rename = "480p")]
    Sd480,
}

impl QualityTier {
    /// Height cap sent to the server, `None` for automatic quality.
    pub fn max_height(&self) -> Option<u32> {
        match self {
            QualityTier::Auto => None,
            QualityTier::Uhd4k => Some(2160),
            QualityTier::Hd1080 => Some(1080),
            QualityTier::Hd720 => Some(720),
            QualityTier::Sd480 => Some(480),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    #[default]
    Auto,
    H264,
    Hevc,
    Av1,
}

impl VideoCodec {
    /// Value of the `VideoCodec` query parameter, most preferred first.
    pub fn query_value(&self) -> &'static str {
        match self {
            VideoCodec::Auto => "h264,hevc",
            VideoCodec::H264 => "h264",
            VideoCodec::Hevc => "hevc,h264",
            VideoCodec::Av1 => "av1,hevc,h264",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioQuality {
    #[default]
    Standard,
    High,
    Lossless,
}

impl AudioQuality {
    pub fn codecs(&self) -> &'static str {
        match self {
            AudioQuality::Standard => "aac,mp3",
            AudioQuality::High => "aac,ac3,eac3",
            AudioQuality::Lossless => "aac,ac3,eac3,flac,alac",
        }
    }

    /// Audio bitrate cap in bits/sec. Lossless streams are not capped.
    pub fn max_bitrate(&self) -> Option<u32> {
        match self {
            AudioQuality::Standard => Some(192_000),
            AudioQuality::High => Some(384_000),
            AudioQuality::Lossless => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubtitleMode {
    #[default]
    Off,
    On,
    ForeignOnly,
    Smart,
}

/// Snapshot of the user's streaming settings taken when a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamingPreferences {
    pub quality: QualityTier,
    /// Bits per second, `None` or zero when unset
    pub max_bitrate: Option<u64>,
    pub video_codec: VideoCodec,
    pub audio_quality: AudioQuality,
    pub subtitle_mode: SubtitleMode,
    pub subtitle_language: String,
    pub device_id: DeviceId,
    pub bypass_transcoding: bool,
}

impl StreamingPreferences {
    pub fn new(device_id: DeviceId) -> Self {
        Self {
            quality: QualityTier::default(),
            max_bitrate: None,
            video_codec: VideoCodec::default(),
            audio_quality: AudioQuality::default(),
            subtitle_mode: SubtitleMode::default(),
            subtitle_language: "en".to_string(),
            device_id,
            bypass_transcoding: false,
        }
    }

    pub fn effective_max_bitrate(&self) -> u64 {
        match self.max_bitrate {
            Some(bitrate) if bitrate > 0 => bitrate,
            _ => DEFAULT_MAX_STREAMING_BITRATE,
        }
    }
}
