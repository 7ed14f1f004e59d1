use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::models::{
    AudioQuality, Credentials, DeviceId, QualityTier, StreamingPreferences, SubtitleMode, UserId,
    VideoCodec,
};
use crate::session::SessionOptions;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub streaming: StreamingConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server_url: String,

    #[serde(default)]
    pub access_token: String,

    #[serde(default)]
    pub user_id: String,

    /// Generated on first load when missing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamingConfig {
    #[serde(default)]
    pub quality: QualityTier,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bitrate: Option<u64>,

    #[serde(default)]
    pub video_codec: VideoCodec,

    #[serde(default)]
    pub audio_quality: AudioQuality,

    #[serde(default)]
    pub subtitle_mode: SubtitleMode,

    #[serde(default = "default_subtitle_language")]
    pub subtitle_language: String,

    #[serde(default)]
    pub bypass_transcoding: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_true")]
    pub auto_skip_intro: bool,

    #[serde(default)]
    pub intro_skip_countdown_seconds: u64,

    #[serde(default = "default_progress_interval")]
    pub progress_interval_seconds: u64,

    #[serde(default = "default_readiness_timeout")]
    pub readiness_timeout_seconds: u64,

    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_seconds: u64,

    #[serde(default = "default_true")]
    pub probe_stream: bool,

    #[serde(default = "default_drain_timeout")]
    pub report_drain_timeout_seconds: u64,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Reads the config at `path`, writing defaults there if it does not
    /// exist. A missing device id is generated and persisted.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            debug!("Loading config from {:?}", path);
            let contents = fs::read_to_string(path).context("Failed to read config file")?;
            let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;
            info!("Config loaded successfully");
            config
        } else {
            info!("No config file found, using defaults");
            Config::default()
        };

        if config.server.device_id.is_none() {
            config.server.device_id = Some(DeviceId::generate().to_string());
            config.save_to(path)?;
        }

        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).context("Failed to write config file")?;

        debug!("Config saved to {:?}", path);
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("reel-tv").join("config.toml"))
    }

    pub fn device_id(&self) -> DeviceId {
        match &self.server.device_id {
            Some(id) if !id.is_empty() => DeviceId::new(id.as_str()),
            _ => DeviceId::generate(),
        }
    }

    pub fn credentials(&self) -> Result<Credentials> {
        anyhow::ensure!(
            !self.server.server_url.is_empty(),
            "No server configured, set server.server_url"
        );
        anyhow::ensure!(
            !self.server.access_token.is_empty(),
            "No access token configured, set server.access_token"
        );

        Ok(Credentials {
            server_url: self.server.server_url.clone(),
            access_token: self.server.access_token.clone(),
            user_id: UserId::new(self.server.user_id.as_str()),
        })
    }

    pub fn streaming_preferences(&self) -> StreamingPreferences {
        let streaming = &self.streaming;
        StreamingPreferences {
            quality: streaming.quality,
            max_bitrate: streaming.max_bitrate,
            video_codec: streaming.video_codec,
            audio_quality: streaming.audio_quality,
            subtitle_mode: streaming.subtitle_mode,
            subtitle_language: streaming.subtitle_language.clone(),
            device_id: self.device_id(),
            bypass_transcoding: streaming.bypass_transcoding,
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        let playback = &self.playback;
        SessionOptions {
            auto_skip_intro: playback.auto_skip_intro,
            intro_skip_countdown: Duration::from_secs(playback.intro_skip_countdown_seconds),
            progress_interval: Duration::from_secs(playback.progress_interval_seconds.max(1)),
            readiness_timeout: Duration::from_secs(playback.readiness_timeout_seconds),
            probe_timeout: Duration::from_secs(playback.probe_timeout_seconds),
            probe_stream: playback.probe_stream,
            report_drain_timeout: Duration::from_secs(playback.report_drain_timeout_seconds),
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            quality: QualityTier::default(),
            max_bitrate: None,
            video_codec: VideoCodec::default(),
            audio_quality: AudioQuality::default(),
            subtitle_mode: SubtitleMode::default(),
            subtitle_language: default_subtitle_language(),
            bypass_transcoding: false,
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            auto_skip_intro: default_true(),
            intro_skip_countdown_seconds: 0,
            progress_interval_seconds: default_progress_interval(),
            readiness_timeout_seconds: default_readiness_timeout(),
            probe_timeout_seconds: default_probe_timeout(),
            probe_stream: default_true(),
            report_drain_timeout_seconds: default_drain_timeout(),
        }
    }
}

// Default value functions
fn default_true() -> bool { true }
fn default_subtitle_language() -> String { "en".to_string() }
fn default_progress_interval() -> u64 { 10 }
fn default_readiness_timeout() -> u64 { 30 }
fn default_probe_timeout() -> u64 { 5 }
fn default_drain_timeout() -> u64 { 5 }
