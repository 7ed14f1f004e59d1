use thiserror::Error;

pub type PlaybackResult<T> = std::result::Result<T, PlaybackError>;

/// Failure modes of a playback session and the server calls it makes.
///
/// Only `Configuration` and `DecodeFailure` end a session. Everything else
/// is logged and playback carries on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// Malformed server address or other unusable stream inputs
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Probe or report request could not reach the server
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    /// Server answered with a non-success status
    #[error("Server error: {message} (status: {status})")]
    Server { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The player reported that the asset cannot be played
    #[error("Playback failed: {0}")]
    DecodeFailure(String),

    /// Request aborted because the session is going away. Never shown to the user.
    #[error("Request cancelled")]
    Cancelled,

    #[error("Playback session is closed")]
    Closed,
}

impl PlaybackError {
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PlaybackError::Configuration(_) | PlaybackError::DecodeFailure(_)
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PlaybackError::Cancelled)
    }

    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            PlaybackError::NetworkUnavailable(format!("Request timeout: {}", error))
        } else if error.is_connect() {
            PlaybackError::NetworkUnavailable(format!("Connection failed: {}", error))
        } else if error.is_decode() {
            PlaybackError::Parse(error.to_string())
        } else if error.is_builder() {
            PlaybackError::Configuration(error.to_string())
        } else {
            PlaybackError::NetworkUnavailable(error.to_string())
        }
    }

    pub fn from_status(status: u16, body: String) -> Self {
        PlaybackError::Server {
            status,
            message: body,
        }
    }
}

impl From<reqwest::Error> for PlaybackError {
    fn from(error: reqwest::Error) -> Self {
        Self::from_reqwest(error)
    }
}

impl From<url::ParseError> for PlaybackError {
    fn from(error: url::ParseError) -> Self {
        PlaybackError::Configuration(format!("Invalid server address: {}", error))
    }
}
