use crate::models::{SubtitleMode, SubtitleTrack};

/// Picks the subtitle track to enable once the asset's tracks are known.
pub struct SubtitleTrackSelector;

impl SubtitleTrackSelector {
    /// Returns the track index to enable, `None` for subtitles off.
    ///
    /// Foreign-only and smart modes only turn subtitles on when the audio is
    /// known to differ from the preferred language. Whenever subtitles are
    /// wanted and no track matches, the first track is used.
    pub fn select(
        tracks: &[SubtitleTrack],
        mode: SubtitleMode,
        preferred_language: &str,
        current_audio_language: Option<&str>,
    ) -> Option<i32> {
        let wanted = match mode {
            SubtitleMode::Off => false,
            SubtitleMode::On => true,
            SubtitleMode::ForeignOnly | SubtitleMode::Smart => current_audio_language
                .is_some_and(|audio| !languages_match(audio, preferred_language)),
        };
        if !wanted {
            return None;
        }

        tracks
            .iter()
            .find(|track| languages_match(&track.language_code, preferred_language))
            .or_else(|| tracks.first())
            .map(|track| track.index)
    }
}

/// Compares language tags loosely: case and region are ignored, and a
/// two-letter code matches the three-letter code it prefixes ("en"/"eng").
pub fn languages_match(a: &str, b: &str) -> bool {
    let a = primary_subtag(a);
    let b = primary_subtag(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    match (a.len(), b.len()) {
        (2, 3) => b.starts_with(&a),
        (3, 2) => a.starts_with(&b),
        _ => false,
    }
}

fn primary_subtag(tag: &str) -> String {
    tag.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}
