#![allow(dead_code)]

pub mod mocks;

use mocks::{Journal, MockBackend, MockPlayer, RecordingNavigation};
use reel_tv::models::{
    Credentials, DeviceId, ItemId, MediaItem, MediaType, SkipMarkers, StreamingPreferences,
    SubtitleTrack, UserData, UserId, seconds_to_ticks,
};
use reel_tv::player::PlayerEvent;
use reel_tv::session::{
    NavigationSink, PlaybackSession, SessionHandle, SessionOptions, SessionSnapshot, SessionState,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub fn credentials() -> Credentials {
    Credentials {
        server_url: "http://jellyfin.local:8096".to_string(),
        access_token: "test_token".to_string(),
        user_id: UserId::new("user-1"),
    }
}

pub fn episode(runtime_seconds: f64, saved_position: Option<f64>) -> MediaItem {
    MediaItem {
        id: ItemId::new("episode-1"),
        name: "Pilot".to_string(),
        media_type: MediaType::Episode,
        runtime_ticks: seconds_to_ticks(runtime_seconds),
        user_data: Some(UserData {
            playback_position_ticks: saved_position.map(seconds_to_ticks),
            is_favorite: false,
        }),
    }
}

pub fn movie(runtime_seconds: f64) -> MediaItem {
    MediaItem {
        id: ItemId::new("movie-1"),
        name: "Feature".to_string(),
        media_type: MediaType::Movie,
        runtime_ticks: seconds_to_ticks(runtime_seconds),
        user_data: None,
    }
}

pub fn intro_markers(credits_start: Option<f64>) -> SkipMarkers {
    SkipMarkers {
        intro_start: 10.0,
        intro_end: 40.0,
        credits_start,
    }
}

pub fn track(index: i32, language: &str) -> SubtitleTrack {
    SubtitleTrack {
        index,
        display_name: language.to_uppercase(),
        language_code: language.to_string(),
    }
}

pub struct Harness {
    pub handle: SessionHandle,
    pub journal: Journal,
    pub events: mpsc::UnboundedSender<PlayerEvent>,
    pub backend: Arc<MockBackend>,
    pub navigation: Arc<RecordingNavigation>,
}

impl Harness {
    pub fn ready(&self) {
        self.send(PlayerEvent::Ready {
            confirmed: true,
            duration: None,
        });
    }

    pub fn time(&self, position: f64) {
        self.send(PlayerEvent::TimeUpdate {
            position,
            buffered: position + 10.0,
        });
    }

    pub fn send(&self, event: PlayerEvent) {
        // The session drops its receiver on teardown
        let _ = self.events.send(event);
    }

    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&SessionSnapshot) -> bool,
    ) -> SessionSnapshot {
        let mut snapshots = self.handle.subscribe();
        tokio::time::timeout(Duration::from_secs(600), snapshots.wait_for(predicate))
            .await
            .expect("timed out waiting for session")
            .expect("session closed")
            .clone()
    }

    pub async fn wait_for_state(&self, state: SessionState) -> SessionSnapshot {
        self.wait_for(|s| s.state == state).await
    }

    /// Starts `item`, confirms readiness and waits for playback.
    pub async fn start_playing(&self, item: MediaItem) -> SessionSnapshot {
        self.handle.start(item).await.unwrap();
        self.ready();
        self.wait_for_state(SessionState::Playing).await
    }
}

pub struct HarnessBuilder {
    journal: Journal,
    player: MockPlayer,
    backend: MockBackend,
    credentials: Credentials,
    prefs: StreamingPreferences,
    options: SessionOptions,
}

pub fn harness() -> HarnessBuilder {
    let journal = Journal::default();
    HarnessBuilder {
        player: MockPlayer::new(journal.clone()),
        backend: MockBackend::new(journal.clone()),
        journal,
        credentials: credentials(),
        prefs: StreamingPreferences::new(DeviceId::new("device-1")),
        options: SessionOptions::default(),
    }
}

impl HarnessBuilder {
    pub fn player(mut self, configure: impl FnOnce(&mut MockPlayer)) -> Self {
        configure(&mut self.player);
        self
    }

    pub fn backend(mut self, configure: impl FnOnce(&mut MockBackend)) -> Self {
        configure(&mut self.backend);
        self
    }

    pub fn prefs(mut self, configure: impl FnOnce(&mut StreamingPreferences)) -> Self {
        configure(&mut self.prefs);
        self
    }

    pub fn options(mut self, configure: impl FnOnce(&mut SessionOptions)) -> Self {
        configure(&mut self.options);
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn spawn(self) -> Harness {
        let events = self.player.events();
        let backend = Arc::new(self.backend);
        let navigation = Arc::new(RecordingNavigation::default());
        let sink: Arc<dyn NavigationSink> = navigation.clone();

        let (handle, session) = PlaybackSession::new(
            Box::new(self.player),
            backend.clone(),
            self.credentials,
            self.prefs,
            self.options,
        );
        tokio::spawn(session.with_navigation(&sink).run());

        Harness {
            handle,
            journal: self.journal,
            events,
            backend,
            navigation,
        }
    }
}
