use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reel_tv::backends::{PlaybackBackend, PlaybackReport};
use reel_tv::models::{ItemId, MediaItem, SkipMarkers, SubtitleTrack};
use reel_tv::player::{MediaPlayer, PlayerEvent};
use reel_tv::session::NavigationSink;
use reel_tv::utils::PlaybackResult;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;

/// Everything the session did to the player and the server, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(String),
    Play,
    Pause,
    Seek(f64),
    SetSubtitle(Option<i32>),
    Release,
    Probe,
    ReportStart(i64),
    ReportProgress(i64),
    ReportStopped(i64),
    MarkWatched,
    FetchMarkers,
}

impl Call {
    pub fn is_report(&self) -> bool {
        matches!(
            self,
            Call::ReportStart(_) | Call::ReportProgress(_) | Call::ReportStopped(_) | Call::MarkWatched
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Call>>>);

impl Journal {
    pub fn record(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|c| predicate(*c)).count()
    }

    pub fn position_of(&self, predicate: impl Fn(&Call) -> bool) -> Option<usize> {
        self.0.lock().unwrap().iter().position(predicate)
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Seek(position) => Some(position),
                _ => None,
            })
            .collect()
    }

    /// Server report calls only.
    pub fn reports(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_report).collect()
    }
}

pub struct MockPlayer {
    journal: Journal,
    events_tx: mpsc::UnboundedSender<PlayerEvent>,
    events_rx: Option<mpsc::UnboundedReceiver<PlayerEvent>>,
    pub tracks: Vec<SubtitleTrack>,
    pub audio_language: Option<String>,
    pub fail_load: Option<String>,
    pub fail_seek: bool,
}

impl MockPlayer {
    pub fn new(journal: Journal) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            journal,
            events_tx,
            events_rx: Some(events_rx),
            tracks: Vec::new(),
            audio_language: None,
            fail_load: None,
            fail_seek: false,
        }
    }

    /// Sender standing in for the native player's callbacks.
    pub fn events(&self) -> mpsc::UnboundedSender<PlayerEvent> {
        self.events_tx.clone()
    }
}

#[async_trait]
impl MediaPlayer for MockPlayer {
    fn take_event_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<PlayerEvent>> {
        self.events_rx.take()
    }

    async fn load_media(&mut self, url: &str) -> Result<()> {
        self.journal.record(Call::Load(url.to_string()));
        match &self.fail_load {
            Some(message) => Err(anyhow!("{}", message)),
            None => Ok(()),
        }
    }

    async fn play(&mut self) -> Result<()> {
        self.journal.record(Call::Play);
        Ok(())
    }

    async fn pause(&mut self) -> Result<()> {
        self.journal.record(Call::Pause);
        Ok(())
    }

    async fn seek(&mut self, position: Duration) -> Result<()> {
        self.journal.record(Call::Seek(position.as_secs_f64()));
        if self.fail_seek {
            return Err(anyhow!("seek rejected"));
        }
        Ok(())
    }

    async fn subtitle_tracks(&mut self) -> Vec<SubtitleTrack> {
        self.tracks.clone()
    }

    async fn current_audio_language(&mut self) -> Option<String> {
        self.audio_language.clone()
    }

    async fn set_subtitle_track(&mut self, index: Option<i32>) -> Result<()> {
        self.journal.record(Call::SetSubtitle(index));
        Ok(())
    }

    async fn release(&mut self) {
        self.journal.record(Call::Release);
    }
}

#[derive(Debug)]
pub struct MockBackend {
    journal: Journal,
    pub markers: PlaybackResult<Option<SkipMarkers>>,
    pub start_results: Mutex<VecDeque<PlaybackResult<()>>>,
    pub hang_on_start: bool,
    pub sent: Mutex<Vec<PlaybackReport>>,
}

impl MockBackend {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            markers: Ok(None),
            start_results: Mutex::new(VecDeque::new()),
            hang_on_start: false,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent_reports(&self) -> Vec<PlaybackReport> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaybackBackend for MockBackend {
    async fn report_playback_start(&self, report: &PlaybackReport) -> PlaybackResult<()> {
        self.journal.record(Call::ReportStart(report.position_ticks));
        self.sent.lock().unwrap().push(report.clone());
        if self.hang_on_start {
            std::future::pending::<()>().await;
        }
        self.start_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn report_playback_progress(&self, report: &PlaybackReport) -> PlaybackResult<()> {
        self.journal.record(Call::ReportProgress(report.position_ticks));
        self.sent.lock().unwrap().push(report.clone());
        Ok(())
    }

    async fn report_playback_stopped(&self, report: &PlaybackReport) -> PlaybackResult<()> {
        self.journal.record(Call::ReportStopped(report.position_ticks));
        self.sent.lock().unwrap().push(report.clone());
        Ok(())
    }

    async fn mark_watched(&self, _item_id: &ItemId) -> PlaybackResult<()> {
        self.journal.record(Call::MarkWatched);
        Ok(())
    }

    async fn fetch_skip_markers(&self, _item_id: &ItemId) -> PlaybackResult<Option<SkipMarkers>> {
        self.journal.record(Call::FetchMarkers);
        self.markers.clone()
    }

    async fn probe_stream(&self, _url: &Url) -> PlaybackResult<()> {
        self.journal.record(Call::Probe);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    CreditsReached(String),
    PlaybackFinished(String),
}

#[derive(Debug, Default)]
pub struct RecordingNavigation {
    events: Mutex<Vec<Navigation>>,
}

impl RecordingNavigation {
    pub fn events(&self) -> Vec<Navigation> {
        self.events.lock().unwrap().clone()
    }
}

impl NavigationSink for RecordingNavigation {
    fn credits_reached(&self, item: &MediaItem) {
        self.events
            .lock()
            .unwrap()
            .push(Navigation::CreditsReached(item.id.to_string()));
    }

    fn playback_finished(&self, item: &MediaItem) {
        self.events
            .lock()
            .unwrap()
            .push(Navigation::PlaybackFinished(item.id.to_string()));
    }
}
