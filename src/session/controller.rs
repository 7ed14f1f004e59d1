use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error, info, warn};

use super::reporter::ProgressReporter;
use super::resume::{ResumePositionResolver, is_watched};
use super::skip_markers::{SkipAction, SkipEvaluation, SkipMarkerManager};
use super::state::{SessionSnapshot, SessionState};
use super::subtitles::SubtitleTrackSelector;
use crate::backends::jellyfin::StreamUrlBuilder;
use crate::backends::{PlayMethod, PlaybackBackend};
use crate::models::{
    Credentials, MediaItem, PlaySessionId, SkipMarkers, StreamingPreferences, SubtitleMode,
};
use crate::player::{MediaPlayer, PlayerEvent};
use crate::utils::{PlaybackError, PlaybackResult};

/// Receives "what next" notifications. The session never navigates itself.
pub trait NavigationSink: Send + Sync {
    /// The playhead entered the credits of `item`.
    fn credits_reached(&self, item: &MediaItem);

    /// `item` played to its natural end.
    fn playback_finished(&self, item: &MediaItem);
}

/// Timing and behaviour knobs, snapshotted when the session is created.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub auto_skip_intro: bool,
    /// Zero skips as soon as the intro is entered
    pub intro_skip_countdown: Duration,
    pub progress_interval: Duration,
    pub readiness_timeout: Duration,
    pub probe_timeout: Duration,
    pub probe_stream: bool,
    /// Upper bound on waiting for queued reports during teardown
    pub report_drain_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            auto_skip_intro: true,
            intro_skip_countdown: Duration::ZERO,
            progress_interval: Duration::from_secs(10),
            readiness_timeout: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(5),
            probe_stream: true,
            report_drain_timeout: Duration::from_secs(5),
        }
    }
}

/// Commands that can be sent to a playback session
#[derive(Debug)]
enum SessionCommand {
    Start {
        item: MediaItem,
        respond_to: oneshot::Sender<PlaybackResult<()>>,
    },
    Play {
        respond_to: oneshot::Sender<PlaybackResult<()>>,
    },
    Pause {
        respond_to: oneshot::Sender<PlaybackResult<()>>,
    },
    TogglePause {
        respond_to: oneshot::Sender<PlaybackResult<()>>,
    },
    /// Seek to an absolute position in seconds
    Seek {
        position: f64,
        respond_to: oneshot::Sender<PlaybackResult<()>>,
    },
    SkipIntro {
        respond_to: oneshot::Sender<PlaybackResult<bool>>,
    },
    Stop {
        respond_to: oneshot::Sender<()>,
    },
}

/// One playback of one item: owns the player, drives the state machine and
/// the server reports. Runs as a single task; talk to it through
/// [`SessionHandle`].
pub struct PlaybackSession {
    player: Box<dyn MediaPlayer>,
    backend: Arc<dyn PlaybackBackend>,
    credentials: Credentials,
    prefs: StreamingPreferences,
    options: SessionOptions,
    navigation: Option<Weak<dyn NavigationSink>>,

    receiver: mpsc::UnboundedReceiver<SessionCommand>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    cancel: CancellationToken,

    state: SessionState,
    item: Option<MediaItem>,
    reporter: Option<ProgressReporter>,
    skip: SkipMarkerManager,
    position: f64,
    duration: f64,
    buffered: f64,
    subtitle_index: Option<i32>,
    last_error: Option<PlaybackError>,

    events: Option<mpsc::UnboundedReceiver<PlayerEvent>>,
    readiness_deadline: Option<Instant>,
    progress_timer: Option<Interval>,
    skip_deadline: Option<Instant>,
    /// Countdown left over when playback was paused mid-intro.
    paused_skip_delay: Option<Duration>,
    marker_task: Option<JoinHandle<PlaybackResult<Option<SkipMarkers>>>>,
    setup_started: bool,
    torn_down: bool,
}

impl PlaybackSession {
    pub fn new(
        player: Box<dyn MediaPlayer>,
        backend: Arc<dyn PlaybackBackend>,
        credentials: Credentials,
        prefs: StreamingPreferences,
        options: SessionOptions,
    ) -> (SessionHandle, PlaybackSession) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::default());
        let cancel = CancellationToken::new();

        let handle = SessionHandle {
            sender,
            snapshot_rx,
            cancel: cancel.clone(),
            _cancel_on_drop: Arc::new(cancel.clone().drop_guard()),
        };

        let skip = SkipMarkerManager::new(options.auto_skip_intro, options.intro_skip_countdown);
        let session = PlaybackSession {
            player,
            backend,
            credentials,
            prefs,
            options,
            navigation: None,
            receiver,
            snapshot_tx,
            cancel,
            state: SessionState::Idle,
            item: None,
            reporter: None,
            skip,
            position: 0.0,
            duration: 0.0,
            buffered: 0.0,
            subtitle_index: None,
            last_error: None,
            events: None,
            readiness_deadline: None,
            progress_timer: None,
            skip_deadline: None,
            paused_skip_delay: None,
            marker_task: None,
            setup_started: false,
            torn_down: false,
        };

        (handle, session)
    }

    /// Creates the session and spawns it on the current runtime.
    pub fn spawn(
        player: Box<dyn MediaPlayer>,
        backend: Arc<dyn PlaybackBackend>,
        credentials: Credentials,
        prefs: StreamingPreferences,
        options: SessionOptions,
    ) -> SessionHandle {
        let (handle, session) = Self::new(player, backend, credentials, prefs, options);
        tokio::spawn(session.run());
        handle
    }

    /// The session only keeps a weak reference; a dropped sink is skipped.
    pub fn with_navigation(mut self, navigation: &Arc<dyn NavigationSink>) -> Self {
        self.navigation = Some(Arc::downgrade(navigation));
        self
    }

    pub async fn run(mut self) {
        debug!("Playback session task started");

        loop {
            tokio::select! {
                command = self.receiver.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        debug!("All session handles dropped, tearing down");
                        self.end_session().await;
                    }
                },
                event = next_event(&mut self.events) => match event {
                    Some(event) => self.handle_player_event(event).await,
                    None => {
                        debug!("Player event stream closed");
                        self.events = None;
                    }
                },
                _ = sleep_until(self.readiness_deadline) => {
                    self.readiness_deadline = None;
                    self.on_readiness_timeout().await;
                }
                _ = next_tick(&mut self.progress_timer) => self.on_progress_tick().await,
                _ = sleep_until(self.skip_deadline) => self.on_skip_deadline().await,
                result = join_task(&mut self.marker_task) => {
                    self.marker_task = None;
                    self.on_markers(result);
                }
            }

            if self.torn_down {
                break;
            }
        }

        debug!("Playback session task finished in state {}", self.state);
    }

    async fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Start { item, respond_to } => {
                let result = self.start(item).await;
                let _ = respond_to.send(result);
            }
            SessionCommand::Play { respond_to } => {
                let result = self.resume_playback().await;
                let _ = respond_to.send(result);
            }
            SessionCommand::Pause { respond_to } => {
                let result = self.pause_playback().await;
                let _ = respond_to.send(result);
            }
            SessionCommand::TogglePause { respond_to } => {
                let result = match self.state {
                    SessionState::Playing => self.pause_playback().await,
                    SessionState::Paused => self.resume_playback().await,
                    _ => Ok(()),
                };
                let _ = respond_to.send(result);
            }
            SessionCommand::Seek {
                position,
                respond_to,
            } => {
                let result = self.seek_to(position).await;
                let _ = respond_to.send(result);
            }
            SessionCommand::SkipIntro { respond_to } => {
                let evaluation = self.skip.skip_intro();
                let skipped = evaluation.action.is_some();
                if skipped {
                    self.cancel_skip_countdown();
                }
                self.apply_skip(evaluation).await;
                let _ = respond_to.send(Ok(skipped));
            }
            SessionCommand::Stop { respond_to } => {
                self.end_session().await;
                let _ = respond_to.send(());
            }
        }
    }

    async fn start(&mut self, item: MediaItem) -> PlaybackResult<()> {
        if self.state != SessionState::Idle {
            debug!("Ignoring start of {} in state {}", item.id, self.state);
            return Ok(());
        }

        info!("Starting playback of {} ({})", item.name, item.id);
        self.duration = item.duration_seconds();
        self.item = Some(item.clone());
        self.transition(SessionState::Loading);

        let play_session_id = PlaySessionId::generate();
        let (url, play_method) = if self.prefs.bypass_transcoding {
            (
                StreamUrlBuilder::direct(&item, &self.prefs, &self.credentials),
                PlayMethod::DirectPlay,
            )
        } else {
            (
                StreamUrlBuilder::build_for_session(
                    &item,
                    &self.prefs,
                    &self.credentials,
                    &play_session_id,
                ),
                PlayMethod::Transcode,
            )
        };
        let url = match url {
            Ok(url) => url,
            Err(e) => {
                self.fail(e.clone()).await;
                return Err(e);
            }
        };

        if self.options.probe_stream {
            let probe = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(PlaybackError::Cancelled),
                result = tokio::time::timeout(
                    self.options.probe_timeout,
                    self.backend.probe_stream(&url),
                ) => result.unwrap_or_else(|_| {
                    Err(PlaybackError::NetworkUnavailable("stream probe timed out".into()))
                }),
            };
            match probe {
                Ok(()) => debug!("Stream probe succeeded"),
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => warn!("Stream probe failed, loading anyway: {}", e),
            }
        }

        self.reporter = Some(ProgressReporter::new(
            Arc::clone(&self.backend),
            item.id.clone(),
            play_session_id,
            play_method,
        ));

        self.events = self.player.take_event_receiver();
        if self.events.is_none() {
            warn!("Player event stream already taken, relying on readiness timeout");
        }

        if let Err(e) = self.player.load_media(url.as_str()).await {
            let error = PlaybackError::DecodeFailure(e.to_string());
            self.fail(error.clone()).await;
            return Err(error);
        }

        self.readiness_deadline = Some(Instant::now() + self.options.readiness_timeout);
        self.publish();
        Ok(())
    }

    async fn handle_player_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Ready {
                confirmed,
                duration,
            } => {
                if let Some(duration) = duration.filter(|d| d.is_finite() && *d > 0.0) {
                    self.duration = duration;
                }

                match (self.state, confirmed) {
                    (SessionState::Loading | SessionState::ReadyUnconfirmed, true) => {
                        self.transition(SessionState::ReadyToPlay);
                        self.begin_playback().await;
                    }
                    (SessionState::Loading, false) => {
                        debug!("Player ready but unconfirmed, waiting for the stream to settle");
                        self.transition(SessionState::ReadyUnconfirmed);
                    }
                    _ => self.publish(),
                }
            }
            PlayerEvent::TimeUpdate { position, buffered } => {
                if !self.setup_started {
                    return;
                }
                self.position = position;
                self.buffered = buffered;

                if self.state == SessionState::Playing {
                    let evaluation = self.skip.update(position);
                    self.apply_skip(evaluation).await;
                } else {
                    self.publish();
                }
            }
            PlayerEvent::EndOfStream => {
                if !matches!(self.state, SessionState::Playing | SessionState::Paused) {
                    debug!("Ignoring end of stream in state {}", self.state);
                    return;
                }
                info!("Reached end of stream");
                self.position = self.position.max(self.duration);
                self.end_session().await;
                self.notify(|navigation, item| navigation.playback_finished(item));
            }
            PlayerEvent::Failed(message) => {
                if self.state.is_terminal() || self.state == SessionState::Idle {
                    return;
                }
                self.fail(PlaybackError::DecodeFailure(message)).await;
            }
        }
    }

    async fn on_readiness_timeout(&mut self) {
        match self.state {
            SessionState::Loading => {
                warn!(
                    "Player not ready after {:?}, attempting playback anyway",
                    self.options.readiness_timeout
                );
                self.transition(SessionState::ReadyUnconfirmed);
                self.begin_playback().await;
            }
            SessionState::ReadyUnconfirmed => {
                info!("Stream still unconfirmed, attempting playback");
                self.begin_playback().await;
            }
            _ => {}
        }
    }

    /// Resume seek, start report, skip marker fetch, subtitles, then play.
    /// Each step bails out if the session is being stopped.
    async fn begin_playback(&mut self) {
        if self.setup_started {
            return;
        }
        self.setup_started = true;
        self.readiness_deadline = None;

        let Some(item) = self.item.clone() else {
            return;
        };

        if let Some(resume) = ResumePositionResolver::resolve(&item) {
            info!("Resuming {} at {:.1}s", item.id, resume);
            let seek = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                result = self.player.seek(Duration::from_secs_f64(resume)) => Some(result),
            };
            match seek {
                None => return,
                Some(Ok(())) => self.position = resume,
                Some(Err(e)) => warn!("Resume seek failed, starting from the beginning: {}", e),
            }
        }

        if let Some(reporter) = self.reporter.as_mut() {
            // Failures are logged by the reporter and never block playback
            let _ = reporter.report_start(self.position, &self.cancel).await;
        }
        if self.cancel.is_cancelled() {
            return;
        }

        let backend = Arc::clone(&self.backend);
        let cancel = self.cancel.clone();
        let item_id = item.id.clone();
        self.marker_task = Some(tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => Err(PlaybackError::Cancelled),
                result = backend.fetch_skip_markers(&item_id) => result,
            }
        }));

        self.configure_subtitles().await;
        if self.cancel.is_cancelled() {
            return;
        }

        if let Err(e) = self.player.play().await {
            self.fail(PlaybackError::DecodeFailure(e.to_string())).await;
            return;
        }
        self.transition(SessionState::Playing);
        self.start_progress_timer();
    }

    async fn configure_subtitles(&mut self) {
        let tracks = self.player.subtitle_tracks().await;
        let audio_language = self.player.current_audio_language().await;
        let selection = SubtitleTrackSelector::select(
            &tracks,
            self.prefs.subtitle_mode,
            &self.prefs.subtitle_language,
            audio_language.as_deref(),
        );

        if selection.is_none() && self.prefs.subtitle_mode != SubtitleMode::Off {
            debug!(
                "No subtitles for mode {:?} (audio {:?}, {} tracks)",
                self.prefs.subtitle_mode,
                audio_language,
                tracks.len()
            );
        }

        match self.player.set_subtitle_track(selection).await {
            Ok(()) => {
                if let Some(index) = selection {
                    info!("Enabled subtitle track {}", index);
                }
                self.subtitle_index = selection;
            }
            Err(e) => {
                warn!("Failed to configure subtitles: {}", e);
                self.subtitle_index = None;
            }
        }
    }

    fn start_progress_timer(&mut self) {
        let period = self.options.progress_interval;
        let mut timer = tokio::time::interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.progress_timer = Some(timer);
    }

    async fn on_progress_tick(&mut self) {
        if self.state != SessionState::Playing {
            debug!("Skipping progress report while {}", self.state);
            return;
        }
        let Some(reporter) = self.reporter.as_mut() else {
            return;
        };

        if !reporter.has_reported_start() {
            let _ = reporter.report_start(self.position, &self.cancel).await;
        }
        reporter.report_progress(self.position, false);
        self.publish();
    }

    fn on_markers(&mut self, result: Result<PlaybackResult<Option<SkipMarkers>>, JoinError>) {
        match result {
            Ok(Ok(Some(markers))) => {
                self.skip.load_markers(markers);
                self.publish();
            }
            Ok(Ok(None)) => debug!("No skip markers for this item"),
            Ok(Err(e)) if e.is_cancelled() => debug!("Skip marker fetch cancelled"),
            Ok(Err(e)) => debug!("Skip markers unavailable: {}", e),
            Err(e) => warn!("Skip marker task failed: {}", e),
        }
    }

    async fn on_skip_deadline(&mut self) {
        self.skip_deadline = None;
        if self.state != SessionState::Playing {
            debug!("Dropping intro skip countdown in state {}", self.state);
            return;
        }
        let evaluation = self.skip.fire_scheduled_skip(self.position);
        self.apply_skip(evaluation).await;
    }

    fn cancel_skip_countdown(&mut self) {
        self.skip_deadline = None;
        self.paused_skip_delay = None;
        self.skip.cancel_countdown();
    }

    async fn apply_skip(&mut self, evaluation: SkipEvaluation) {
        if let Some(available) = evaluation.intro_available {
            debug!("Skip intro available: {}", available);
            if !available {
                self.cancel_skip_countdown();
            }
        }

        match evaluation.action {
            Some(SkipAction::SeekTo(target)) => {
                self.skip_deadline = None;
                info!("Skipping intro to {:.1}s", target);
                self.seek_player(target).await;
            }
            Some(SkipAction::ScheduleSkip { delay, .. }) => {
                self.skip_deadline = Some(Instant::now() + delay);
            }
            None => {}
        }

        if evaluation.credits_reached {
            self.notify(|navigation, item| navigation.credits_reached(item));
        }
        self.publish();
    }

    async fn seek_player(&mut self, target: f64) {
        let Ok(offset) = Duration::try_from_secs_f64(target.max(0.0)) else {
            warn!("Ignoring seek to invalid position {}", target);
            return;
        };
        match self.player.seek(offset).await {
            Ok(()) => self.position = target,
            Err(e) => warn!("Seek to {:.1}s failed: {}", target, e),
        }
    }

    async fn seek_to(&mut self, position: f64) -> PlaybackResult<()> {
        if !self.setup_started || self.state.is_terminal() || !position.is_finite() {
            debug!("Ignoring seek to {} in state {}", position, self.state);
            return Ok(());
        }

        let mut target = position.max(0.0);
        if self.duration > 0.0 {
            target = target.min(self.duration);
        }
        self.seek_player(target).await;
        let in_intro = self
            .skip
            .markers()
            .is_some_and(|markers| markers.contains_intro(self.position));
        if !in_intro {
            self.cancel_skip_countdown();
        }
        self.publish();
        Ok(())
    }

    async fn pause_playback(&mut self) -> PlaybackResult<()> {
        if self.state != SessionState::Playing {
            debug!("Ignoring pause in state {}", self.state);
            return Ok(());
        }
        match self.player.pause().await {
            Ok(()) => {
                if let Some(deadline) = self.skip_deadline.take() {
                    self.paused_skip_delay =
                        Some(deadline.saturating_duration_since(Instant::now()));
                }
                self.transition(SessionState::Paused);
            }
            Err(e) => warn!("Player refused to pause: {}", e),
        }
        Ok(())
    }

    async fn resume_playback(&mut self) -> PlaybackResult<()> {
        if self.state != SessionState::Paused {
            debug!("Ignoring play in state {}", self.state);
            return Ok(());
        }
        match self.player.play().await {
            Ok(()) => {
                if let Some(delay) = self.paused_skip_delay.take() {
                    self.skip_deadline = Some(Instant::now() + delay);
                }
                self.transition(SessionState::Playing);
            }
            Err(e) => warn!("Player refused to resume: {}", e),
        }
        Ok(())
    }

    /// Stops timers and observers so nothing can report past this point.
    fn clear_activity(&mut self) {
        self.progress_timer = None;
        self.readiness_deadline = None;
        self.skip_deadline = None;
        self.paused_skip_delay = None;
        self.events = None;
        if let Some(task) = self.marker_task.take() {
            task.abort();
        }
    }

    async fn end_session(&mut self) {
        if self.torn_down {
            return;
        }
        self.cancel.cancel();
        self.clear_activity();

        let was_started = self.state != SessionState::Idle;
        self.transition(SessionState::Ended);

        if let Some(mut reporter) = self.reporter.take() {
            if is_watched(self.position, self.duration) {
                reporter.mark_watched();
            }
            reporter.report_stopped(self.position);
            reporter.shutdown(self.options.report_drain_timeout).await;
        } else if was_started {
            debug!("Session ended before reporting was set up");
        }

        self.release_player().await;
    }

    async fn fail(&mut self, error: PlaybackError) {
        if self.torn_down {
            return;
        }
        error!("Playback failed: {}", error);
        self.cancel.cancel();
        self.clear_activity();
        self.last_error = Some(error);
        self.transition(SessionState::Failed);

        if let Some(mut reporter) = self.reporter.take() {
            if reporter.has_reported_start() {
                reporter.report_stopped(self.position);
            }
            reporter.shutdown(self.options.report_drain_timeout).await;
        }

        self.release_player().await;
    }

    async fn release_player(&mut self) {
        self.player.release().await;
        self.torn_down = true;
        info!("Playback session torn down in state {}", self.state);
        self.publish();
    }

    fn transition(&mut self, next: SessionState) -> bool {
        if !self.state.can_transition_to(next) {
            warn!("Ignoring transition {} -> {}", self.state, next);
            return false;
        }
        info!("Session {} -> {}", self.state, next);
        self.state = next;
        self.publish();
        true
    }

    fn notify(&self, f: impl FnOnce(&dyn NavigationSink, &MediaItem)) {
        let navigation = self.navigation.as_ref().and_then(Weak::upgrade);
        if let (Some(navigation), Some(item)) = (navigation, self.item.as_ref()) {
            f(&*navigation, item);
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            item_id: self.item.as_ref().map(|item| item.id.clone()),
            position: self.position,
            duration: self.duration,
            buffered: self.buffered,
            has_reported_start: self
                .reporter
                .as_ref()
                .is_some_and(ProgressReporter::has_reported_start),
            has_skipped_intro: self.skip.has_skipped_intro(),
            skip_intro_available: self.skip.is_skip_intro_available(),
            credits_reached: self.skip.has_reached_credits(),
            subtitle_index: self.subtitle_index,
            skip_markers: self.skip.markers().copied(),
            last_error: self.last_error.clone(),
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

async fn next_event(events: &mut Option<mpsc::UnboundedReceiver<PlayerEvent>>) -> Option<PlayerEvent> {
    match events {
        Some(events) => events.recv().await,
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn join_task<T>(task: &mut Option<JoinHandle<T>>) -> Result<T, JoinError> {
    match task {
        Some(task) => task.await,
        None => std::future::pending().await,
    }
}

/// Handle for talking to a [`PlaybackSession`]. Cheap to clone; the session
/// tears itself down when the last handle is dropped.
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::UnboundedSender<SessionCommand>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
    cancel: CancellationToken,
    _cancel_on_drop: Arc<DropGuard>,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("state", &self.state())
            .finish()
    }
}

impl SessionHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<PlaybackResult<T>>) -> SessionCommand,
    ) -> PlaybackResult<T> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(command(respond_to))
            .map_err(|_| PlaybackError::Closed)?;
        response.await.map_err(|_| PlaybackError::Closed)?
    }

    /// Loads `item` and begins playback once the player is ready. Returns
    /// after the stream has been handed to the player; a second call is a
    /// no-op.
    pub async fn start(&self, item: MediaItem) -> PlaybackResult<()> {
        self.request(|respond_to| SessionCommand::Start { item, respond_to })
            .await
    }

    pub async fn play(&self) -> PlaybackResult<()> {
        self.request(|respond_to| SessionCommand::Play { respond_to })
            .await
    }

    pub async fn pause(&self) -> PlaybackResult<()> {
        self.request(|respond_to| SessionCommand::Pause { respond_to })
            .await
    }

    pub async fn toggle_pause(&self) -> PlaybackResult<()> {
        self.request(|respond_to| SessionCommand::TogglePause { respond_to })
            .await
    }

    /// Seeks to `position` seconds, clamped to the item's duration.
    pub async fn seek(&self, position: f64) -> PlaybackResult<()> {
        self.request(|respond_to| SessionCommand::Seek {
            position,
            respond_to,
        })
        .await
    }

    /// Returns whether a skip happened. The intro is only skipped once.
    pub async fn skip_intro(&self) -> PlaybackResult<bool> {
        self.request(|respond_to| SessionCommand::SkipIntro { respond_to })
            .await
    }

    /// Ends the session and waits for teardown. In-flight setup requests
    /// are cancelled first. Stopping a finished session is a no-op.
    pub async fn stop(&self) -> PlaybackResult<()> {
        self.cancel.cancel();
        let (respond_to, response) = oneshot::channel();
        if self.sender.send(SessionCommand::Stop { respond_to }).is_err() {
            return Ok(());
        }
        let _ = response.await;
        Ok(())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.snapshot_rx.borrow().state
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }
}
