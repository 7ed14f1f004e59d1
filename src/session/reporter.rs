use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backends::{PlayMethod, PlaybackBackend, PlaybackReport};
use crate::models::{ItemId, PlaySessionId, seconds_to_ticks};
use crate::utils::{PlaybackError, PlaybackResult};

#[derive(Debug)]
enum ReportRequest {
    Progress(PlaybackReport),
    Stopped(PlaybackReport),
    Watched(ItemId),
}

/// Sends the server-side playback reports for one session.
///
/// The start report is awaited by the session. Everything else goes through
/// a queue served by a single worker so reports reach the server in the order
/// they were made, and the stopped report closes the queue.
pub struct ProgressReporter {
    backend: Arc<dyn PlaybackBackend>,
    item_id: ItemId,
    play_session_id: PlaySessionId,
    play_method: PlayMethod,

    has_reported_start: bool,
    has_marked_watched: bool,

    queue: Option<mpsc::UnboundedSender<ReportRequest>>,
    worker: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    pub fn new(
        backend: Arc<dyn PlaybackBackend>,
        item_id: ItemId,
        play_session_id: PlaySessionId,
        play_method: PlayMethod,
    ) -> Self {
        let (queue, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(Self::process_queue(Arc::clone(&backend), receiver));

        Self {
            backend,
            item_id,
            play_session_id,
            play_method,
            has_reported_start: false,
            has_marked_watched: false,
            queue: Some(queue),
            worker: Some(worker),
        }
    }

    pub fn has_reported_start(&self) -> bool {
        self.has_reported_start
    }

    fn report(&self, position: f64, is_paused: bool) -> PlaybackReport {
        PlaybackReport {
            item_id: self.item_id.clone(),
            play_session_id: self.play_session_id.clone(),
            position_ticks: seconds_to_ticks(position),
            is_paused,
            is_muted: false,
            play_method: self.play_method,
        }
    }

    /// Reports playback start once. A cancelled attempt, whether through
    /// `cancel` or from the backend, can be retried; a failed one is not.
    pub async fn report_start(
        &mut self,
        position: f64,
        cancel: &CancellationToken,
    ) -> PlaybackResult<()> {
        if self.has_reported_start {
            debug!("Playback start already reported for {}", self.item_id);
            return Ok(());
        }
        self.has_reported_start = true;

        let report = self.report(position, false);
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PlaybackError::Cancelled),
            result = self.backend.report_playback_start(&report) => result,
        };

        match &result {
            Ok(()) => info!("Reported playback start for {} at {:.1}s", self.item_id, position),
            Err(e) if e.is_cancelled() => {
                debug!("Start report for {} cancelled, will retry", self.item_id);
                self.has_reported_start = false;
            }
            Err(e) => warn!("Failed to report playback start for {}: {}", self.item_id, e),
        }
        result
    }

    pub fn report_progress(&self, position: f64, is_paused: bool) {
        self.enqueue(ReportRequest::Progress(self.report(position, is_paused)));
    }

    /// Queues the watched mark at most once. Must precede `report_stopped`.
    pub fn mark_watched(&mut self) -> bool {
        if self.has_marked_watched || self.queue.is_none() {
            return false;
        }
        self.has_marked_watched = true;
        self.enqueue(ReportRequest::Watched(self.item_id.clone()));
        true
    }

    /// Queues the final report and closes the queue behind it.
    pub fn report_stopped(&mut self, position: f64) {
        self.enqueue(ReportRequest::Stopped(self.report(position, false)));
        self.close();
    }

    /// Closes the queue without a stopped report.
    fn close(&mut self) {
        self.queue = None;
    }

    /// Closes the queue and waits for queued reports to go out.
    pub async fn shutdown(&mut self, drain_timeout: Duration) {
        self.close();
        let Some(worker) = self.worker.take() else {
            return;
        };

        let abort = worker.abort_handle();
        if tokio::time::timeout(drain_timeout, worker).await.is_err() {
            warn!(
                "Playback reports for {} still pending after {:?}, dropping them",
                self.item_id, drain_timeout
            );
            abort.abort();
        }
    }

    fn enqueue(&self, request: ReportRequest) {
        match &self.queue {
            Some(queue) => {
                if queue.send(request).is_err() {
                    warn!("Report worker for {} is gone", self.item_id);
                }
            }
            None => debug!("Report queue closed, dropping {:?}", request),
        }
    }

    async fn process_queue(
        backend: Arc<dyn PlaybackBackend>,
        mut receiver: mpsc::UnboundedReceiver<ReportRequest>,
    ) {
        while let Some(request) = receiver.recv().await {
            let (kind, result) = match &request {
                ReportRequest::Progress(report) => {
                    ("progress", backend.report_playback_progress(report).await)
                }
                ReportRequest::Stopped(report) => {
                    ("stopped", backend.report_playback_stopped(report).await)
                }
                ReportRequest::Watched(item_id) => ("watched", backend.mark_watched(item_id).await),
            };

            match result {
                Ok(()) => debug!("Sent {} report", kind),
                Err(e) if e.is_cancelled() => debug!("{} report cancelled", kind),
                Err(e) => warn!("Failed to send {} report: {}", kind, e),
            }
        }
        debug!("Report queue drained");
    }
}
