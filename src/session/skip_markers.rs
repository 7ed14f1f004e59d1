use std::time::Duration;
use tracing::debug;

use crate::models::SkipMarkers;

/// Positions this close to the intro start still arm the countdown.
const COUNTDOWN_ARM_WINDOW_SECONDS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipAction {
    /// Seek right away to the given position.
    SeekTo(f64),
    /// Seek to `target` once `delay` has elapsed, unless the intro was skipped first.
    ScheduleSkip { delay: Duration, target: f64 },
}

/// What the session has to do after feeding the manager a position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SkipEvaluation {
    pub action: Option<SkipAction>,
    /// New value of the "skip intro" affordance, when it changed
    pub intro_available: Option<bool>,
    /// Set on the one tick that first reaches the credits
    pub credits_reached: bool,
}

/// Tracks intro/credits markers for one session and decides when to skip.
pub struct SkipMarkerManager {
    markers: Option<SkipMarkers>,

    has_skipped_intro: bool,
    skip_intro_available: bool,
    credits_reached: bool,
    countdown_armed: bool,

    config_auto_skip_intro: bool,
    config_countdown: Duration,
}

impl SkipMarkerManager {
    pub fn new(auto_skip_intro: bool, countdown: Duration) -> Self {
        Self {
            markers: None,
            has_skipped_intro: false,
            skip_intro_available: false,
            credits_reached: false,
            countdown_armed: false,
            config_auto_skip_intro: auto_skip_intro,
            config_countdown: countdown,
        }
    }

    pub fn load_markers(&mut self, markers: SkipMarkers) {
        self.markers = Some(markers);
    }

    pub fn markers(&self) -> Option<&SkipMarkers> {
        self.markers.as_ref()
    }

    pub fn has_skipped_intro(&self) -> bool {
        self.has_skipped_intro
    }

    pub fn is_skip_intro_available(&self) -> bool {
        self.skip_intro_available
    }

    pub fn has_reached_credits(&self) -> bool {
        self.credits_reached
    }

    /// Evaluate a playhead position.
    pub fn update(&mut self, position: f64) -> SkipEvaluation {
        let mut evaluation = SkipEvaluation::default();
        let Some(markers) = self.markers else {
            return evaluation;
        };

        if markers.contains_intro(position) && !self.has_skipped_intro {
            if self.config_auto_skip_intro {
                if self.config_countdown.is_zero() {
                    debug!("Auto-skipping intro to {:.1}s", markers.intro_end);
                    self.has_skipped_intro = true;
                    evaluation.action = Some(SkipAction::SeekTo(markers.intro_end));
                } else if !self.countdown_armed
                    && position - markers.intro_start <= COUNTDOWN_ARM_WINDOW_SECONDS
                {
                    debug!(
                        "Intro skip in {:?} (target {:.1}s)",
                        self.config_countdown, markers.intro_end
                    );
                    self.countdown_armed = true;
                    evaluation.action = Some(SkipAction::ScheduleSkip {
                        delay: self.config_countdown,
                        target: markers.intro_end,
                    });
                }
            }

            if !self.has_skipped_intro && !self.skip_intro_available {
                self.skip_intro_available = true;
                evaluation.intro_available = Some(true);
            }
        } else if self.skip_intro_available {
            self.skip_intro_available = false;
            evaluation.intro_available = Some(false);
        }

        let in_credits = markers
            .credits_start
            .is_some_and(|credits_start| position >= credits_start);
        if in_credits && !self.credits_reached {
            debug!("Credits reached at {:.1}s", position);
            self.credits_reached = true;
            evaluation.credits_reached = true;
        }

        evaluation
    }

    /// Countdown elapsed. Only skips while the playhead is still inside the
    /// intro and nothing skipped it meanwhile.
    pub fn fire_scheduled_skip(&mut self, position: f64) -> SkipEvaluation {
        self.countdown_armed = false;
        if self.has_skipped_intro {
            debug!("Scheduled intro skip pre-empted");
            return SkipEvaluation::default();
        }
        if !self.markers.is_some_and(|m| m.contains_intro(position)) {
            debug!("Intro left at {:.1}s, dropping scheduled skip", position);
            return SkipEvaluation::default();
        }
        self.skip_intro_now()
    }

    /// Drops a pending countdown so the intro start can arm it again.
    pub fn cancel_countdown(&mut self) {
        if self.countdown_armed {
            debug!("Intro skip countdown cancelled");
            self.countdown_armed = false;
        }
    }

    /// Manual "skip intro" request.
    pub fn skip_intro(&mut self) -> SkipEvaluation {
        if self.has_skipped_intro {
            return SkipEvaluation::default();
        }
        self.skip_intro_now()
    }

    fn skip_intro_now(&mut self) -> SkipEvaluation {
        let Some(markers) = self.markers else {
            return SkipEvaluation::default();
        };

        self.has_skipped_intro = true;
        let intro_available = if self.skip_intro_available {
            self.skip_intro_available = false;
            Some(false)
        } else {
            None
        };

        SkipEvaluation {
            action: Some(SkipAction::SeekTo(markers.intro_end)),
            intro_available,
            credits_reached: false,
        }
    }
}
