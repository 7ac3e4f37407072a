//! Session State Machine
//!
//! [`SessionContext`] owns the scorer, the stability and failure trackers,
//! and the sample buffer, and advances the lifecycle phase from analyzed
//! frames. All timing flows in through caller-supplied timestamps; the
//! context holds no clock. Deadlines (timer start, auto-stop) are stored as
//! absolute timestamps and checked on every tick and on explicit `poll`
//! calls, so they fire even when no frames arrive.

use super::report::{aggregate, FinalReport};
use super::trackers::{FailureTracker, StabilityTracker};
use super::{SessionEvent, SessionPhase};
use crate::analysis::scoring::PoseScorer;
use crate::analysis::{AnalysisResult, PlankVariant};
use crate::app::config::{Config, SessionConfig};
use crate::pose::LandmarkFrame;
use crate::time::TimestampMs;
use tracing::{debug, info};

pub struct SessionContext {
    session_cfg: SessionConfig,
    interval_ms: u64,
    stack_default: u8,
    scorer: PoseScorer,

    phase: SessionPhase,
    variant: PlankVariant,
    stability: StabilityTracker,
    failure: FailureTracker,

    last_analysis_at: Option<TimestampMs>,
    /// Epoch of the running hold timer. Re-anchored on resume.
    timer_epoch: Option<TimestampMs>,
    paused_at: Option<TimestampMs>,
    /// Deadline at which the timer starts (identification + start grace).
    timer_starts_at: Option<TimestampMs>,
    /// Deadline of a scheduled auto-stop (form failure + stop grace).
    stop_deadline: Option<TimestampMs>,

    samples: Vec<AnalysisResult>,
}

impl SessionContext {
    pub fn new(config: &Config) -> Self {
        Self {
            session_cfg: config.session.clone(),
            interval_ms: config.analysis.interval_ms,
            stack_default: config.scoring.fallback_score,
            scorer: PoseScorer::new(config),
            phase: SessionPhase::Idle,
            variant: PlankVariant::Unknown,
            stability: StabilityTracker::new(&config.session),
            failure: FailureTracker::new(&config.session),
            last_analysis_at: None,
            timer_epoch: None,
            paused_at: None,
            timer_starts_at: None,
            stop_deadline: None,
            samples: Vec::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn variant(&self) -> PlankVariant {
        self.variant
    }

    /// Whether the hold timer is counting (or frozen by a pause).
    pub fn timer_running(&self) -> bool {
        self.timer_epoch.is_some()
    }

    /// Whole seconds held so far. Zero before the timer starts; frozen at
    /// the pause instant while paused.
    pub fn elapsed_secs(&self, now: TimestampMs) -> u64 {
        match self.timer_epoch {
            None => 0,
            Some(epoch) => match self.paused_at {
                Some(paused) => paused.secs_since(epoch),
                None => now.secs_since(epoch),
            },
        }
    }

    /// Leave Idle and start waiting for a body to appear.
    pub fn begin(&mut self) {
        if self.phase == SessionPhase::Idle {
            info!("session begun, waiting for body detection");
            self.phase = SessionPhase::Detecting;
        }
    }

    /// Feed one frame. Returns the session events it caused, in order.
    ///
    /// Frames arriving inside the analysis interval are discarded (deadline
    /// checks still run). Analysis keeps flowing while paused; only the
    /// timer, failure detection and sample buffering are suspended.
    pub fn tick(&mut self, frame: &LandmarkFrame, now: TimestampMs) -> Vec<SessionEvent> {
        let mut events = self.poll(now);

        if matches!(self.phase, SessionPhase::Idle | SessionPhase::Stopped) {
            return events;
        }

        if let Some(last) = self.last_analysis_at {
            if now.millis_since(last) < self.interval_ms {
                return events;
            }
        }
        self.last_analysis_at = Some(now);

        let result = self.scorer.analyze(frame);

        // Detection requires a recognizable plank, not just a visible body:
        // a known variant with both body-line scores above the quality
        // floor. The same predicate feeds the stability window, so the
        // window starts counting on the tick that enters Identifying.
        if self.phase == SessionPhase::Detecting && self.stability.qualifies(&result) {
            info!("plank detected");
            self.phase = SessionPhase::Identifying;
            events.push(SessionEvent::DetectionStarted);
        }

        if result.has_analysis() {
            events.push(SessionEvent::Sample(result.clone()));
        }

        match self.phase {
            SessionPhase::Identifying => {
                self.stability.observe(&result, now);
                if let Some(variant) = self.stability.stable_variant(now) {
                    info!(variant = %variant, "plank variant identified");
                    self.variant = variant;
                    self.phase = SessionPhase::Active;
                    self.timer_starts_at =
                        Some(now.advanced_by(self.session_cfg.start_grace_ms));
                    events.push(SessionEvent::VariantIdentified(variant));
                }
            }
            SessionPhase::Active => {
                if result.has_analysis() {
                    self.samples.push(result.clone());
                }
                if self.timer_running() && self.stop_deadline.is_none() {
                    if self.failure.observe(&result, now) {
                        info!("form failure sustained, scheduling stop");
                        self.stop_deadline =
                            Some(now.advanced_by(self.session_cfg.stop_grace_ms));
                        events.push(SessionEvent::FormBroken);
                    }
                }
            }
            _ => {}
        }

        events
    }

    /// Check pending deadlines without a frame. Call this from the driving
    /// loop when frames stall, so the timer start and auto-stop still fire.
    pub fn poll(&mut self, now: TimestampMs) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.phase != SessionPhase::Active {
            return events;
        }

        if let Some(starts_at) = self.timer_starts_at {
            if now.is_at_or_after(starts_at) {
                debug!("hold timer started");
                self.timer_starts_at = None;
                // Anchor at the deadline, not at the observation instant
                self.timer_epoch = Some(starts_at);
                events.push(SessionEvent::TimerStarted);
            }
        }

        if let Some(deadline) = self.stop_deadline {
            if now.is_at_or_after(deadline) {
                let report = self.finalize(deadline);
                events.push(SessionEvent::Stopped(report));
            }
        }

        events
    }

    /// Freeze the timer. No-op outside Active.
    pub fn pause(&mut self, now: TimestampMs) -> Option<SessionEvent> {
        if self.phase != SessionPhase::Active {
            return None;
        }
        info!("session paused");
        self.phase = SessionPhase::Paused;
        self.paused_at = Some(now);
        Some(SessionEvent::Paused)
    }

    /// Resume from a pause. The timer epoch and every pending deadline
    /// shift forward by the paused span, so pausing never eats into the
    /// hold, the start grace, or the auto-stop grace.
    pub fn resume(&mut self, now: TimestampMs) -> Option<SessionEvent> {
        if self.phase != SessionPhase::Paused {
            return None;
        }
        let paused = self.paused_at.take()?;
        let span_ms = now.millis_since(paused);
        self.timer_epoch = self.timer_epoch.map(|t| t.advanced_by(span_ms));
        self.timer_starts_at = self.timer_starts_at.map(|t| t.advanced_by(span_ms));
        self.stop_deadline = self.stop_deadline.map(|t| t.advanced_by(span_ms));
        info!("session resumed");
        self.phase = SessionPhase::Active;
        self.failure.reset();
        Some(SessionEvent::Resumed)
    }

    /// Stop the session now (manual or voice stop). Returns the final
    /// report, or None when there is no session in progress.
    pub fn stop(&mut self, now: TimestampMs) -> Option<FinalReport> {
        if !self.phase.is_in_progress() {
            return None;
        }
        Some(self.finalize(now))
    }

    fn finalize(&mut self, now: TimestampMs) -> FinalReport {
        let duration = self.elapsed_secs(now);
        let report = aggregate(&self.samples, duration, self.stack_default);
        info!(
            duration_secs = duration,
            overall = report.overall_score,
            samples = report.sample_count,
            "session stopped"
        );
        self.phase = SessionPhase::Stopped;
        self.stop_deadline = None;
        self.timer_starts_at = None;
        report
    }
}
