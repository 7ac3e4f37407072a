//! Coaching Runner
//!
//! Top-level orchestration: owns the session state machine and translates
//! its events into speech, persistence and telemetry. The three outward
//! surfaces are injected as traits so the runner itself stays synchronous
//! and fully testable.

use crate::analysis::PlankVariant;
use crate::app::config::Config;
use crate::feedback::commands::{CommandListener, TranscriptEvent, VoiceCommand};
use crate::feedback::{FeedbackDispatcher, SpeechSink};
use crate::pose::LandmarkFrame;
use crate::session::report::FinalReport;
use crate::session::state::SessionContext;
use crate::session::store::SessionStore;
use crate::session::{SessionEvent, SessionPhase};
use crate::telemetry::{TelemetryBroadcaster, TelemetryChannel};
use crate::time::TimestampMs;
use chrono::Utc;
use tracing::{debug, error, warn};
use uuid::Uuid;

pub struct CoachingRunner<S, C, P>
where
    S: SpeechSink,
    C: TelemetryChannel,
    P: SessionStore,
{
    context: SessionContext,
    dispatcher: FeedbackDispatcher,
    broadcaster: TelemetryBroadcaster<C>,
    listener: CommandListener,
    speech: S,
    store: P,
    session_id: Option<Uuid>,
    last_report: Option<FinalReport>,
    /// Set when the pose engine cannot be brought up. Terminal.
    unavailable: bool,
}

impl<S, C, P> CoachingRunner<S, C, P>
where
    S: SpeechSink,
    C: TelemetryChannel,
    P: SessionStore,
{
    /// Build a runner and start waiting for a body to appear.
    pub fn new(config: Config, speech: S, channel: C, store: P) -> Self {
        let mut context = SessionContext::new(&config);
        context.begin();
        Self {
            dispatcher: FeedbackDispatcher::new(config.feedback.clone(), config.session.red_zone),
            broadcaster: TelemetryBroadcaster::new(channel, &config.telemetry),
            context,
            listener: CommandListener::new(),
            speech,
            store,
            session_id: None,
            last_report: None,
            unavailable: false,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.context.phase()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn last_report(&self) -> Option<&FinalReport> {
        self.last_report.as_ref()
    }

    pub fn is_unavailable(&self) -> bool {
        self.unavailable
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    pub fn speech(&self) -> &S {
        &self.speech
    }

    /// Enter the terminal no-analysis state (pose engine failed to start).
    /// Frames and transcripts are ignored from here on.
    pub fn mark_analysis_unavailable(&mut self, reason: &str) {
        if !self.unavailable {
            error!(reason, "analysis unavailable, coaching disabled");
            self.unavailable = true;
        }
    }

    /// Feed one landmark frame from the pose engine.
    pub fn on_frame(&mut self, frame: &LandmarkFrame, now: TimestampMs) {
        if self.unavailable {
            return;
        }
        if !frame.is_empty() {
            self.dispatcher.positioning_hint(&mut self.speech);
        }
        let events = self.context.tick(frame, now);
        self.handle_events(events, now);
    }

    /// Advance pending deadlines when no frames are arriving.
    pub fn poll(&mut self, now: TimestampMs) {
        if self.unavailable {
            return;
        }
        let events = self.context.poll(now);
        self.handle_events(events, now);
    }

    /// Feed one speech-recognition transcript.
    pub fn on_transcript(&mut self, event: &TranscriptEvent, now: TimestampMs) {
        if self.unavailable {
            return;
        }
        if self.listener.interpret(event) == Some(VoiceCommand::Stop) {
            debug!("voice stop command accepted");
            self.stop(now);
        }
    }

    /// Report a microphone permission denial; voice control stays off for
    /// the rest of the session.
    pub fn on_microphone_denied(&mut self) {
        self.listener.on_permission_denied();
    }

    pub fn pause(&mut self, now: TimestampMs) {
        if let Some(event) = self.context.pause(now) {
            self.handle_events(vec![event], now);
        }
    }

    pub fn resume(&mut self, now: TimestampMs) {
        if let Some(event) = self.context.resume(now) {
            self.handle_events(vec![event], now);
        }
    }

    /// Stop the session (manual or voice). Returns the final report when a
    /// session was actually in progress.
    pub fn stop(&mut self, now: TimestampMs) -> Option<FinalReport> {
        let report = self.context.stop(now)?;
        self.finish(report.clone(), now);
        Some(report)
    }

    fn handle_events(&mut self, events: Vec<SessionEvent>, now: TimestampMs) {
        for event in events {
            match event {
                SessionEvent::DetectionStarted => {
                    debug!("plank detected, identifying variant");
                }
                SessionEvent::VariantIdentified(variant) => {
                    let message = match variant {
                        PlankVariant::High => "High plank identified",
                        _ => "Elbow plank identified",
                    };
                    self.dispatcher.announce(&mut self.speech, message, now);
                    match self.store.create_session(variant, Utc::now()) {
                        Ok(id) => self.session_id = Some(id),
                        Err(e) => {
                            // Coaching continues; only persistence is lost
                            error!(error = %e, "failed to create session record");
                        }
                    }
                }
                SessionEvent::TimerStarted => {
                    self.dispatcher.announce(&mut self.speech, "Timer started", now);
                    if self.listener.is_enabled() {
                        self.dispatcher.announce(
                            &mut self.speech,
                            "Say stop to end your session",
                            now,
                        );
                    }
                }
                SessionEvent::Paused => {
                    self.dispatcher.announce(&mut self.speech, "Session paused", now);
                }
                SessionEvent::Resumed => {
                    self.dispatcher.announce(&mut self.speech, "Session resumed", now);
                }
                SessionEvent::FormBroken => {
                    self.dispatcher
                        .announce(&mut self.speech, "Form broken - session ending", now);
                }
                SessionEvent::Stopped(report) => {
                    self.finish(report, now);
                }
                SessionEvent::Sample(result) => {
                    self.dispatcher.on_sample(
                        &mut self.speech,
                        &result,
                        self.context.elapsed_secs(now),
                        self.context.timer_running(),
                        now,
                    );
                    if let Some(id) = self.session_id {
                        self.broadcaster.send_analysis(id, &result, now);
                        if let Err(e) = self.store.append_analysis(id, &result) {
                            warn!(error = %e, "failed to record analysis row");
                        }
                    }
                }
            }
        }
    }

    fn finish(&mut self, report: FinalReport, now: TimestampMs) {
        if self.last_report.is_some() {
            return;
        }
        self.dispatcher.announce(&mut self.speech, "Session completed", now);
        if let Some(id) = self.session_id {
            if let Err(e) = self.store.finalize_session(id, &report, Utc::now()) {
                // The report stays available to the caller regardless
                warn!(error = %e, "failed to finalize session record");
            }
        }
        self.last_report = Some(report);
    }
}
