//! Spoken Feedback
//!
//! Everything the user hears goes through a [`SpeechSink`] so the engine can
//! run against a real text-to-speech backend, a log stream, or a recording
//! sink in tests. The [`FeedbackDispatcher`] decides WHEN to speak: lifecycle
//! announcements cut through immediately, while elapsed-time callouts and
//! form corrections are throttled so the user is not talked over constantly.

pub mod commands;

use crate::analysis::AnalysisResult;
use crate::app::config::FeedbackConfig;
use crate::time::TimestampMs;
use tracing::info;

/// Spoken one-time positioning script, delivered when a body first appears.
pub const POSITIONING_SCRIPT: &str = "Place your phone on the ground in landscape mode, \
    leaning securely against an object. Position yourself sideways to the camera, not \
    facing it, so your whole body is visible. When you're ready, I'll start detecting \
    your plank and begin the timer.";

/// How urgently a message should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Output seam for spoken messages.
pub trait SpeechSink {
    fn speak(&mut self, message: &str, priority: Priority);
}

/// Sink that logs utterances instead of voicing them. Default for the CLI.
#[derive(Debug, Default)]
pub struct TracingSpeech;

impl SpeechSink for TracingSpeech {
    fn speak(&mut self, message: &str, priority: Priority) {
        info!(?priority, "voice: {}", message);
    }
}

/// Sink that records utterances for assertions.
#[derive(Debug, Default)]
pub struct MemorySpeech {
    pub utterances: Vec<(String, Priority)>,
}

impl MemorySpeech {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spoke(&self, fragment: &str) -> bool {
        self.utterances.iter().any(|(m, _)| m.contains(fragment))
    }
}

impl SpeechSink for MemorySpeech {
    fn speak(&mut self, message: &str, priority: Priority) {
        self.utterances.push((message.to_string(), priority));
    }
}

/// Decides when routine speech is allowed to fire.
pub struct FeedbackDispatcher {
    config: FeedbackConfig,
    red_zone: u8,
    positioning_given: bool,
    last_announcement: Option<TimestampMs>,
    last_callout_secs: Option<u64>,
    last_correction: Option<TimestampMs>,
}

impl FeedbackDispatcher {
    pub fn new(config: FeedbackConfig, red_zone: u8) -> Self {
        Self {
            config,
            red_zone,
            positioning_given: false,
            last_announcement: None,
            last_callout_secs: None,
            last_correction: None,
        }
    }

    /// Speak the positioning script, once per dispatcher lifetime.
    pub fn positioning_hint(&mut self, sink: &mut dyn SpeechSink) {
        if self.positioning_given {
            return;
        }
        self.positioning_given = true;
        sink.speak(POSITIONING_SCRIPT, Priority::High);
    }

    /// High-priority lifecycle announcement. Bypasses all throttles but
    /// suppresses the next callout for the announcement gap.
    pub fn announce(&mut self, sink: &mut dyn SpeechSink, message: &str, now: TimestampMs) {
        self.last_announcement = Some(now);
        sink.speak(message, Priority::High);
    }

    /// Routine per-sample feedback: elapsed-time callouts on round
    /// boundaries while the timer runs, and the single most critical form
    /// correction when the overall score is in the red zone.
    pub fn on_sample(
        &mut self,
        sink: &mut dyn SpeechSink,
        result: &AnalysisResult,
        elapsed_secs: u64,
        timer_running: bool,
        now: TimestampMs,
    ) {
        if timer_running {
            self.maybe_callout(sink, elapsed_secs, now);
        }
        self.maybe_correction(sink, result, now);
    }

    fn maybe_callout(&mut self, sink: &mut dyn SpeechSink, elapsed_secs: u64, now: TimestampMs) {
        if elapsed_secs == 0 || elapsed_secs % self.config.callout_period_secs != 0 {
            return;
        }
        // The same boundary can be observed by several samples
        if self.last_callout_secs == Some(elapsed_secs) {
            return;
        }
        // Keep clear of recent announcements
        if let Some(last) = self.last_announcement {
            if now.millis_since(last) < self.config.announcement_gap_ms {
                return;
            }
        }

        self.last_callout_secs = Some(elapsed_secs);
        self.last_announcement = Some(now);
        let message = format!("{} completed. Keep holding!", format_elapsed(elapsed_secs));
        sink.speak(&message, Priority::Medium);
    }

    fn maybe_correction(
        &mut self,
        sink: &mut dyn SpeechSink,
        result: &AnalysisResult,
        now: TimestampMs,
    ) {
        if !result.is_critical(self.red_zone) || result.feedback.is_empty() {
            return;
        }
        if let Some(last) = self.last_correction {
            if now.millis_since(last) < self.config.critical_gap_ms {
                return;
            }
        }
        self.last_correction = Some(now);
        sink.speak(&result.feedback[0], Priority::Medium);
    }
}

/// "2 minutes 5 seconds", "1 minute", "30 seconds".
fn format_elapsed(secs: u64) -> String {
    let minutes = secs / 60;
    let seconds = secs % 60;
    let plural = |n: u64| if n == 1 { "" } else { "s" };

    if minutes > 0 {
        if seconds > 0 {
            format!(
                "{} minute{} {} second{}",
                minutes,
                plural(minutes),
                seconds,
                plural(seconds)
            )
        } else {
            format!("{} minute{}", minutes, plural(minutes))
        }
    } else {
        format!("{} second{}", seconds, plural(seconds))
    }
}
