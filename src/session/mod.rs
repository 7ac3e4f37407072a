//! Coaching Session Lifecycle
//!
//! The session moves through a fixed phase sequence driven entirely by
//! analyzed frames and caller-supplied timestamps. Emitted [`SessionEvent`]s
//! are the only outward signal; the state machine itself never speaks,
//! persists, or transmits anything.

pub mod report;
pub mod state;
pub mod store;
pub mod trackers;

use crate::analysis::{AnalysisResult, PlankVariant};
use report::FinalReport;
use serde::{Deserialize, Serialize};

/// Lifecycle phase of a coaching session.
///
/// ```text
/// Idle -> Detecting -> Identifying -> Active <-> Paused
///                                        \________/
///                                            v
///                                         Stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// Session not started
    Idle,
    /// Waiting for a recognizable plank to appear in frame
    Detecting,
    /// Plank seen, waiting for the variant to hold steady
    Identifying,
    /// Session in progress
    Active,
    /// Timer frozen, analysis continues
    Paused,
    /// Terminal; the final report has been produced
    Stopped,
}

impl SessionPhase {
    /// Whether the session is past identification and not yet stopped.
    pub fn is_in_progress(self) -> bool {
        matches!(self, SessionPhase::Active | SessionPhase::Paused)
    }
}

/// Observable session transitions, in the order they occurred within a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A recognizable plank entered the frame for the first time
    DetectionStarted,
    /// A plank variant held steady long enough to commit to
    VariantIdentified(PlankVariant),
    /// The hold timer began counting (after the start grace)
    TimerStarted,
    Paused,
    Resumed,
    /// Form degraded long enough to end the session; the stop follows
    /// after a short grace
    FormBroken,
    /// Terminal. Carries the aggregated report.
    Stopped(FinalReport),
    /// One analyzed frame passed the rate limiter
    Sample(AnalysisResult),
}
