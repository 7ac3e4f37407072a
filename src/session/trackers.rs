//! Stability & Failure Windows
//!
//! Two small epoch-based trackers. Both store the timestamp at which a
//! condition began and compare against caller-supplied "now" values, so a
//! burst of late frames cannot shorten or stretch a window.

use crate::analysis::{AnalysisResult, PlankVariant};
use crate::app::config::SessionConfig;
use crate::time::TimestampMs;
use tracing::debug;

/// Tracks how long a recognizable plank variant has been held with
/// acceptable form quality. Used to gate variant identification so a single
/// lucky frame cannot start a session.
#[derive(Debug)]
pub struct StabilityTracker {
    window_ms: u64,
    quality_floor: u8,
    held: Option<(PlankVariant, TimestampMs)>,
}

impl StabilityTracker {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            window_ms: config.stability_window_ms,
            quality_floor: config.quality_floor,
            held: None,
        }
    }

    /// Whether a frame can contribute to the stability window: a known
    /// variant with both body-line scores at or above the quality floor.
    pub fn qualifies(&self, result: &AnalysisResult) -> bool {
        result.variant.is_known()
            && result.body_alignment_score >= self.quality_floor
            && result.knee_position_score >= self.quality_floor
    }

    /// Feed one analyzed frame. The window restarts when the variant
    /// changes, becomes unknown, or either body-line score drops below the
    /// quality floor.
    pub fn observe(&mut self, result: &AnalysisResult, now: TimestampMs) {
        if !self.qualifies(result) {
            if self.held.is_some() {
                debug!(variant = %result.variant, "stability window reset");
            }
            self.held = None;
            return;
        }

        match self.held {
            Some((variant, _)) if variant == result.variant => {}
            _ => self.held = Some((result.variant, now)),
        }
    }

    /// The variant that has been held for the full window, if any.
    pub fn stable_variant(&self, now: TimestampMs) -> Option<PlankVariant> {
        self.held.and_then(|(variant, since)| {
            (now.millis_since(since) >= self.window_ms).then_some(variant)
        })
    }

    pub fn reset(&mut self) {
        self.held = None;
    }
}

/// Tracks sustained form collapse: at least two of the three criterion
/// scores in the red zone, continuously for the failure window. Any
/// healthier frame resets the streak.
#[derive(Debug)]
pub struct FailureTracker {
    window_ms: u64,
    red_zone: u8,
    degraded_since: Option<TimestampMs>,
}

impl FailureTracker {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            window_ms: config.failure_window_ms,
            red_zone: config.red_zone,
            degraded_since: None,
        }
    }

    /// Feed one analyzed frame. Returns true once degradation has been
    /// sustained for the full window.
    pub fn observe(&mut self, result: &AnalysisResult, now: TimestampMs) -> bool {
        let red_count = [
            result.body_alignment_score,
            result.knee_position_score,
            result.shoulder_stack_score,
        ]
        .iter()
        .filter(|&&score| score < self.red_zone)
        .count();

        if red_count < 2 {
            self.degraded_since = None;
            return false;
        }

        match self.degraded_since {
            None => {
                debug!(red_count, "form degradation started");
                self.degraded_since = Some(now);
                false
            }
            Some(since) => now.millis_since(since) >= self.window_ms,
        }
    }

    pub fn reset(&mut self) {
        self.degraded_since = None;
    }
}
