//! Form Analysis Types
//!
//! Output types for the per-frame analysis step. One [`AnalysisResult`] is
//! produced per analysis tick and flows to the session state machine, the
//! feedback dispatcher, and the telemetry channel. Field names serialize in
//! camelCase so the wire format matches the companion dashboard.

pub mod classifier;
pub mod scoring;

use serde::{Deserialize, Serialize};
use std::fmt;

/// The plank variant being held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlankVariant {
    /// Straight-arm plank (shoulder-elbow-wrist near 180 degrees)
    High,
    /// Forearm plank (shoulder-elbow-wrist near 90 degrees)
    Elbow,
    /// Arm not visible enough, or the angle falls between the bands
    #[default]
    Unknown,
}

impl PlankVariant {
    /// Whether a concrete variant has been recognized.
    pub fn is_known(self) -> bool {
        !matches!(self, PlankVariant::Unknown)
    }
}

impl fmt::Display for PlankVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlankVariant::High => write!(f, "high"),
            PlankVariant::Elbow => write!(f, "elbow"),
            PlankVariant::Unknown => write!(f, "unknown"),
        }
    }
}

/// Per-frame form analysis: three measured angles, three 0-100 criterion
/// scores, a rounded overall, and user-facing correction messages.
///
/// A zeroed default result (overall 0, unknown variant) means "no analysis
/// possible for this frame".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Shoulder-hip-ankle angle in degrees (180 is a straight body line)
    pub body_alignment_angle: f64,
    /// Hip-knee-ankle angle in degrees (180 is a straight leg)
    pub knee_angle: f64,
    /// Shoulder-over-wrist (or elbow) stacking angle in degrees
    pub shoulder_stack_angle: f64,
    pub body_alignment_score: u8,
    pub knee_position_score: u8,
    pub shoulder_stack_score: u8,
    /// Rounded mean of the three criterion scores
    pub overall_score: u8,
    /// Correction messages, worst problem first
    pub feedback: Vec<String>,
    #[serde(rename = "plankType")]
    pub variant: PlankVariant,
}

impl AnalysisResult {
    /// Whether this result carries any usable analysis.
    pub fn has_analysis(&self) -> bool {
        self.overall_score > 0
    }

    /// Whether the form is in the red zone for a given threshold.
    pub fn is_critical(&self, red_zone: u8) -> bool {
        self.has_analysis() && self.overall_score < red_zone
    }
}
