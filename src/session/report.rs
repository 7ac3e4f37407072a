//! Final Report Aggregation
//!
//! Collapses the buffered per-frame samples of a finished session into one
//! set of averages. Zero-valued criterion samples mean "that criterion was
//! not measurable in this frame" and are excluded from the mean rather than
//! dragging it down.

use crate::analysis::{AnalysisResult, PlankVariant};
use serde::{Deserialize, Serialize};

/// Aggregated outcome of a stopped session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalReport {
    pub variant: PlankVariant,
    pub body_alignment_score: u8,
    pub knee_position_score: u8,
    pub shoulder_stack_score: u8,
    pub overall_score: u8,
    pub duration_secs: u64,
    pub sample_count: usize,
}

/// Mean of the nonzero values, rounded; `default` when none qualify.
fn nonzero_mean(samples: &[AnalysisResult], pick: fn(&AnalysisResult) -> u8, default: u8) -> u8 {
    let values: Vec<u16> = samples
        .iter()
        .map(pick)
        .filter(|&v| v > 0)
        .map(u16::from)
        .collect();
    if values.is_empty() {
        default
    } else {
        let sum: u32 = values.iter().map(|&v| u32::from(v)).sum();
        ((sum as f64 / values.len() as f64).round()) as u8
    }
}

/// Aggregate buffered samples into a [`FinalReport`].
///
/// `stack_default` fills the shoulder-stack average when no frame ever
/// measured it; alignment and knee default to zero in that case. The overall
/// average prefers real per-frame overalls and only falls back to the mean
/// of the three criterion averages when no frame carried one.
pub fn aggregate(
    samples: &[AnalysisResult],
    duration_secs: u64,
    stack_default: u8,
) -> FinalReport {
    let alignment = nonzero_mean(samples, |s| s.body_alignment_score, 0);
    let knee = nonzero_mean(samples, |s| s.knee_position_score, 0);
    let stack = nonzero_mean(samples, |s| s.shoulder_stack_score, stack_default);

    let derived =
        ((f64::from(alignment) + f64::from(knee) + f64::from(stack)) / 3.0).round() as u8;
    let overall = nonzero_mean(samples, |s| s.overall_score, derived);

    let variant = samples
        .last()
        .map(|s| s.variant)
        .unwrap_or(PlankVariant::Unknown);

    FinalReport {
        variant,
        body_alignment_score: alignment,
        knee_position_score: knee,
        shoulder_stack_score: stack,
        overall_score: overall,
        duration_secs,
        sample_count: samples.len(),
    }
}
