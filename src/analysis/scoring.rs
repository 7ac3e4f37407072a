//! Per-Criterion Form Scoring
//!
//! Turns one landmark frame into an [`AnalysisResult`]: three joint angles,
//! three 0-100 criterion scores, and ordered correction messages. Each
//! criterion gates on landmark visibility independently; an occluded
//! criterion falls back to a neutral score instead of dragging the overall
//! to zero, so one hidden joint never fails a session on its own.

use super::{classifier, AnalysisResult, PlankVariant};
use crate::app::config::{AnalysisConfig, Config, ScoringConfig};
use crate::pose::{geometry, LandmarkFrame};
use tracing::trace;

/// Hip-sag correction.
pub const MSG_RAISE_HIPS: &str = "Raise your hips";
/// Piked-hips correction.
pub const MSG_LOWER_HIPS: &str = "Lower your hips";
/// Torso occluded.
pub const MSG_BODY_NOT_VISIBLE: &str = "Can't see your body clearly. Try better lighting.";
/// Bent-knee correction.
pub const MSG_STRAIGHTEN_LEGS: &str = "Straighten your legs";
/// Legs occluded.
pub const MSG_LEGS_NOT_VISIBLE: &str = "Can't see your legs clearly. Adjust position.";
/// Shoulder drifted off the wrist (straight-arm plank).
pub const MSG_HANDS_UNDER_SHOULDERS: &str = "Keep hands under shoulders";
/// Shoulder drifted off the elbow (forearm plank).
pub const MSG_ELBOWS_UNDER_SHOULDERS: &str = "Keep elbows under shoulders";

/// Stateless frame scorer. Cheap to construct, holds only configuration.
#[derive(Debug, Clone)]
pub struct PoseScorer {
    analysis: AnalysisConfig,
    scoring: ScoringConfig,
}

impl PoseScorer {
    pub fn new(config: &Config) -> Self {
        Self {
            analysis: config.analysis.clone(),
            scoring: config.scoring.clone(),
        }
    }

    /// Score a single frame.
    ///
    /// An empty frame (no body detected) yields the zeroed default result,
    /// which downstream consumers treat as "no analysis".
    pub fn analyze(&self, frame: &LandmarkFrame) -> AnalysisResult {
        if frame.is_empty() {
            return AnalysisResult::default();
        }

        let threshold = self.analysis.visibility_threshold;
        let variant = classifier::classify_variant(frame, &self.analysis);
        let side = classifier::better_side(frame);

        let mut feedback = Vec::new();

        // Body alignment: shoulder-hip-ankle, straight body is 180.
        let mut alignment_angle = 0.0;
        let mut alignment_score = f64::from(self.scoring.fallback_score);
        if frame.all_visible(&[side.shoulder(), side.hip(), side.ankle()], threshold) {
            let shoulder = frame.get(side.shoulder()).unwrap();
            let hip = frame.get(side.hip()).unwrap();
            let ankle = frame.get(side.ankle()).unwrap();

            alignment_angle = geometry::angle_between(shoulder, hip, ankle);
            let deviation = (alignment_angle - self.scoring.alignment_target).abs();
            alignment_score = if deviation <= self.scoring.alignment_tolerance {
                100.0
            } else {
                (100.0
                    - (deviation - self.scoring.alignment_tolerance)
                        * self.scoring.alignment_penalty_per_degree)
                    .max(0.0)
            };

            if alignment_angle < self.scoring.alignment_low_angle {
                feedback.push(MSG_RAISE_HIPS.to_string());
            } else if alignment_angle > self.scoring.alignment_high_angle {
                feedback.push(MSG_LOWER_HIPS.to_string());
            }
        } else {
            trace!(criterion = "body_alignment", "landmarks below visibility threshold");
            feedback.push(MSG_BODY_NOT_VISIBLE.to_string());
        }

        // Knee position: hip-knee-ankle, straight leg is 180, full score
        // from the target angle upward.
        let mut knee_angle = 0.0;
        let mut knee_score = f64::from(self.scoring.fallback_score);
        if frame.all_visible(&[side.hip(), side.knee(), side.ankle()], threshold) {
            let hip = frame.get(side.hip()).unwrap();
            let knee = frame.get(side.knee()).unwrap();
            let ankle = frame.get(side.ankle()).unwrap();

            knee_angle = geometry::angle_between(hip, knee, ankle);
            knee_score = if knee_angle >= self.scoring.knee_target {
                100.0
            } else {
                let deficit = self.scoring.knee_target - knee_angle;
                (100.0 - deficit * self.scoring.knee_penalty_per_degree).max(0.0)
            };

            if knee_angle < self.scoring.knee_target {
                feedback.push(MSG_STRAIGHTEN_LEGS.to_string());
            }
        } else {
            trace!(criterion = "knee_position", "landmarks below visibility threshold");
            feedback.push(MSG_LEGS_NOT_VISIBLE.to_string());
        }

        // Shoulder stack: shoulder over wrist in a straight-arm plank,
        // shoulder over elbow otherwise. Occlusion keeps the fallback
        // silently; there is no useful correction to give.
        let mut stack_angle = 0.0;
        let mut stack_score = f64::from(self.scoring.fallback_score);
        let base_joint = if variant == PlankVariant::High {
            side.wrist()
        } else {
            side.elbow()
        };
        if frame.all_visible(&[side.shoulder(), base_joint], threshold) {
            let shoulder = frame.get(side.shoulder()).unwrap();
            let base = frame.get(base_joint).unwrap();

            let offset = geometry::horizontal_offset(shoulder, base);
            stack_angle = geometry::stack_angle(shoulder, base);
            stack_score = if offset < self.scoring.stack_excellent_offset {
                100.0
            } else if offset < self.scoring.stack_good_offset {
                80.0
            } else {
                60.0
            };

            let deviation = (stack_angle - self.scoring.stack_angle_target).abs();
            if deviation > self.scoring.stack_angle_tolerance {
                feedback.push(if variant == PlankVariant::High {
                    MSG_HANDS_UNDER_SHOULDERS.to_string()
                } else {
                    MSG_ELBOWS_UNDER_SHOULDERS.to_string()
                });
            }
        }

        let overall = (alignment_score + knee_score + stack_score) / 3.0;

        AnalysisResult {
            body_alignment_angle: alignment_angle,
            knee_angle,
            shoulder_stack_angle: stack_angle,
            body_alignment_score: alignment_score.round() as u8,
            knee_position_score: knee_score.round() as u8,
            shoulder_stack_score: stack_score.round() as u8,
            overall_score: overall.round() as u8,
            feedback,
            variant,
        }
    }
}
