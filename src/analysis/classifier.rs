//! Side Selection & Variant Classification
//!
//! The camera sees one side of the body better than the other, and which side
//! that is can differ between the torso and the arm when the user faces
//! slightly away. Scoring therefore picks its side from torso visibility
//! while variant classification picks its side from arm visibility.

use super::PlankVariant;
use crate::app::config::AnalysisConfig;
use crate::pose::{geometry, BodySide, LandmarkFrame};

/// Side whose torso landmarks (shoulder, hip, knee, ankle) are better
/// visible. Ties go to the right side.
pub fn better_side(frame: &LandmarkFrame) -> BodySide {
    let left = frame.visibility(BodySide::Left.shoulder())
        + frame.visibility(BodySide::Left.hip())
        + frame.visibility(BodySide::Left.knee())
        + frame.visibility(BodySide::Left.ankle());
    let right = frame.visibility(BodySide::Right.shoulder())
        + frame.visibility(BodySide::Right.hip())
        + frame.visibility(BodySide::Right.knee())
        + frame.visibility(BodySide::Right.ankle());

    if left > right {
        BodySide::Left
    } else {
        BodySide::Right
    }
}

/// Side whose arm landmarks (shoulder, elbow, wrist) are better visible.
/// Ties go to the right side.
pub fn better_arm_side(frame: &LandmarkFrame) -> BodySide {
    let left = frame.visibility(BodySide::Left.shoulder())
        + frame.visibility(BodySide::Left.elbow())
        + frame.visibility(BodySide::Left.wrist());
    let right = frame.visibility(BodySide::Right.shoulder())
        + frame.visibility(BodySide::Right.elbow())
        + frame.visibility(BodySide::Right.wrist());

    if left > right {
        BodySide::Left
    } else {
        BodySide::Right
    }
}

/// Classify the plank variant from the better visible arm's elbow angle.
///
/// All three arm landmarks must meet the visibility threshold; otherwise the
/// variant is [`PlankVariant::Unknown`]. An arm angle between the two bands
/// (a half-bent arm) is also Unknown rather than being forced into either.
pub fn classify_variant(frame: &LandmarkFrame, config: &AnalysisConfig) -> PlankVariant {
    let side = better_arm_side(frame);
    let parts = [side.shoulder(), side.elbow(), side.wrist()];
    if !frame.all_visible(&parts, config.visibility_threshold) {
        return PlankVariant::Unknown;
    }

    // all_visible guarantees the landmarks exist
    let shoulder = frame.get(side.shoulder()).unwrap();
    let elbow = frame.get(side.elbow()).unwrap();
    let wrist = frame.get(side.wrist()).unwrap();

    let arm_angle = geometry::angle_between(shoulder, elbow, wrist);

    let (high_lo, high_hi) = config.high_band_degrees;
    let (elbow_lo, elbow_hi) = config.elbow_band_degrees;

    if (high_lo..=high_hi).contains(&arm_angle) {
        PlankVariant::High
    } else if (elbow_lo..=elbow_hi).contains(&arm_angle) {
        PlankVariant::Elbow
    } else {
        PlankVariant::Unknown
    }
}
