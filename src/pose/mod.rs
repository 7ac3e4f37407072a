//! Pose Landmark Types
//!
//! Defines the fundamental data structures flowing through the analysis
//! pipeline: individual landmarks, whole-body frames, and the fixed 33-point
//! body-part enumeration used to index them. Frames are produced by an
//! external pose-estimation engine and are never persisted by this core.

pub mod frame_buffer;
pub mod geometry;

use crate::time::TimestampMs;
use serde::{Deserialize, Serialize};

/// Number of landmarks in a full-body frame.
pub const LANDMARK_COUNT: usize = 33;

/// Body parts in frame order.
///
/// The discriminants are the landmark indices emitted by the pose engine;
/// `Landmark` lookups go through this enum rather than raw indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum BodyPart {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyPart {
    /// Landmark index of this body part within a frame.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Body side used for single-side angle analysis.
///
/// Plank form is evaluated from a side-on camera view, so each tick works
/// with whichever side the camera sees better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodySide {
    Left,
    Right,
}

impl BodySide {
    pub fn shoulder(self) -> BodyPart {
        match self {
            BodySide::Left => BodyPart::LeftShoulder,
            BodySide::Right => BodyPart::RightShoulder,
        }
    }

    pub fn elbow(self) -> BodyPart {
        match self {
            BodySide::Left => BodyPart::LeftElbow,
            BodySide::Right => BodyPart::RightElbow,
        }
    }

    pub fn wrist(self) -> BodyPart {
        match self {
            BodySide::Left => BodyPart::LeftWrist,
            BodySide::Right => BodyPart::RightWrist,
        }
    }

    pub fn hip(self) -> BodyPart {
        match self {
            BodySide::Left => BodyPart::LeftHip,
            BodySide::Right => BodyPart::RightHip,
        }
    }

    pub fn knee(self) -> BodyPart {
        match self {
            BodySide::Left => BodyPart::LeftKnee,
            BodySide::Right => BodyPart::RightKnee,
        }
    }

    pub fn ankle(self) -> BodyPart {
        match self {
            BodySide::Left => BodyPart::LeftAnkle,
            BodySide::Right => BodyPart::RightAnkle,
        }
    }
}

/// One tracked body point in normalized image space.
///
/// `x`/`y` are normalized to [0,1] relative to the frame; `z` is a relative
/// depth estimate; `visibility` is the engine's confidence in [0,1]. The
/// engine omits `z` and `visibility` for some points, so both default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
    pub visibility: Option<f64>,
}

impl Landmark {
    /// Create a landmark at a position with a visibility confidence.
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            visibility: Some(visibility),
        }
    }

    /// Visibility confidence, treating a missing value as zero.
    #[inline]
    pub fn visibility_or_zero(&self) -> f64 {
        self.visibility.unwrap_or(0.0)
    }

    /// Check whether the landmark meets a visibility threshold.
    #[inline]
    pub fn is_visible(&self, threshold: f64) -> bool {
        self.visibility_or_zero() >= threshold
    }
}

/// An ordered full-body landmark set captured at one instant.
///
/// Arrives at camera frame-rate; the session state machine samples it at a
/// fixed analysis interval and discards intermediate frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandmarkFrame {
    /// Monotonic capture timestamp.
    pub timestamp_ms: TimestampMs,
    /// Landmarks indexed by [`BodyPart`]. May be empty (nobody in frame).
    pub landmarks: Vec<Landmark>,
}

impl LandmarkFrame {
    /// Create a frame from a full landmark set.
    pub fn new(timestamp_ms: TimestampMs, landmarks: Vec<Landmark>) -> Self {
        Self {
            timestamp_ms,
            landmarks,
        }
    }

    /// Create an empty frame (no body detected).
    pub fn empty(timestamp_ms: TimestampMs) -> Self {
        Self {
            timestamp_ms,
            landmarks: Vec::new(),
        }
    }

    /// Get the landmark for a body part, if the frame carries one.
    #[inline]
    pub fn get(&self, part: BodyPart) -> Option<&Landmark> {
        self.landmarks.get(part.index())
    }

    /// Visibility for a body part, zero when absent.
    #[inline]
    pub fn visibility(&self, part: BodyPart) -> f64 {
        self.get(part).map(Landmark::visibility_or_zero).unwrap_or(0.0)
    }

    /// Check whether every listed part meets the visibility threshold.
    pub fn all_visible(&self, parts: &[BodyPart], threshold: f64) -> bool {
        parts
            .iter()
            .all(|&p| self.get(p).map(|l| l.is_visible(threshold)).unwrap_or(false))
    }

    /// Check if the frame carries no landmarks at all.
    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}
