//! Millisecond Monotonic Timestamps
//!
//! All session timers (elapsed time, stability window, failure window,
//! feedback throttles) are derived from wall-clock snapshots compared against
//! stored epoch timestamps, never from counted ticks. That keeps the state
//! machine correct across pauses and variable frame rates, and makes every
//! timer deterministic under test: callers pass timestamps in explicitly.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// A monotonic timestamp in milliseconds since an arbitrary epoch.
///
/// Stored as a plain integer so it serializes compactly and so synthetic
/// timestamps can be constructed directly in tests and replay files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimestampMs(u64);

impl TimestampMs {
    /// Create a timestamp from raw milliseconds.
    #[inline]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Get the raw millisecond value.
    #[inline]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since an earlier timestamp.
    /// Returns 0 if `earlier` is in the future (monotonicity violation).
    #[inline]
    pub fn millis_since(&self, earlier: TimestampMs) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Whole seconds elapsed since an earlier timestamp.
    #[inline]
    pub fn secs_since(&self, earlier: TimestampMs) -> u64 {
        self.millis_since(earlier) / 1_000
    }

    /// A timestamp `millis` later than this one.
    #[inline]
    pub fn advanced_by(&self, millis: u64) -> TimestampMs {
        Self(self.0 + millis)
    }

    /// Check if this timestamp is at or after another.
    #[inline]
    pub fn is_at_or_after(&self, other: TimestampMs) -> bool {
        self.0 >= other.0
    }
}

impl Serialize for TimestampMs {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for TimestampMs {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(TimestampMs(millis))
    }
}

/// Monotonic clock anchored at construction time.
///
/// The live pipeline creates one of these when the camera opens and stamps
/// every incoming frame with `now()`. Replay and tests bypass it entirely.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    /// Create a clock anchored at the current instant.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// Milliseconds since the clock was started.
    #[inline]
    pub fn now(&self) -> TimestampMs {
        TimestampMs(self.epoch.elapsed().as_millis() as u64)
    }
}
