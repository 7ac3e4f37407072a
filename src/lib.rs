//! # Plank Coach
//!
//! A real-time exercise-form analysis and coaching engine. The library
//! consumes a stream of body-landmark frames produced by an external
//! pose-estimation engine, computes joint angles and per-criterion form
//! scores, classifies the plank variant being held, and drives a coaching
//! session through its lifecycle with spoken feedback and live telemetry.
//!
//! ## Quick Start
//!
//! ```no_run
//! use plank_coach::app::config::Config;
//! use plank_coach::coaching::CoachingRunner;
//! use plank_coach::feedback::TracingSpeech;
//! use plank_coach::pose::LandmarkFrame;
//! use plank_coach::session::store::InMemorySessionStore;
//! use plank_coach::telemetry::NullChannel;
//! use plank_coach::time::TimestampMs;
//!
//! let config = Config::default();
//! let mut runner = CoachingRunner::new(
//!     config,
//!     TracingSpeech::default(),
//!     NullChannel,
//!     InMemorySessionStore::new(),
//! );
//!
//! // ... feed frames from the pose engine ...
//! let frame = LandmarkFrame::empty(TimestampMs::from_millis(0));
//! runner.on_frame(&frame, TimestampMs::from_millis(0));
//! ```
//!
//! ## Architecture
//!
//! The system is organized into the following modules:
//!
//! - [`pose`]: Landmark frame types, geometry math, lock-free frame intake
//! - [`analysis`]: Variant classification and per-criterion scoring
//! - [`session`]: Lifecycle state machine, stability/failure trackers,
//!   report aggregation, session persistence seam
//! - [`feedback`]: Throttled spoken feedback and voice commands
//! - [`telemetry`]: Fire-and-forget analysis mirroring with backoff reconnect
//! - [`coaching`]: High-level runner wiring the pieces together
//! - [`time`]: Millisecond monotonic timestamps
//! - [`app`]: CLI and configuration management
//!
//! ## Analysis Pipeline
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │ Pose Engine │───▶│ Frame Ring  │───▶│   Scoring   │───▶│   Session   │
//! │ (external)  │    │ (lock-free) │    │  & Variant  │    │ State Mach. │
//! └─────────────┘    └─────────────┘    └─────────────┘    └─────────────┘
//!                                                                 │
//!                          ┌──────────────┬───────────────────────┤
//!                          ▼              ▼                       ▼
//!                    ┌───────────┐  ┌───────────┐          ┌───────────┐
//!                    │  Feedback │  │ Telemetry │          │  Report   │
//!                    │ Dispatcher│  │ Broadcast │          │ Aggregator│
//!                    └───────────┘  └───────────┘          └───────────┘
//! ```

pub mod time;
pub mod pose;
pub mod analysis;
pub mod session;
pub mod feedback;
pub mod telemetry;
pub mod coaching;
pub mod app;

// Re-export commonly used types
pub use analysis::{AnalysisResult, PlankVariant};
pub use pose::{Landmark, LandmarkFrame};
pub use session::state::SessionContext;
pub use session::SessionPhase;
pub use time::TimestampMs;

/// Result type alias for the coaching engine
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the coaching engine
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Persistence error: {0}")]
    Store(String),

    #[error("Telemetry error: {0}")]
    Telemetry(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
