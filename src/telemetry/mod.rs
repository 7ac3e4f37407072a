//! Live Analysis Telemetry
//!
//! Mirrors every analyzed sample to an external channel (the companion
//! dashboard) as a typed JSON envelope. Delivery is fire-and-forget: a lost
//! sample is worthless a frame later, so nothing is queued or retried. Only
//! the channel itself is repaired, with exponentially backed-off reconnect
//! attempts, and after too many failures telemetry degrades to a permanent
//! off state without touching the session.

use crate::analysis::AnalysisResult;
use crate::app::config::TelemetryConfig;
use crate::time::TimestampMs;
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

/// Envelope type tag for analysis samples.
pub const POSE_ANALYSIS_TYPE: &str = "pose_analysis";

/// Wire envelope for all telemetry traffic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub data: serde_json::Value,
}

impl Envelope {
    /// Wrap an analysis sample for a session.
    pub fn analysis(session_id: Uuid, result: &AnalysisResult) -> Result<Self> {
        Ok(Self {
            kind: POSE_ANALYSIS_TYPE.to_string(),
            session_id: session_id.to_string(),
            data: serde_json::to_value(result)?,
        })
    }
}

/// Transport seam. Implementations decide what a "connection" means.
pub trait TelemetryChannel {
    fn connect(&mut self) -> Result<()>;
    fn send(&mut self, envelope: &Envelope) -> Result<()>;
}

/// Channel that accepts and discards everything. Default for the CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullChannel;

impl TelemetryChannel for NullChannel {
    fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    fn send(&mut self, _envelope: &Envelope) -> Result<()> {
        Ok(())
    }
}

/// Exponential backoff schedule for reconnects.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    base_ms: u64,
    cap_ms: u64,
    max_attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(config: &TelemetryConfig) -> Self {
        Self {
            base_ms: config.backoff_base_ms,
            cap_ms: config.backoff_cap_ms,
            max_attempts: config.max_attempts,
        }
    }

    /// Delay before reconnect attempt `attempt` (zero-based), capped.
    pub fn delay_ms(&self, attempt: u32) -> u64 {
        self.base_ms
            .saturating_mul(1u64 << attempt.min(63))
            .min(self.cap_ms)
    }

    pub fn exhausted(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }
}

/// Channel health as seen by the broadcaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connected,
    /// Waiting out a backoff delay before reconnect attempt `attempt`
    Reconnecting { attempt: u32, retry_at: TimestampMs },
    /// All reconnect attempts spent; telemetry is off for good
    Failed,
}

/// Fire-and-forget sample mirror with self-healing transport.
pub struct TelemetryBroadcaster<C: TelemetryChannel> {
    channel: C,
    policy: ReconnectPolicy,
    state: ChannelState,
}

impl<C: TelemetryChannel> TelemetryBroadcaster<C> {
    pub fn new(channel: C, config: &TelemetryConfig) -> Self {
        Self {
            channel,
            policy: ReconnectPolicy::new(config),
            state: ChannelState::Connected,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Mirror one sample. Never fails the caller; a send error only moves
    /// the channel into reconnection.
    pub fn send_analysis(&mut self, session_id: Uuid, result: &AnalysisResult, now: TimestampMs) {
        self.service(now);
        if self.state != ChannelState::Connected {
            return;
        }

        let envelope = match Envelope::analysis(session_id, result) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "failed to encode telemetry envelope");
                return;
            }
        };

        if let Err(e) = self.channel.send(&envelope) {
            warn!(error = %e, "telemetry send failed, reconnecting");
            self.state = ChannelState::Reconnecting {
                attempt: 0,
                retry_at: now.advanced_by(self.policy.delay_ms(0)),
            };
        }
    }

    /// Advance reconnection when its backoff delay has elapsed.
    pub fn service(&mut self, now: TimestampMs) {
        let ChannelState::Reconnecting { attempt, retry_at } = self.state else {
            return;
        };
        if !now.is_at_or_after(retry_at) {
            return;
        }

        match self.channel.connect() {
            Ok(()) => {
                debug!(attempt, "telemetry channel reconnected");
                self.state = ChannelState::Connected;
            }
            Err(e) => {
                let next = attempt + 1;
                if self.policy.exhausted(next) {
                    warn!(error = %e, "telemetry reconnection abandoned");
                    self.state = ChannelState::Failed;
                } else {
                    debug!(error = %e, attempt = next, "telemetry reconnect failed, backing off");
                    self.state = ChannelState::Reconnecting {
                        attempt: next,
                        retry_at: now.advanced_by(self.policy.delay_ms(next)),
                    };
                }
            }
        }
    }
}

/// Decode an incoming envelope; anything but an analysis sample is ignored.
pub fn handle_incoming(envelope: &Envelope) -> Option<AnalysisResult> {
    if envelope.kind != POSE_ANALYSIS_TYPE {
        debug!(kind = %envelope.kind, "ignoring unknown telemetry envelope");
        return None;
    }
    serde_json::from_value(envelope.data.clone()).ok()
}
