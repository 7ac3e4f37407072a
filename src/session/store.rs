//! Session Persistence Seam
//!
//! A session record is created the moment a variant is identified and
//! finalized exactly once at stop. Persistence goes through the
//! [`SessionStore`] trait so the engine never cares whether records land in
//! memory, on disk, or behind an API.

use super::report::FinalReport;
use crate::analysis::{AnalysisResult, PlankVariant};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

/// One stored coaching session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub variant: PlankVariant,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_secs: u64,
    /// Whether the session reached a proper stop (manual, voice, or
    /// form-failure) rather than being abandoned.
    pub completed: bool,
    pub report: Option<FinalReport>,
}

impl Session {
    fn new(variant: PlankVariant, started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            variant,
            started_at,
            ended_at: None,
            duration_secs: 0,
            completed: false,
            report: None,
        }
    }
}

/// Storage backend for session records.
pub trait SessionStore {
    /// Create a record for a freshly identified session, returning its id.
    fn create_session(&mut self, variant: PlankVariant, started_at: DateTime<Utc>)
        -> Result<Uuid>;

    /// Finalize a session with its aggregated report. Fails if the session
    /// does not exist or was already finalized.
    fn finalize_session(
        &mut self,
        id: Uuid,
        report: &FinalReport,
        ended_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Fetch a session record.
    fn get_session(&self, id: Uuid) -> Result<Option<Session>>;

    /// Record one analysis row against a session.
    fn append_analysis(&mut self, id: Uuid, result: &AnalysisResult) -> Result<()>;

    /// All analysis rows recorded for a session, oldest first. Empty when
    /// the session has none (or does not exist).
    fn get_session_analysis(&self, id: Uuid) -> Result<Vec<AnalysisResult>>;
}

/// In-memory store. The default backend for the CLI and for tests.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Vec<Session>,
    analysis: HashMap<Uuid, Vec<AnalysisResult>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored sessions, oldest first.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }
}

impl SessionStore for InMemorySessionStore {
    fn create_session(
        &mut self,
        variant: PlankVariant,
        started_at: DateTime<Utc>,
    ) -> Result<Uuid> {
        let session = Session::new(variant, started_at);
        let id = session.id;
        info!(session_id = %id, variant = %variant, "session created");
        self.sessions.push(session);
        Ok(id)
    }

    fn finalize_session(
        &mut self,
        id: Uuid,
        report: &FinalReport,
        ended_at: DateTime<Utc>,
    ) -> Result<()> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::Store(format!("Unknown session: {}", id)))?;

        if session.completed {
            return Err(Error::Store(format!("Session already finalized: {}", id)));
        }

        session.ended_at = Some(ended_at);
        session.duration_secs = report.duration_secs;
        session.variant = report.variant;
        session.completed = true;
        session.report = Some(report.clone());
        info!(
            session_id = %id,
            duration_secs = report.duration_secs,
            overall = report.overall_score,
            "session finalized"
        );
        Ok(())
    }

    fn get_session(&self, id: Uuid) -> Result<Option<Session>> {
        Ok(self.sessions.iter().find(|s| s.id == id).cloned())
    }

    fn append_analysis(&mut self, id: Uuid, result: &AnalysisResult) -> Result<()> {
        if !self.sessions.iter().any(|s| s.id == id) {
            return Err(Error::Store(format!("Unknown session: {}", id)));
        }
        self.analysis.entry(id).or_default().push(result.clone());
        Ok(())
    }

    fn get_session_analysis(&self, id: Uuid) -> Result<Vec<AnalysisResult>> {
        Ok(self.analysis.get(&id).cloned().unwrap_or_default())
    }
}
