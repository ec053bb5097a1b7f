use super::{GuardError, Phase, PlanningSession, RetroSession, SessionKind, StandupSession};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Point-in-time view of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub kind: SessionKind,
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// One session per kind, each behind its own lock.
///
/// Every transition of a kind happens while holding that kind's lock, so a
/// reset can never interleave with the terminal action of the same kind.
#[derive(Debug)]
pub struct SessionRegistry {
    standup: Mutex<StandupSession>,
    planning: Mutex<PlanningSession>,
    retrospective: Mutex<RetroSession>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// A panic while a lock was held leaves the session in a consistent state:
// guards only change through single assignments.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            standup: Mutex::new(StandupSession::new(SessionKind::Standup)),
            planning: Mutex::new(PlanningSession::new(SessionKind::Planning)),
            retrospective: Mutex::new(RetroSession::new(SessionKind::Retrospective)),
        }
    }

    pub fn standup(&self) -> MutexGuard<'_, StandupSession> {
        lock(&self.standup)
    }

    pub fn planning(&self) -> MutexGuard<'_, PlanningSession> {
        lock(&self.planning)
    }

    pub fn retrospective(&self) -> MutexGuard<'_, RetroSession> {
        lock(&self.retrospective)
    }

    pub fn is_terminal(&self, kind: SessionKind) -> bool {
        match kind {
            SessionKind::Standup => self.standup().is_terminal(),
            SessionKind::Planning => self.planning().is_terminal(),
            SessionKind::Retrospective => self.retrospective().is_terminal(),
        }
    }

    pub fn status(&self, kind: SessionKind) -> SessionStatus {
        let (phase, session_id) = match kind {
            SessionKind::Standup => {
                let s = self.standup();
                (s.phase(), s.data().sprint.session_id.clone())
            }
            SessionKind::Planning => {
                let s = self.planning();
                (s.phase(), s.data().sprint.session_id.clone())
            }
            SessionKind::Retrospective => {
                let s = self.retrospective();
                (s.phase(), s.data().sprint.session_id.clone())
            }
        };
        SessionStatus {
            kind,
            phase,
            session_id: (!session_id.is_empty()).then_some(session_id),
        }
    }

    /// Guarded reset of one kind.
    pub fn reset(&self, kind: SessionKind) -> Result<(), GuardError> {
        match kind {
            SessionKind::Standup => self.standup().reset(),
            SessionKind::Planning => self.planning().reset(),
            SessionKind::Retrospective => self.retrospective().reset(),
        }
    }

    /// Guarded reset of every kind. Finalized kinds stay as they are.
    pub fn reset_all(&self) -> Vec<(SessionKind, Result<(), GuardError>)> {
        SessionKind::ALL
            .into_iter()
            .map(|kind| (kind, self.reset(kind)))
            .collect()
    }
}
