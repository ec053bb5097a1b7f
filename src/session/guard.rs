use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Standup,
    Planning,
    Retrospective,
}

impl SessionKind {
    pub const ALL: [SessionKind; 3] = [
        SessionKind::Standup,
        SessionKind::Planning,
        SessionKind::Retrospective,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SessionKind::Standup => "Standup",
            SessionKind::Planning => "Planning",
            SessionKind::Retrospective => "Retrospective",
        }
    }

    /// What finalizes a session of this kind.
    pub fn terminal_action(&self) -> &'static str {
        match self {
            SessionKind::Standup => "standup summary has already been generated",
            SessionKind::Planning => "sprint plan has already been approved",
            SessionKind::Retrospective => "retrospective summary has already been generated",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Standup => write!(f, "standup"),
            SessionKind::Planning => write!(f, "planning"),
            SessionKind::Retrospective => write!(f, "retrospective"),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardError {
    #[error("{} session is complete: {}", .0.title(), .0.terminal_action())]
    AlreadyFinalized(SessionKind),

    #[error("{} session not started", .0.title())]
    NotStarted(SessionKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    #[default]
    NotStarted,
    Started,
    Finalized,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::NotStarted => write!(f, "not-started"),
            Phase::Started => write!(f, "started"),
            Phase::Finalized => write!(f, "finalized"),
        }
    }
}

/// Tracks whether a session's terminal action has happened.
///
/// Only [`Session::start`] leaves `Finalized`; input collection and reset are
/// refused there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionGuard {
    phase: Phase,
}

impl CompletionGuard {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_started(&self) -> bool {
        self.phase != Phase::NotStarted
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Finalized
    }

    fn start(&mut self) {
        self.phase = Phase::Started;
    }

    fn mark_terminal(&mut self) {
        self.phase = Phase::Finalized;
    }

    fn ensure_open(&self, kind: SessionKind) -> Result<(), GuardError> {
        match self.phase {
            Phase::NotStarted => Err(GuardError::NotStarted(kind)),
            Phase::Started => Ok(()),
            Phase::Finalized => Err(GuardError::AlreadyFinalized(kind)),
        }
    }
}

/// A session of one kind: its guard plus the input accumulated so far.
///
/// Every mutation of the accumulated input goes through [`Session::data_mut`],
/// which refuses once the session is finalized.
#[derive(Debug)]
pub struct Session<D> {
    kind: SessionKind,
    guard: CompletionGuard,
    data: D,
}

impl<D: Default> Session<D> {
    pub fn new(kind: SessionKind) -> Self {
        Self {
            kind,
            guard: CompletionGuard::default(),
            data: D::default(),
        }
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn phase(&self) -> Phase {
        self.guard.phase()
    }

    pub fn is_started(&self) -> bool {
        self.guard.is_started()
    }

    pub fn is_terminal(&self) -> bool {
        self.guard.is_terminal()
    }

    /// Open a new session with fresh input, discarding any previous input.
    ///
    /// Starting over a finalized session begins the next one, so a team can
    /// hold another standup after the last summary went out.
    pub fn start(&mut self, data: D) {
        let reopened = self.guard.is_terminal();
        self.guard.start();
        self.data = data;
        tracing::info!(kind = %self.kind, reopened, "Session started");
    }

    /// Record the terminal action. Calling it again is a no-op.
    pub fn mark_terminal(&mut self) {
        if !self.guard.is_terminal() {
            tracing::info!(kind = %self.kind, "Session finalized");
        }
        self.guard.mark_terminal();
    }

    /// Discard all session state, unless the session is finalized.
    pub fn reset(&mut self) -> Result<(), GuardError> {
        if self.guard.is_terminal() {
            tracing::warn!(kind = %self.kind, "Reset blocked, session is finalized");
            return Err(GuardError::AlreadyFinalized(self.kind));
        }
        self.guard = CompletionGuard::default();
        self.data = D::default();
        tracing::info!(kind = %self.kind, "Session reset");
        Ok(())
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    /// Mutable access to the accumulated input of an open session.
    pub fn data_mut(&mut self) -> Result<&mut D, GuardError> {
        self.guard.ensure_open(self.kind)?;
        Ok(&mut self.data)
    }

    /// Fails unless the session is started and not finalized.
    pub fn ensure_open(&self) -> Result<(), GuardError> {
        self.guard.ensure_open(self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Notes = Session<Vec<String>>;

    fn started() -> Notes {
        let mut session = Notes::new(SessionKind::Standup);
        session.start(vec!["first".to_string()]);
        session
    }

    #[test]
    fn test_new_session_is_not_started() {
        let session = Notes::new(SessionKind::Planning);
        assert_eq!(session.phase(), Phase::NotStarted);
        assert!(!session.is_started());
        assert!(!session.is_terminal());
    }

    #[test]
    fn test_mutation_requires_start() {
        let mut session = Notes::new(SessionKind::Planning);
        assert_eq!(
            session.data_mut().unwrap_err(),
            GuardError::NotStarted(SessionKind::Planning)
        );
    }

    #[test]
    fn test_reset_from_started_clears_everything() {
        let mut session = started();
        session.data_mut().unwrap().push("second".to_string());

        session.reset().unwrap();

        assert_eq!(session.phase(), Phase::NotStarted);
        assert!(session.data().is_empty());
    }

    #[test]
    fn test_reset_blocked_after_terminal() {
        let mut session = started();
        session.mark_terminal();

        let err = session.reset().unwrap_err();

        assert_eq!(err, GuardError::AlreadyFinalized(SessionKind::Standup));
        assert!(session.is_terminal());
        assert_eq!(session.data(), &vec!["first".to_string()]);
    }

    #[test]
    fn test_mark_terminal_is_idempotent() {
        let mut session = started();
        session.mark_terminal();
        session.mark_terminal();
        assert!(session.is_terminal());
        assert_eq!(session.phase(), Phase::Finalized);
    }

    #[test]
    fn test_finalized_session_rejects_mutation() {
        let mut session = started();
        session.mark_terminal();

        assert!(matches!(
            session.data_mut(),
            Err(GuardError::AlreadyFinalized(SessionKind::Standup))
        ));
        assert_eq!(session.data(), &vec!["first".to_string()]);
        assert!(session.is_terminal());
    }

    #[test]
    fn test_start_after_finalize_opens_next_session() {
        let mut session = started();
        session.mark_terminal();

        session.start(vec!["next".to_string()]);

        assert_eq!(session.phase(), Phase::Started);
        assert!(!session.is_terminal());
        assert_eq!(session.data(), &vec!["next".to_string()]);
        session.data_mut().unwrap().push("more".to_string());

        // The reopened session is guarded again once it finalizes
        session.mark_terminal();
        assert_eq!(
            session.reset(),
            Err(GuardError::AlreadyFinalized(SessionKind::Standup))
        );
    }

    #[test]
    fn test_restart_while_open_replaces_input() {
        let mut session = started();
        session.start(vec!["again".to_string()]);
        assert_eq!(session.data(), &vec!["again".to_string()]);
        assert!(!session.is_terminal());
    }

    #[test]
    fn test_guard_error_messages() {
        assert_eq!(
            GuardError::AlreadyFinalized(SessionKind::Planning).to_string(),
            "Planning session is complete: sprint plan has already been approved"
        );
        assert_eq!(
            GuardError::NotStarted(SessionKind::Retrospective).to_string(),
            "Retrospective session not started"
        );
    }
}
