//! Agile session state.
//!
//! Each session kind (standup, planning, retrospective) is a [`Session`]
//! holding a [`CompletionGuard`] and the input collected so far. Once a
//! session's terminal action has happened it is finalized and refuses any
//! further mutation, including reset. The [`SessionRegistry`] owns one
//! session per kind behind its own lock.

mod guard;
mod planning;
mod registry;
mod retro;
mod standup;

pub use guard::{CompletionGuard, GuardError, Phase, Session, SessionKind};
pub use planning::{
    EstimateComparison, PlanningData, PlanningSession, estimate_prompt, plan_prompt,
};
pub use registry::{SessionRegistry, SessionStatus};
pub use retro::{ActionItemDraft, RetroData, RetroSession, sentiment_label};
pub use standup::{StandupData, StandupSession, StandupUpdate};

use serde::Serialize;

/// The sprint a session operates on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SprintRef {
    pub session_id: String,
    pub number: u32,
}

impl SprintRef {
    pub fn new(session_id: impl Into<String>, number: u32) -> Self {
        Self {
            session_id: session_id.into(),
            number,
        }
    }
}
