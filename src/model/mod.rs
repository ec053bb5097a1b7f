//! Data models for sprig.
//!
//! This module defines the persisted data structures:
//!
//! - [`Sprint`]: A sprint with its stories and session artifacts
//! - [`Story`]: A user story and its approved estimate
//! - [`StandupRecord`], [`StoryEstimation`], [`Retrospective`], [`ActionItem`]:
//!   artifacts produced by the standup, planning and retrospective sessions

mod records;
mod sprint;
mod types;

pub use records::{
    ActionItem, FeedbackItem, Retrospective, SprintPlan, StandupRecord, StoryEstimation,
};
pub use sprint::{Sprint, Story};
pub use types::{ActionStatus, FeedbackCategory, Priority, SprintStatus, StoryStatus, StoryType};
