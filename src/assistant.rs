//! The session operations, wired to their collaborators.
//!
//! [`Assistant`] owns the [`SessionRegistry`] and the three collaborators a
//! session needs: a [`SprintStore`], a [`TextGenerator`] and a [`Notifier`].
//! Every operation takes the lock of its session kind for its whole duration,
//! including the generation call, so the terminal action and a reset of the
//! same kind never interleave. Its log events are scoped by
//! [`logging::session_span`].
//!
//! Persistence of session artifacts and notifications after a generated
//! summary are best-effort: a failure is logged and the operation still
//! completes.

use crate::config::SprigConfig;
use crate::error::{Result, SprigError};
use crate::estimate::{self, EstimateValue};
use crate::generation::{self, RetryPolicy, TextGenerator};
use crate::logging;
use crate::model::{
    ActionItem, FeedbackCategory, FeedbackItem, Retrospective, Sprint, SprintPlan, SprintStatus,
    StandupRecord, StoryEstimation,
};
use crate::notify::{self, Notification, Notifier};
use crate::session::{
    ActionItemDraft, EstimateComparison, GuardError, PlanningData, RetroData, SessionKind,
    SessionRegistry, SessionStatus, SprintRef, StandupData, StandupUpdate, estimate_prompt,
    plan_prompt, sentiment_label,
};
use crate::storage::{SprintRepository, SprintStore};
use crate::validation;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct StandupSummary {
    pub sprint: SprintRef,
    pub summary: String,
    pub blockers: Vec<String>,
    pub update_count: usize,
    pub persisted: bool,
    pub notified: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanOutcome {
    pub sprint: SprintRef,
    pub plan: String,
    pub total_points: u32,
    pub story_count: usize,
    pub persisted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanApproval {
    pub sprint: SprintRef,
    pub approved_by: String,
    pub comments: Option<String>,
    pub approved_at: DateTime<Utc>,
    pub total_points: u32,
    pub story_count: usize,
    pub status_updated: bool,
    pub notified: bool,
}

impl PlanApproval {
    pub fn message(&self) -> String {
        let mut message = format!(
            "Sprint {} plan approved by {} (Scrum Master) at {}\nComments: {}\n",
            self.sprint.number,
            self.approved_by,
            self.approved_at.format("%Y-%m-%d %H:%M:%S"),
            self.comments.as_deref().unwrap_or("None"),
        );
        if self.status_updated {
            message.push_str("The sprint status has been updated to ACTIVE.\n");
        }
        if self.notified {
            message.push_str("The team has been notified.\n");
        }
        message
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RetroSummary {
    pub sprint: SprintRef,
    pub summary: String,
    pub sentiment: u8,
    pub sentiment_label: &'static str,
    pub action_items: Vec<ActionItem>,
    pub persisted: bool,
    pub notified: bool,
}

pub struct Assistant {
    store: Box<dyn SprintStore>,
    generator: Box<dyn TextGenerator>,
    notifier: Box<dyn Notifier>,
    registry: SessionRegistry,
    retry: RetryPolicy,
    summary_limit: usize,
    default_session: Option<String>,
}

impl Assistant {
    pub fn new(
        store: Box<dyn SprintStore>,
        generator: Box<dyn TextGenerator>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            generator,
            notifier,
            registry: SessionRegistry::new(),
            retry: RetryPolicy::default(),
            summary_limit: 500,
            default_session: None,
        }
    }

    pub fn from_config(config: &SprigConfig, project_root: &Path) -> Result<Self> {
        let store = SprintRepository::new(config, project_root);
        let generator = generation::from_settings(&config.generation);
        let notifier = notify::from_settings(&config.notify)?;

        Ok(Self::new(Box::new(store), generator, notifier)
            .with_retry_policy(config.generation.retry_policy())
            .with_summary_limit(config.notify.summary_limit)
            .with_default_session(config.sprig.session.clone()))
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_summary_limit(mut self, limit: usize) -> Self {
        self.summary_limit = limit;
        self
    }

    pub fn with_default_session(mut self, session_id: Option<String>) -> Self {
        self.default_session = session_id;
        self
    }

    pub fn store(&self) -> &dyn SprintStore {
        self.store.as_ref()
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    fn resolve_sprint(&self, session_id: Option<&str>) -> Result<Sprint> {
        let session_id = session_id
            .map(str::to_string)
            .or_else(|| self.default_session.clone())
            .ok_or_else(|| {
                SprigError::Validation(
                    "No sprint session given and no default session configured".to_string(),
                )
            })?;
        self.store.get(&session_id)
    }

    /// Store write whose failure is logged instead of returned.
    fn persist(
        &self,
        session_id: &str,
        what: &str,
        mutation: &mut dyn FnMut(&mut Sprint) -> Result<()>,
    ) -> Option<Sprint> {
        match self.store.update(session_id, mutation) {
            Ok(sprint) => Some(sprint),
            Err(e) => {
                tracing::warn!(session_id, what, error = %e, "Failed to persist, continuing");
                None
            }
        }
    }

    // Standup

    pub fn start_standup(&self, session_id: Option<&str>) -> Result<SprintRef> {
        let sprint = self.resolve_sprint(session_id)?;
        let sprint_ref = SprintRef::new(sprint.session_id, sprint.number);
        let _span = logging::session_span(SessionKind::Standup, &sprint_ref.session_id).entered();

        self.registry.standup().start(StandupData {
            sprint: sprint_ref.clone(),
            updates: Vec::new(),
        });
        Ok(sprint_ref)
    }

    /// Returns the number of updates collected so far.
    pub fn submit_update(
        &self,
        member: &str,
        yesterday: &str,
        today: &str,
        blockers: Option<&str>,
    ) -> Result<usize> {
        validation::validate_name(member)?;
        validation::validate_required("Yesterday", yesterday)?;
        validation::validate_required("Today", today)?;
        if let Some(blockers) = blockers {
            validation::validate_body("Blockers", blockers)?;
        }

        self.registry.standup().collect_update(StandupUpdate::new(
            member.to_string(),
            yesterday.to_string(),
            today.to_string(),
            blockers.map(str::to_string),
        ))
    }

    /// Generate the summary and finalize the standup.
    pub fn generate_standup_summary(&self) -> Result<StandupSummary> {
        let mut session = self.registry.standup();
        let _span =
            logging::session_span(SessionKind::Standup, &session.data().sprint.session_id).entered();
        let prompt = session.summary_prompt()?;
        let summary = self.retry.run(self.generator.as_ref(), &prompt)?;

        let blockers = session.blockers();
        let data = session.data().clone();
        let today = Utc::now().date_naive();

        let persisted = self
            .persist(&data.sprint.session_id, "standup updates", &mut |sprint| {
                let now = Utc::now();
                sprint
                    .standups
                    .extend(data.updates.iter().map(|u| StandupRecord {
                        member: u.member.clone(),
                        date: today,
                        yesterday: u.yesterday.clone(),
                        today: u.today.clone(),
                        blockers: u.blockers.clone(),
                        created: now,
                    }));
                Ok(())
            })
            .is_some();

        let notified = notify::dispatch(
            self.notifier.as_ref(),
            &Notification::StandupSummary {
                sprint_number: data.sprint.number,
                summary: notify::truncate_chars(&summary, self.summary_limit),
                blockers: blockers.clone(),
            },
        );

        session.mark_terminal();

        Ok(StandupSummary {
            sprint: data.sprint,
            summary,
            blockers,
            update_count: data.updates.len(),
            persisted,
            notified,
        })
    }

    // Planning

    pub fn start_planning(&self, session_id: Option<&str>) -> Result<SprintRef> {
        let sprint = self.resolve_sprint(session_id)?;
        let sprint_ref = SprintRef::new(sprint.session_id, sprint.number);
        let _span = logging::session_span(SessionKind::Planning, &sprint_ref.session_id).entered();

        self.registry
            .planning()
            .start(PlanningData::new(sprint_ref.clone()));
        Ok(sprint_ref)
    }

    /// Ask the model for its own estimate and compare it with the team's.
    ///
    /// A failed generation call does not fail the estimate: its message is
    /// what the extractor sees, so the model's estimate falls back to the
    /// team's.
    pub fn estimate_story(
        &self,
        story_id: &str,
        team_estimate: EstimateValue,
        reasoning: &str,
        estimated_by: &str,
    ) -> Result<EstimateComparison> {
        validation::validate_id(story_id)?;
        validation::validate_name(estimated_by)?;
        validation::validate_body("Reasoning", reasoning)?;

        let mut session = self.registry.planning();
        session.ensure_open()?;
        let _span =
            logging::session_span(SessionKind::Planning, &session.data().sprint.session_id).entered();

        let sprint = self.store.get(&session.data().sprint.session_id)?;
        let story = sprint
            .story(story_id)
            .ok_or_else(|| SprigError::StoryNotFound(story_id.to_string()))?;

        let prompt = estimate_prompt(story, team_estimate, reasoning);
        let ai_response = match self.retry.run(self.generator.as_ref(), &prompt) {
            Ok(text) => text,
            Err(failure) => failure.to_string(),
        };
        let extraction = estimate::extract(&ai_response, team_estimate);

        tracing::info!(
            story_id,
            team = %team_estimate,
            ai = %extraction.value,
            method = %extraction.method_label(),
            "Story estimated"
        );

        let comparison = EstimateComparison {
            story_id: story.id.clone(),
            story_title: story.title.clone(),
            team_estimate,
            team_reasoning: reasoning.to_string(),
            estimated_by: estimated_by.to_string(),
            extraction,
            ai_response,
        };
        session.record_estimate(comparison.clone())?;
        Ok(comparison)
    }

    /// Store the chosen estimate on the story, approved.
    pub fn finalize_estimate(&self, story_id: &str, accept_ai: bool) -> Result<StoryEstimation> {
        let session = self.registry.planning();
        let _span =
            logging::session_span(SessionKind::Planning, &session.data().sprint.session_id).entered();
        let comparison = session.comparison(story_id)?.clone();
        let final_estimate = comparison.decide(accept_ai);

        let record = StoryEstimation {
            story_id: comparison.story_id.clone(),
            team_estimate: comparison.team_estimate,
            ai_estimate: comparison.ai_estimate(),
            final_estimate,
            extraction_method: comparison.extraction.method,
            accepted_ai: accept_ai,
            estimated_by: comparison.estimated_by.clone(),
            team_reasoning: comparison.team_reasoning.clone(),
            ai_reasoning: comparison.ai_response.clone(),
            estimated_at: Utc::now(),
        };

        self.store
            .update(&session.data().sprint.session_id, &mut |sprint| {
                let story = sprint
                    .story_mut(story_id)
                    .ok_or_else(|| SprigError::StoryNotFound(story_id.to_string()))?;
                story.points = Some(final_estimate);
                story.points_approved = true;
                sprint.estimations.push(record.clone());
                Ok(())
            })?;

        tracing::info!(
            story_id,
            points = %final_estimate,
            accepted_ai = accept_ai,
            "Estimate finalized"
        );
        Ok(record)
    }

    /// Draft the sprint plan from the approved stories. Does not finalize.
    pub fn generate_plan(&self) -> Result<PlanOutcome> {
        let mut session = self.registry.planning();
        session.ensure_open()?;
        let sprint_ref = session.data().sprint.clone();
        let _span = logging::session_span(SessionKind::Planning, &sprint_ref.session_id).entered();

        let sprint = self.store.get(&sprint_ref.session_id)?;
        let stories: Vec<_> = sprint.approved_stories().cloned().collect();
        if stories.is_empty() {
            return Err(SprigError::Validation(
                "No stories with approved estimates. Finalize some estimates first.".to_string(),
            ));
        }
        let total_points = sprint.approved_points();

        let prompt = plan_prompt(&sprint_ref, &sprint.goal, &stories, total_points);
        let text = self.retry.run(self.generator.as_ref(), &prompt)?;

        let plan = SprintPlan {
            text: text.clone(),
            total_points,
            story_count: stories.len(),
            created: Utc::now(),
        };
        session.record_plan(plan.clone())?;

        let persisted = self
            .persist(&sprint_ref.session_id, "sprint plan", &mut |s| {
                s.plan = Some(plan.clone());
                Ok(())
            })
            .is_some();

        Ok(PlanOutcome {
            sprint: sprint_ref,
            plan: text,
            total_points,
            story_count: stories.len(),
            persisted,
        })
    }

    /// Approve the plan. This finalizes the planning session.
    pub fn approve_plan(&self, scrum_master: &str, comments: Option<&str>) -> Result<PlanApproval> {
        validation::validate_name(scrum_master)?;
        if let Some(comments) = comments {
            validation::validate_body("Comments", comments)?;
        }

        let mut session = self.registry.planning();
        session.ensure_open()?;
        let _span =
            logging::session_span(SessionKind::Planning, &session.data().sprint.session_id).entered();
        session.mark_terminal();

        let data = session.data().clone();
        let approved_at = Utc::now();

        let updated = self.persist(&data.sprint.session_id, "sprint approval", &mut |s| {
            s.status = SprintStatus::Active;
            s.approved_by = Some(scrum_master.to_string());
            s.approved_at = Some(approved_at);
            Ok(())
        });

        let (total_points, story_count) = match (&updated, &data.plan) {
            (Some(sprint), _) => (sprint.approved_points(), sprint.approved_stories().count()),
            (None, Some(plan)) => (plan.total_points, plan.story_count),
            (None, None) => (0, 0),
        };

        let notified = notify::dispatch(
            self.notifier.as_ref(),
            &Notification::PlanningComplete {
                sprint_number: data.sprint.number,
                total_points,
                story_count,
                approved_by: scrum_master.to_string(),
            },
        );

        Ok(PlanApproval {
            sprint: data.sprint,
            approved_by: scrum_master.to_string(),
            comments: comments.map(str::to_string),
            approved_at,
            total_points,
            story_count,
            status_updated: updated.is_some(),
            notified,
        })
    }

    // Retrospective

    pub fn start_retrospective(
        &self,
        session_id: Option<&str>,
        facilitator: &str,
    ) -> Result<SprintRef> {
        validation::validate_name(facilitator)?;
        let sprint = self.resolve_sprint(session_id)?;
        let sprint_ref = SprintRef::new(sprint.session_id, sprint.number);
        let _span =
            logging::session_span(SessionKind::Retrospective, &sprint_ref.session_id).entered();

        self.registry
            .retrospective()
            .start(RetroData::new(sprint_ref.clone(), facilitator.to_string()));
        Ok(sprint_ref)
    }

    pub fn add_feedback(
        &self,
        category: FeedbackCategory,
        text: &str,
        submitted_by: &str,
    ) -> Result<usize> {
        validation::validate_required("Feedback", text)?;
        validation::validate_name(submitted_by)?;
        self.registry.retrospective().add_feedback(
            category,
            text.to_string(),
            submitted_by.to_string(),
        )
    }

    pub fn set_sentiment(&self, score: u8) -> Result<&'static str> {
        self.registry.retrospective().set_sentiment(score)
    }

    pub fn create_action_items(&self, drafts: Vec<ActionItemDraft>) -> Result<usize> {
        for draft in &drafts {
            validation::validate_title(&draft.title)?;
            validation::validate_name(&draft.assigned_to)?;
            validation::validate_body("Description", &draft.description)?;
        }
        self.registry.retrospective().create_action_items(drafts)
    }

    /// Generate the summary and finalize the retrospective.
    pub fn generate_retro_summary(&self) -> Result<RetroSummary> {
        let mut session = self.registry.retrospective();
        let _span = logging::session_span(
            SessionKind::Retrospective,
            &session.data().sprint.session_id,
        )
        .entered();
        let prompt = session.summary_prompt()?;
        let summary = self.retry.run(self.generator.as_ref(), &prompt)?;

        let data: RetroData = session.data().clone();
        let action_items = session.to_action_items();
        let now = Utc::now();

        let retrospective = Retrospective {
            date: now.date_naive(),
            facilitator: data.facilitator.clone(),
            sentiment: data.sentiment,
            summary: summary.clone(),
            created: now,
            went_well: data.went_well.clone(),
            not_well: data.not_well.clone(),
            improve: data.improve.clone(),
            action_items: action_items.clone(),
        };
        let persisted = self
            .persist(&data.sprint.session_id, "retrospective", &mut |s| {
                s.retrospectives.push(retrospective.clone());
                Ok(())
            })
            .is_some();

        let texts = |items: &[FeedbackItem]| -> Vec<String> {
            items.iter().map(|i| i.text.clone()).collect()
        };
        let notified = notify::dispatch(
            self.notifier.as_ref(),
            &Notification::RetrospectiveSummary {
                sprint_number: data.sprint.number,
                went_well: texts(&data.went_well),
                needs_improvement: [texts(&data.not_well), texts(&data.improve)].concat(),
            },
        );
        if !action_items.is_empty() {
            notify::dispatch(
                self.notifier.as_ref(),
                &Notification::ActionItemsCreated {
                    sprint_number: data.sprint.number,
                    items: action_items
                        .iter()
                        .map(|a| (a.id.clone(), a.title.clone(), a.assigned_to.clone()))
                        .collect(),
                },
            );
        }

        session.mark_terminal();

        Ok(RetroSummary {
            sprint: data.sprint,
            summary,
            sentiment: data.sentiment,
            sentiment_label: sentiment_label(data.sentiment),
            action_items,
            persisted,
            notified,
        })
    }

    // Resets

    /// Guarded reset of one session kind.
    ///
    /// Resetting an unfinalized planning session also clears the story
    /// estimates it stored.
    pub fn reset(&self, kind: SessionKind) -> std::result::Result<(), GuardError> {
        if kind != SessionKind::Planning {
            return self.registry.reset(kind);
        }

        let mut session = self.registry.planning();
        let session_id = session.data().sprint.session_id.clone();
        let _span = logging::session_span(kind, &session_id).entered();
        session.reset()?;

        if !session_id.is_empty() {
            let mut cleared = 0;
            self.persist(&session_id, "estimate reset", &mut |s| {
                cleared = s.clear_estimates();
                Ok(())
            });
            tracing::info!(session_id = %session_id, cleared, "Story estimates cleared");
        }
        Ok(())
    }

    pub fn reset_all(&self) -> Vec<(SessionKind, std::result::Result<(), GuardError>)> {
        SessionKind::ALL
            .into_iter()
            .map(|kind| (kind, self.reset(kind)))
            .collect()
    }

    pub fn status(&self) -> Vec<SessionStatus> {
        SessionKind::ALL
            .into_iter()
            .map(|kind| self.registry.status(kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationError;
    use crate::generation::testing::ScriptedGenerator;
    use crate::model::{Priority, Story};
    use crate::notify::testing::RecordingNotifier;
    use crate::session::Phase;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    const SESSION: &str = "AlphaTeam_Sprint_3";

    struct Harness {
        assistant: Assistant,
        generator: Arc<ScriptedGenerator>,
        notifier: Arc<RecordingNotifier>,
        _temp_dir: TempDir,
    }

    fn harness_with(
        replies: Vec<std::result::Result<String, GenerationError>>,
        notifier: RecordingNotifier,
    ) -> Harness {
        let temp_dir = TempDir::new().unwrap();
        let store = SprintRepository::at(temp_dir.path().join("sprints"));

        let mut sprint = Sprint::new(
            "Alpha Team".to_string(),
            3,
            "Ship login".to_string(),
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 16).unwrap(),
        );
        sprint.stories = vec![
            Story::new("US-001".to_string(), "Login form".to_string())
                .with_priority(Priority::High),
            Story::new("US-002".to_string(), "Password reset".to_string()),
        ];
        store.create(&sprint).unwrap();

        let generator = Arc::new(ScriptedGenerator::new(replies));
        let notifier = Arc::new(notifier);
        let assistant = Assistant::new(
            Box::new(store),
            Box::new(Arc::clone(&generator)),
            Box::new(Arc::clone(&notifier)),
        )
        .with_retry_policy(RetryPolicy::new(3, Duration::ZERO))
        .with_default_session(Some(SESSION.to_string()));

        Harness {
            assistant,
            generator,
            notifier,
            _temp_dir: temp_dir,
        }
    }

    fn harness(replies: &[&str]) -> Harness {
        harness_with(
            replies.iter().map(|r| Ok(r.to_string())).collect(),
            RecordingNotifier::default(),
        )
    }

    fn est(points: u64) -> EstimateValue {
        EstimateValue::new(points).unwrap()
    }

    #[test]
    fn test_start_requires_existing_sprint() {
        let h = harness(&[]);
        assert!(matches!(
            h.assistant.start_standup(Some("AlphaTeam_Sprint_9")),
            Err(SprigError::SprintNotFound(_))
        ));
        assert_eq!(h.assistant.start_standup(None).unwrap().number, 3);
    }

    #[test]
    fn test_no_session_and_no_default() {
        let h = harness(&[]);
        let assistant = h.assistant.with_default_session(None);
        assert!(matches!(
            assistant.start_planning(None),
            Err(SprigError::Validation(_))
        ));
    }

    #[test]
    fn test_standup_summary_finalizes_and_persists() {
        let h = harness(&["Team is on track."]);
        h.assistant.start_standup(None).unwrap();
        h.assistant
            .submit_update("alice", "Login UI", "Tests", None)
            .unwrap();
        let count = h
            .assistant
            .submit_update("bob", "API", "API", Some("Waiting on keys"))
            .unwrap();
        assert_eq!(count, 2);

        let summary = h.assistant.generate_standup_summary().unwrap();

        assert_eq!(summary.summary, "Team is on track.");
        assert_eq!(summary.blockers, vec!["bob: Waiting on keys".to_string()]);
        assert!(summary.persisted);
        assert!(summary.notified);
        assert!(h.assistant.registry().is_terminal(SessionKind::Standup));
        assert_eq!(h.assistant.store().get(SESSION).unwrap().standups.len(), 2);

        // Finalized: no more updates and no reset
        assert!(matches!(
            h.assistant.submit_update("carol", "x", "y", None),
            Err(SprigError::Guard(GuardError::AlreadyFinalized(SessionKind::Standup)))
        ));
        assert_eq!(
            h.assistant.reset(SessionKind::Standup),
            Err(GuardError::AlreadyFinalized(SessionKind::Standup))
        );

        // The next day's standup starts fresh
        h.assistant.start_standup(None).unwrap();
        assert!(!h.assistant.registry().is_terminal(SessionKind::Standup));
        assert_eq!(h.assistant.submit_update("carol", "x", "y", None).unwrap(), 1);
    }

    #[test]
    fn test_standup_summary_is_truncated_for_notification() {
        let long = "x".repeat(800);
        let h = harness(&[long.as_str()]);
        h.assistant.start_standup(None).unwrap();
        h.assistant.submit_update("alice", "a", "b", None).unwrap();

        let summary = h.assistant.generate_standup_summary().unwrap();
        assert_eq!(summary.summary.len(), 800);

        match &h.notifier.sent()[0] {
            Notification::StandupSummary { summary, .. } => assert_eq!(summary.len(), 500),
            other => panic!("unexpected notification: {:?}", other),
        }
    }

    #[test]
    fn test_generation_failure_leaves_standup_open() {
        let h = harness_with(
            vec![Err(GenerationError::Other("boom".to_string()))],
            RecordingNotifier::default(),
        );
        h.assistant.start_standup(None).unwrap();
        h.assistant.submit_update("alice", "a", "b", None).unwrap();

        let err = h.assistant.generate_standup_summary().unwrap_err();
        assert_eq!(err.to_string(), "Error generating response: boom");
        assert!(!h.assistant.registry().is_terminal(SessionKind::Standup));
        assert!(h.notifier.sent().is_empty());
        assert!(h.assistant.reset(SessionKind::Standup).is_ok());
    }

    #[test]
    fn test_summary_retries_rate_limit() {
        let h = harness_with(
            vec![
                Err(GenerationError::RateLimited("429".to_string())),
                Ok("Summary after retry".to_string()),
            ],
            RecordingNotifier::default(),
        );
        h.assistant.start_standup(None).unwrap();
        h.assistant.submit_update("alice", "a", "b", None).unwrap();

        let summary = h.assistant.generate_standup_summary().unwrap();
        assert_eq!(summary.summary, "Summary after retry");
        assert_eq!(h.generator.calls(), 2);
    }

    #[test]
    fn test_estimate_then_accept_ai() {
        let h = harness(&["AI_ESTIMATE: 8\nI think 8 points because..."]);
        h.assistant.start_planning(None).unwrap();

        let comparison = h
            .assistant
            .estimate_story("US-001", est(5), "Simple form", "sam")
            .unwrap();
        assert_eq!(comparison.ai_estimate(), est(8));
        assert!(comparison.extraction.matched);
        assert!(
            h.generator
                .last_prompt()
                .unwrap()
                .contains("AI_ESTIMATE: [number]")
        );

        let record = h.assistant.finalize_estimate("US-001", true).unwrap();
        assert_eq!(record.final_estimate, est(8));

        let sprint = h.assistant.store().get(SESSION).unwrap();
        let story = sprint.story("US-001").unwrap();
        assert_eq!(story.points, Some(est(8)));
        assert!(story.points_approved);
        assert_eq!(sprint.estimations.len(), 1);
        assert!(!h.assistant.registry().is_terminal(SessionKind::Planning));
    }

    #[test]
    fn test_estimate_keeps_team_value_when_rejecting_ai() {
        let h = harness(&["AI_ESTIMATE: 8"]);
        h.assistant.start_planning(None).unwrap();
        h.assistant
            .estimate_story("US-001", est(5), "", "sam")
            .unwrap();

        let record = h.assistant.finalize_estimate("US-001", false).unwrap();
        assert_eq!(record.final_estimate, est(5));
        assert!(!record.accepted_ai);
    }

    #[test]
    fn test_estimate_generation_failure_falls_back_to_team() {
        let h = harness_with(
            vec![Err(GenerationError::Other("service unavailable".to_string()))],
            RecordingNotifier::default(),
        );
        h.assistant.start_planning(None).unwrap();

        let comparison = h
            .assistant
            .estimate_story("US-001", est(3), "", "sam")
            .unwrap();
        assert_eq!(comparison.ai_estimate(), est(3));
        assert!(!comparison.extraction.matched);
        assert!(comparison.ai_response.contains("service unavailable"));
    }

    #[test]
    fn test_estimate_unknown_story() {
        let h = harness(&[]);
        h.assistant.start_planning(None).unwrap();
        assert!(matches!(
            h.assistant.estimate_story("US-404", est(3), "", "sam"),
            Err(SprigError::StoryNotFound(_))
        ));
        assert_eq!(h.generator.calls(), 0);
    }

    #[test]
    fn test_finalize_requires_estimate() {
        let h = harness(&[]);
        h.assistant.start_planning(None).unwrap();
        assert!(h.assistant.finalize_estimate("US-002", true).is_err());
    }

    #[test]
    fn test_plan_requires_approved_stories() {
        let h = harness(&[]);
        h.assistant.start_planning(None).unwrap();
        assert!(matches!(
            h.assistant.generate_plan(),
            Err(SprigError::Validation(_))
        ));
    }

    #[test]
    fn test_plan_then_approve_blocks_reset() {
        let h = harness(&["AI_ESTIMATE: 5", "Day 1: build the form."]);
        h.assistant.start_planning(None).unwrap();
        h.assistant
            .estimate_story("US-001", est(5), "", "sam")
            .unwrap();
        h.assistant.finalize_estimate("US-001", true).unwrap();

        let plan = h.assistant.generate_plan().unwrap();
        assert_eq!(plan.total_points, 5);
        assert_eq!(plan.story_count, 1);
        assert!(plan.persisted);
        assert!(!h.assistant.registry().is_terminal(SessionKind::Planning));

        let approval = h.assistant.approve_plan("sam", Some("Looks good")).unwrap();
        assert!(approval.status_updated);
        assert!(approval.notified);
        assert!(approval.message().contains("approved by sam"));

        let sprint = h.assistant.store().get(SESSION).unwrap();
        assert_eq!(sprint.status, SprintStatus::Active);
        assert_eq!(sprint.approved_by.as_deref(), Some("sam"));
        assert!(sprint.plan.is_some());

        assert_eq!(
            h.assistant.reset(SessionKind::Planning),
            Err(GuardError::AlreadyFinalized(SessionKind::Planning))
        );
        // Estimates survive the blocked reset
        assert_eq!(
            h.assistant.store().get(SESSION).unwrap().approved_points(),
            5
        );
        assert!(
            h.assistant
                .estimate_story("US-002", est(3), "", "sam")
                .is_err()
        );

        // Replanning opens a new session without touching stored estimates
        h.assistant.start_planning(None).unwrap();
        assert_eq!(
            h.assistant.registry().status(SessionKind::Planning).phase,
            Phase::Started
        );
        assert_eq!(
            h.assistant.store().get(SESSION).unwrap().approved_points(),
            5
        );
    }

    #[test]
    fn test_notification_failure_does_not_block_approval() {
        let h = harness_with(Vec::new(), RecordingNotifier::failing());
        h.assistant.start_planning(None).unwrap();

        let approval = h.assistant.approve_plan("sam", None).unwrap();

        assert!(!approval.notified);
        assert!(approval.status_updated);
        assert_eq!(h.notifier.sent().len(), 1);
        assert!(h.assistant.registry().is_terminal(SessionKind::Planning));
    }

    #[test]
    fn test_planning_reset_clears_estimates() {
        let h = harness(&["AI_ESTIMATE: 8"]);
        h.assistant.start_planning(None).unwrap();
        h.assistant
            .estimate_story("US-001", est(5), "", "sam")
            .unwrap();
        h.assistant.finalize_estimate("US-001", true).unwrap();

        h.assistant.reset(SessionKind::Planning).unwrap();

        let sprint = h.assistant.store().get(SESSION).unwrap();
        assert!(sprint.stories.iter().all(|s| s.points.is_none()));
        assert_eq!(
            h.assistant.registry().status(SessionKind::Planning).phase,
            Phase::NotStarted
        );
    }

    #[test]
    fn test_retrospective_flow() {
        let h = harness(&["Good sprint overall."]);
        h.assistant.start_retrospective(None, "dana").unwrap();
        h.assistant
            .add_feedback(FeedbackCategory::WentWell, "Pairing", "a")
            .unwrap();
        h.assistant
            .add_feedback(FeedbackCategory::NotWell, "Flaky CI", "b")
            .unwrap();
        assert_eq!(h.assistant.set_sentiment(8).unwrap(), "Very Positive");
        h.assistant
            .create_action_items(vec![ActionItemDraft {
                title: "Fix CI".to_string(),
                description: String::new(),
                assigned_to: "lee".to_string(),
                priority: Priority::High,
                target_date: None,
            }])
            .unwrap();

        let summary = h.assistant.generate_retro_summary().unwrap();

        assert_eq!(summary.sentiment_label, "Very Positive");
        assert_eq!(summary.action_items[0].id, "AI-003-01");
        assert!(summary.persisted);
        assert!(h.assistant.registry().is_terminal(SessionKind::Retrospective));

        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].kind(), "action_items_created");

        let sprint = h.assistant.store().get(SESSION).unwrap();
        assert_eq!(sprint.retrospectives[0].action_items.len(), 1);
        assert!(
            h.assistant
                .add_feedback(FeedbackCategory::Improve, "late", "c")
                .is_err()
        );
    }

    #[test]
    fn test_retro_summary_without_feedback_still_finalizes() {
        let h = harness(&["Quiet sprint."]);
        h.assistant.start_retrospective(None, "dana").unwrap();

        let summary = h.assistant.generate_retro_summary().unwrap();

        assert_eq!(summary.summary, "Quiet sprint.");
        assert!(summary.action_items.is_empty());
        assert!(h.assistant.registry().is_terminal(SessionKind::Retrospective));
        assert!(h.generator.last_prompt().unwrap().contains("No feedback provided"));

        let sprint = h.assistant.store().get(SESSION).unwrap();
        assert_eq!(sprint.retrospectives.len(), 1);
        assert!(sprint.retrospectives[0].went_well.is_empty());
    }

    #[test]
    fn test_reset_all_reports_each_kind() {
        let h = harness(&["Done."]);
        h.assistant.start_standup(None).unwrap();
        h.assistant.submit_update("alice", "a", "b", None).unwrap();
        h.assistant.generate_standup_summary().unwrap();
        h.assistant.start_retrospective(None, "dana").unwrap();

        let outcomes = h.assistant.reset_all();

        assert_eq!(
            outcomes[0],
            (
                SessionKind::Standup,
                Err(GuardError::AlreadyFinalized(SessionKind::Standup))
            )
        );
        assert_eq!(outcomes[1], (SessionKind::Planning, Ok(())));
        assert_eq!(outcomes[2], (SessionKind::Retrospective, Ok(())));

        let status = h.assistant.status();
        assert_eq!(status[0].phase, Phase::Finalized);
        assert_eq!(status[2].phase, Phase::NotStarted);
    }
}
