use super::{Session, SprintRef};
use crate::error::{Result, SprigError};
use crate::estimate::{EstimateValue, ExtractionResult};
use crate::model::{SprintPlan, Story};
use serde::Serialize;
use std::collections::BTreeMap;

pub type PlanningSession = Session<PlanningData>;

#[derive(Debug, Clone, Default)]
pub struct PlanningData {
    pub sprint: SprintRef,
    /// Keyed by story id
    pub estimations: BTreeMap<String, EstimateComparison>,
    /// Latest generated plan, if any
    pub plan: Option<SprintPlan>,
}

impl PlanningData {
    pub fn new(sprint: SprintRef) -> Self {
        Self {
            sprint,
            ..Self::default()
        }
    }
}

/// The team's estimate next to the one extracted from the model's answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateComparison {
    pub story_id: String,
    pub story_title: String,
    pub team_estimate: EstimateValue,
    pub team_reasoning: String,
    pub estimated_by: String,
    pub extraction: ExtractionResult,
    pub ai_response: String,
}

impl EstimateComparison {
    pub fn ai_estimate(&self) -> EstimateValue {
        self.extraction.value
    }

    pub fn agrees(&self) -> bool {
        self.team_estimate == self.extraction.value
    }

    pub fn decide(&self, accept_ai: bool) -> EstimateValue {
        if accept_ai {
            self.extraction.value
        } else {
            self.team_estimate
        }
    }
}

pub fn estimate_prompt(
    story: &Story,
    team_estimate: EstimateValue,
    team_reasoning: &str,
) -> String {
    let reasoning = if team_reasoning.trim().is_empty() {
        "No reasoning provided"
    } else {
        team_reasoning
    };
    let criteria = if story.acceptance_criteria.trim().is_empty() {
        "Not specified"
    } else {
        story.acceptance_criteria.as_str()
    };

    format!(
        r#"You are an expert agile coach helping estimate user stories.

Story: {title}
Type: {story_type}
Priority: {priority}
Description: {description}
Acceptance Criteria: {criteria}

The team estimated this story at {team_estimate} story points.
Team reasoning: {reasoning}

Give your own independent estimate using the scale 1, 2, 3, 5, 8, 13.
Start your answer with a single line in exactly this form:
AI_ESTIMATE: [number]

Then explain your reasoning in a few sentences, covering complexity,
uncertainty and effort, and say whether you agree with the team."#,
        title = story.title,
        story_type = story.story_type,
        priority = story.priority,
        description = story.description,
    )
}

pub fn plan_prompt(sprint: &SprintRef, goal: &str, stories: &[Story], total_points: u32) -> String {
    let mut story_lines = String::new();
    for story in stories {
        let points = story
            .points
            .map(|p| p.to_string())
            .unwrap_or_else(|| "?".to_string());
        story_lines.push_str(&format!(
            "- {} {} ({} points, {} priority)\n",
            story.id, story.title, points, story.priority
        ));
    }

    format!(
        r#"You are an AI Scrum Master. Create a sprint plan.

Sprint {number}
Goal: {goal}
Total committed points: {total_points}

Stories:
{story_lines}
Produce:
1. A short sprint overview
2. Suggested order of work and dependencies between stories
3. Risks and how to mitigate them
4. A day-by-day outline for the team

Keep it practical and concise."#,
        number = sprint.number,
    )
}

impl PlanningSession {
    pub fn record_estimate(&mut self, comparison: EstimateComparison) -> Result<()> {
        let data = self.data_mut()?;
        data.estimations
            .insert(comparison.story_id.clone(), comparison);
        Ok(())
    }

    pub fn record_plan(&mut self, plan: SprintPlan) -> Result<()> {
        self.data_mut()?.plan = Some(plan);
        Ok(())
    }

    pub fn comparison(&self, story_id: &str) -> Result<&EstimateComparison> {
        self.ensure_open()?;
        self.data()
            .estimations
            .get(story_id)
            .ok_or_else(|| {
                SprigError::Validation(format!("Story {} has not been estimated yet", story_id))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::extract;
    use crate::session::{GuardError, SessionKind};

    fn est(points: u64) -> EstimateValue {
        EstimateValue::new(points).unwrap()
    }

    fn comparison(team: u64, response: &str) -> EstimateComparison {
        EstimateComparison {
            story_id: "US-001".to_string(),
            story_title: "Login form".to_string(),
            team_estimate: est(team),
            team_reasoning: "Simple form".to_string(),
            estimated_by: "sam".to_string(),
            extraction: extract(response, est(team)),
            ai_response: response.to_string(),
        }
    }

    fn started() -> PlanningSession {
        let mut session = PlanningSession::new(SessionKind::Planning);
        session.start(PlanningData::new(SprintRef::new("AlphaTeam_Sprint_3", 3)));
        session
    }

    #[test]
    fn test_decide() {
        let c = comparison(5, "AI_ESTIMATE: 8\nI think 8 points because...");
        assert_eq!(c.ai_estimate(), est(8));
        assert!(!c.agrees());
        assert_eq!(c.decide(true), est(8));
        assert_eq!(c.decide(false), est(5));
    }

    #[test]
    fn test_unparseable_response_agrees_with_team() {
        let c = comparison(3, "Model unavailable");
        assert!(!c.extraction.matched);
        assert!(c.agrees());
        assert_eq!(c.decide(true), est(3));
    }

    #[test]
    fn test_record_then_lookup() {
        let mut session = started();
        session
            .record_estimate(comparison(5, "AI_ESTIMATE: 8"))
            .unwrap();

        assert_eq!(session.comparison("US-001").unwrap().ai_estimate(), est(8));
        assert!(matches!(
            session.comparison("US-404"),
            Err(SprigError::Validation(_))
        ));
    }

    #[test]
    fn test_record_after_approval_rejected() {
        let mut session = started();
        session.mark_terminal();

        let err = session
            .record_estimate(comparison(5, "AI_ESTIMATE: 8"))
            .unwrap_err();
        assert!(matches!(
            err,
            SprigError::Guard(GuardError::AlreadyFinalized(SessionKind::Planning))
        ));
        assert!(session.data().estimations.is_empty());
    }

    #[test]
    fn test_estimate_prompt_asks_for_tag() {
        let story = Story::new("US-001".to_string(), "Login form".to_string());
        let prompt = estimate_prompt(&story, est(5), "");
        assert!(prompt.contains("AI_ESTIMATE: [number]"));
        assert!(prompt.contains("at 5 story points"));
        assert!(prompt.contains("No reasoning provided"));
    }
}
