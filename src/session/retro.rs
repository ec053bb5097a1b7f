use super::{Session, SprintRef};
use crate::error::Result;
use crate::model::{ActionItem, ActionStatus, FeedbackCategory, FeedbackItem, Priority};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type RetroSession = Session<RetroData>;

pub const DEFAULT_SENTIMENT: u8 = 7;

#[derive(Debug, Clone)]
pub struct RetroData {
    pub sprint: SprintRef,
    pub facilitator: String,
    pub went_well: Vec<FeedbackItem>,
    pub not_well: Vec<FeedbackItem>,
    pub improve: Vec<FeedbackItem>,
    pub sentiment: u8,
    pub action_items: Vec<ActionItemDraft>,
}

impl Default for RetroData {
    fn default() -> Self {
        Self::new(SprintRef::default(), String::new())
    }
}

impl RetroData {
    pub fn new(sprint: SprintRef, facilitator: String) -> Self {
        Self {
            sprint,
            facilitator,
            went_well: Vec::new(),
            not_well: Vec::new(),
            improve: Vec::new(),
            sentiment: DEFAULT_SENTIMENT,
            action_items: Vec::new(),
        }
    }

    pub fn feedback(&self, category: FeedbackCategory) -> &[FeedbackItem] {
        match category {
            FeedbackCategory::WentWell => &self.went_well,
            FeedbackCategory::NotWell => &self.not_well,
            FeedbackCategory::Improve => &self.improve,
        }
    }

    fn feedback_mut(&mut self, category: FeedbackCategory) -> &mut Vec<FeedbackItem> {
        match category {
            FeedbackCategory::WentWell => &mut self.went_well,
            FeedbackCategory::NotWell => &mut self.not_well,
            FeedbackCategory::Improve => &mut self.improve,
        }
    }

    pub fn feedback_count(&self) -> usize {
        self.went_well.len() + self.not_well.len() + self.improve.len()
    }
}

/// An action item agreed during the retrospective, before it gets an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItemDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub assigned_to: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
}

pub fn sentiment_label(score: u8) -> &'static str {
    match score {
        8.. => "Very Positive",
        6..=7 => "Positive",
        4..=5 => "Neutral",
        _ => "Needs Attention",
    }
}

impl RetroSession {
    /// Returns the number of items now in `category`.
    pub fn add_feedback(
        &mut self,
        category: FeedbackCategory,
        text: String,
        submitted_by: String,
    ) -> Result<usize> {
        let data = self.data_mut()?;
        let items = data.feedback_mut(category);
        items.push(FeedbackItem { text, submitted_by });
        tracing::info!(category = %category, count = items.len(), "Feedback added");
        Ok(items.len())
    }

    pub fn set_sentiment(&mut self, score: u8) -> Result<&'static str> {
        crate::validation::validate_sentiment(score)?;
        self.data_mut()?.sentiment = score;
        Ok(sentiment_label(score))
    }

    /// Replace the drafted action items.
    pub fn create_action_items(&mut self, drafts: Vec<ActionItemDraft>) -> Result<usize> {
        let data = self.data_mut()?;
        data.action_items = drafts;
        Ok(data.action_items.len())
    }

    pub fn summary_prompt(&self) -> Result<String> {
        self.ensure_open()?;
        let data = self.data();

        let mut sections = String::new();
        for category in FeedbackCategory::ALL {
            sections.push_str(&format!("\n{}:\n", category.heading()));
            let items = data.feedback(category);
            if items.is_empty() {
                sections.push_str("- No feedback provided\n");
            }
            for item in items {
                sections.push_str(&format!("- {} ({})\n", item.text, item.submitted_by));
            }
        }

        let mut actions = String::new();
        for (i, draft) in data.action_items.iter().enumerate() {
            actions.push_str(&format!(
                "{}. {} (owner: {}, priority: {})\n",
                i + 1,
                draft.title,
                draft.assigned_to,
                draft.priority
            ));
        }
        if actions.is_empty() {
            actions.push_str("None yet\n");
        }

        Ok(format!(
            r#"You are an AI Scrum Master facilitating a sprint retrospective.

Sprint {number}
Facilitator: {facilitator}
Team sentiment: {sentiment}/10 ({label})
{sections}
Action items agreed:
{actions}
Write a retrospective summary with:
1. Key themes from the feedback
2. What the team should keep doing
3. What to change next sprint
4. Comments on the action items and anything missing

Be constructive and concise."#,
            number = data.sprint.number,
            facilitator = data.facilitator,
            sentiment = data.sentiment,
            label = sentiment_label(data.sentiment),
        ))
    }

    /// Drafts turned into numbered action items for the session's sprint.
    pub fn to_action_items(&self) -> Vec<ActionItem> {
        let data = self.data();
        let now = Utc::now();
        data.action_items
            .iter()
            .enumerate()
            .map(|(i, draft)| ActionItem {
                id: ActionItem::format_id(data.sprint.number, i + 1),
                title: draft.title.clone(),
                description: draft.description.clone(),
                assigned_to: draft.assigned_to.clone(),
                priority: draft.priority,
                target_date: draft.target_date,
                status: ActionStatus::Open,
                created: now,
            })
            .collect()
    }
}
