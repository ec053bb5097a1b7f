use super::types::{ActionStatus, Priority};
use crate::estimate::{EstimateValue, ExtractionMethod};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintPlan {
    pub text: String,
    pub total_points: u32,
    pub story_count: usize,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandupRecord {
    pub member: String,
    pub date: NaiveDate,
    pub yesterday: String,
    pub today: String,
    pub blockers: String,
    pub created: DateTime<Utc>,
}

/// Team estimate vs model estimate for one story, kept once finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryEstimation {
    pub story_id: String,
    pub team_estimate: EstimateValue,
    pub ai_estimate: EstimateValue,
    pub final_estimate: EstimateValue,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_method: Option<ExtractionMethod>,

    pub accepted_ai: bool,
    pub estimated_by: String,

    #[serde(default)]
    pub team_reasoning: String,

    #[serde(default)]
    pub ai_reasoning: String,

    pub estimated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub text: String,
    pub submitted_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    /// `AI-<sprint>-<n>`, e.g. `AI-003-01`
    pub id: String,
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub assigned_to: String,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,

    #[serde(default)]
    pub status: ActionStatus,

    pub created: DateTime<Utc>,
}

impl ActionItem {
    pub fn format_id(sprint_number: u32, item_number: usize) -> String {
        format!("AI-{:03}-{:02}", sprint_number, item_number)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Retrospective {
    pub date: NaiveDate,
    pub facilitator: String,
    pub sentiment: u8,
    pub summary: String,
    pub created: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub went_well: Vec<FeedbackItem>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub not_well: Vec<FeedbackItem>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub improve: Vec<FeedbackItem>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub action_items: Vec<ActionItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_item_id_format() {
        assert_eq!(ActionItem::format_id(3, 1), "AI-003-01");
        assert_eq!(ActionItem::format_id(12, 10), "AI-012-10");
    }
}
