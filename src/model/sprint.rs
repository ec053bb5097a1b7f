use super::records::{Retrospective, SprintPlan, StandupRecord, StoryEstimation};
use super::types::{Priority, SprintStatus, StoryStatus, StoryType};
use crate::estimate::EstimateValue;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// Scalar fields come before tables so the TOML rendering stays valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprint {
    pub session_id: String,
    pub team: String,
    pub number: u32,

    #[serde(default)]
    pub goal: String,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[serde(default)]
    pub status: SprintStatus,

    #[serde(default)]
    pub capacity: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub created: DateTime<Utc>,

    #[serde(default)]
    pub updated: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<SprintPlan>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stories: Vec<Story>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub estimations: Vec<StoryEstimation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub standups: Vec<StandupRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub retrospectives: Vec<Retrospective>,
}

impl Sprint {
    pub fn new(
        team: String,
        number: u32,
        goal: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            session_id: Self::session_id_for(&team, number),
            team,
            number,
            goal,
            start_date,
            end_date,
            status: SprintStatus::default(),
            capacity: 0,
            approved_by: None,
            approved_at: None,
            created: now,
            updated: now,
            plan: None,
            stories: Vec::new(),
            estimations: Vec::new(),
            standups: Vec::new(),
            retrospectives: Vec::new(),
        }
    }

    /// Session id in the `AlphaTeam_Sprint_3` form.
    pub fn session_id_for(team: &str, number: u32) -> String {
        let team: String = team.split_whitespace().collect();
        format!("{}_Sprint_{}", team, number)
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_status(mut self, status: SprintStatus) -> Self {
        self.status = status;
        self
    }

    pub fn touch(&mut self) {
        self.updated = Utc::now();
    }

    pub fn story(&self, story_id: &str) -> Option<&Story> {
        self.stories.iter().find(|s| s.id == story_id)
    }

    pub fn story_mut(&mut self, story_id: &str) -> Option<&mut Story> {
        self.stories.iter_mut().find(|s| s.id == story_id)
    }

    pub fn approved_stories(&self) -> impl Iterator<Item = &Story> {
        self.stories
            .iter()
            .filter(|s| s.points_approved && s.points.is_some())
    }

    pub fn approved_points(&self) -> u32 {
        self.approved_stories()
            .filter_map(|s| s.points)
            .map(|p| u32::from(p.points()))
            .sum()
    }

    /// Drop every story estimate. Returns how many stories were changed.
    pub fn clear_estimates(&mut self) -> usize {
        let mut cleared = 0;
        for story in &mut self.stories {
            if story.points.is_some() || story.points_approved {
                story.points = None;
                story.points_approved = false;
                cleared += 1;
            }
        }
        cleared
    }

    /// Next story id in the `US-001` form.
    pub fn next_story_id(&self) -> String {
        format!("US-{:03}", self.stories.len() + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub acceptance_criteria: String,

    #[serde(default, rename = "type")]
    pub story_type: StoryType,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub status: StoryStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<EstimateValue>,

    #[serde(default)]
    pub points_approved: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,

    #[serde(default)]
    pub created: DateTime<Utc>,
}

impl Story {
    pub fn new(id: String, title: String) -> Self {
        Self {
            id,
            title,
            description: String::new(),
            acceptance_criteria: String::new(),
            story_type: StoryType::default(),
            priority: Priority::default(),
            status: StoryStatus::default(),
            points: None,
            points_approved: false,
            assigned_to: None,
            created: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = description;
        self
    }

    pub fn with_acceptance_criteria(mut self, criteria: String) -> Self {
        self.acceptance_criteria = criteria;
        self
    }

    pub fn with_type(mut self, story_type: StoryType) -> Self {
        self.story_type = story_type;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}
