use crate::error::{Result, SprigError};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SprintStatus {
    #[default]
    Planning,
    Active,
    Completed,
}

impl fmt::Display for SprintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SprintStatus::Planning => write!(f, "planning"),
            SprintStatus::Active => write!(f, "active"),
            SprintStatus::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for SprintStatus {
    type Err = SprigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "planning" => Ok(SprintStatus::Planning),
            "active" => Ok(SprintStatus::Active),
            "completed" | "done" => Ok(SprintStatus::Completed),
            _ => Err(SprigError::Parse(format!("Invalid sprint status: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StoryStatus {
    #[default]
    Backlog,
    Planned,
    InProgress,
    InReview,
    Done,
}

impl fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoryStatus::Backlog => write!(f, "backlog"),
            StoryStatus::Planned => write!(f, "planned"),
            StoryStatus::InProgress => write!(f, "in-progress"),
            StoryStatus::InReview => write!(f, "in-review"),
            StoryStatus::Done => write!(f, "done"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

impl FromStr for Priority {
    type Err = SprigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "high" | "h" => Ok(Priority::High),
            "medium" | "normal" | "m" => Ok(Priority::Medium),
            "low" | "l" => Ok(Priority::Low),
            _ => Err(SprigError::Parse(format!("Invalid priority: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoryType {
    #[default]
    Feature,
    Bug,
    TechnicalDebt,
    Defect,
}

impl fmt::Display for StoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoryType::Feature => write!(f, "feature"),
            StoryType::Bug => write!(f, "bug"),
            StoryType::TechnicalDebt => write!(f, "technical_debt"),
            StoryType::Defect => write!(f, "defect"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ActionStatus {
    #[default]
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionStatus::Open => write!(f, "open"),
            ActionStatus::InProgress => write!(f, "in-progress"),
            ActionStatus::Completed => write!(f, "completed"),
            ActionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Retrospective feedback buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    WentWell,
    NotWell,
    Improve,
}

impl FeedbackCategory {
    pub const ALL: [FeedbackCategory; 3] = [
        FeedbackCategory::WentWell,
        FeedbackCategory::NotWell,
        FeedbackCategory::Improve,
    ];

    pub fn heading(&self) -> &'static str {
        match self {
            FeedbackCategory::WentWell => "What Went Well",
            FeedbackCategory::NotWell => "What Didn't Go Well",
            FeedbackCategory::Improve => "What Can We Improve",
        }
    }
}

impl fmt::Display for FeedbackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackCategory::WentWell => write!(f, "went_well"),
            FeedbackCategory::NotWell => write!(f, "not_well"),
            FeedbackCategory::Improve => write!(f, "improve"),
        }
    }
}

impl FromStr for FeedbackCategory {
    type Err = SprigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "went_well" | "well" => Ok(FeedbackCategory::WentWell),
            "not_well" | "didnt_go_well" => Ok(FeedbackCategory::NotWell),
            "improve" => Ok(FeedbackCategory::Improve),
            _ => Err(SprigError::Parse(format!(
                "Invalid category: {}. Use: went_well, not_well, or improve",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_category_parse() {
        assert_eq!(
            "went_well".parse::<FeedbackCategory>().unwrap(),
            FeedbackCategory::WentWell
        );
        assert_eq!(
            "not-well".parse::<FeedbackCategory>().unwrap(),
            FeedbackCategory::NotWell
        );
        assert!("meh".parse::<FeedbackCategory>().is_err());
    }

    #[test]
    fn test_priority_parse_aliases() {
        assert_eq!("H".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("normal".parse::<Priority>().unwrap(), Priority::Medium);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_sprint_status_roundtrip_display() {
        for status in [
            SprintStatus::Planning,
            SprintStatus::Active,
            SprintStatus::Completed,
        ] {
            assert_eq!(status.to_string().parse::<SprintStatus>().unwrap(), status);
        }
    }
}
