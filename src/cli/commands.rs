use crate::estimate::EstimateValue;
use crate::session::SessionKind;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sprig")]
#[command(
    author,
    version,
    about = "A CLI sprint assistant for standups, planning and retrospectives"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write JSON logs to this file, rotated daily
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new sprig project
    Init {
        /// Team name
        #[arg(long)]
        team: Option<String>,

        /// Data directory, relative to the project root
        #[arg(long)]
        path: Option<String>,

        /// Default sprint session for session commands
        #[arg(long)]
        session: Option<String>,
    },

    /// Extract a story point estimate from model output
    Extract {
        /// Text to scan (reads stdin when neither this nor --file is given)
        text: Option<String>,

        /// Read the text from a file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Value returned when no estimate is found
        #[arg(short, long, default_value = "3")]
        fallback: EstimateValue,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage sprints
    Sprint {
        #[command(subcommand)]
        action: SprintAction,
    },

    /// Manage user stories
    Story {
        #[command(subcommand)]
        action: StoryAction,
    },

    /// Summarize everything recorded against a sprint
    Report {
        /// Sprint session id (defaults to the configured session)
        session: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run standup, planning and retrospective sessions interactively
    Shell {
        /// Sprint session used when a session command omits one
        #[arg(long)]
        session: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SprintAction {
    /// Create a sprint
    #[command(visible_alias = "new")]
    Create {
        /// Sprint number
        number: u32,

        /// Sprint goal
        #[arg(short, long, default_value = "")]
        goal: String,

        /// Team name (defaults to the configured team)
        #[arg(long)]
        team: Option<String>,

        /// First day, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last day, YYYY-MM-DD (defaults to two weeks after the start)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Team capacity in story points
        #[arg(long, default_value_t = 0)]
        capacity: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List sprints
    #[command(visible_alias = "ls")]
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a sprint and its stories
    Show {
        /// Sprint session id (defaults to the configured session)
        session: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum StoryAction {
    /// Add a story to a sprint
    Add {
        /// Story title
        title: String,

        /// Sprint session id (defaults to the configured session)
        #[arg(long)]
        session: Option<String>,

        /// Story description
        #[arg(short = 'd', long, default_value = "")]
        description: String,

        /// Acceptance criteria
        #[arg(long, default_value = "")]
        criteria: String,

        /// Story type
        #[arg(short = 't', long, value_enum, default_value = "feature")]
        r#type: StoryTypeArg,

        /// Priority level
        #[arg(short, long, value_enum, default_value = "medium")]
        priority: PriorityArg,

        /// Assignee
        #[arg(long)]
        assign: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List a sprint's stories
    #[command(visible_alias = "ls")]
    List {
        /// Sprint session id (defaults to the configured session)
        #[arg(long)]
        session: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StoryTypeArg {
    Feature,
    Bug,
    TechnicalDebt,
    Defect,
}

impl From<StoryTypeArg> for crate::model::StoryType {
    fn from(arg: StoryTypeArg) -> Self {
        match arg {
            StoryTypeArg::Feature => crate::model::StoryType::Feature,
            StoryTypeArg::Bug => crate::model::StoryType::Bug,
            StoryTypeArg::TechnicalDebt => crate::model::StoryType::TechnicalDebt,
            StoryTypeArg::Defect => crate::model::StoryType::Defect,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PriorityArg {
    High,
    Medium,
    Low,
}

impl From<PriorityArg> for crate::model::Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::High => crate::model::Priority::High,
            PriorityArg::Medium => crate::model::Priority::Medium,
            PriorityArg::Low => crate::model::Priority::Low,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FeedbackCategoryArg {
    WentWell,
    NotWell,
    Improve,
}

impl From<FeedbackCategoryArg> for crate::model::FeedbackCategory {
    fn from(arg: FeedbackCategoryArg) -> Self {
        match arg {
            FeedbackCategoryArg::WentWell => crate::model::FeedbackCategory::WentWell,
            FeedbackCategoryArg::NotWell => crate::model::FeedbackCategory::NotWell,
            FeedbackCategoryArg::Improve => crate::model::FeedbackCategory::Improve,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SessionKindArg {
    Standup,
    Planning,
    #[value(alias = "retro")]
    Retrospective,
}

impl From<SessionKindArg> for SessionKind {
    fn from(arg: SessionKindArg) -> Self {
        match arg {
            SessionKindArg::Standup => SessionKind::Standup,
            SessionKindArg::Planning => SessionKind::Planning,
            SessionKindArg::Retrospective => SessionKind::Retrospective,
        }
    }
}

/// One line typed into `sprig shell`.
#[derive(Parser)]
#[command(
    name = "sprig>",
    no_binary_name = true,
    disable_version_flag = true
)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand)]
pub enum ShellCommand {
    /// Daily standup
    Standup {
        #[command(subcommand)]
        action: StandupAction,
    },

    /// Sprint planning
    Planning {
        #[command(subcommand)]
        action: PlanningAction,
    },

    /// Sprint retrospective
    #[command(visible_alias = "retrospective")]
    Retro {
        #[command(subcommand)]
        action: RetroAction,
    },

    /// Reset a session, unless it is complete
    Reset {
        /// Session to reset
        #[arg(value_enum, required_unless_present = "all")]
        kind: Option<SessionKindArg>,

        /// Reset every session
        #[arg(long, conflicts_with = "kind")]
        all: bool,
    },

    /// Show the state of every session
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Leave the shell
    #[command(visible_alias = "quit")]
    Exit,
}

#[derive(Subcommand)]
pub enum StandupAction {
    /// Start a standup for a sprint
    Start {
        /// Sprint session id (defaults to the configured session)
        session: Option<String>,
    },

    /// Record one team member's update
    Update {
        /// Team member
        member: String,

        /// What was done yesterday
        #[arg(long)]
        yesterday: String,

        /// What is planned today
        #[arg(long)]
        today: String,

        /// Anything blocking progress
        #[arg(long)]
        blockers: Option<String>,
    },

    /// Generate the standup summary and complete the standup
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum PlanningAction {
    /// Start sprint planning
    Start {
        /// Sprint session id (defaults to the configured session)
        session: Option<String>,
    },

    /// Compare the team's estimate for a story with the model's
    Estimate {
        /// Story id, e.g. US-001
        story_id: String,

        /// Team estimate: 1, 2, 3, 5, 8 or 13
        points: EstimateValue,

        /// Who estimated
        #[arg(long)]
        by: String,

        /// The team's reasoning
        #[arg(long, default_value = "")]
        reasoning: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Store the final estimate for a story
    Finalize {
        /// Story id
        story_id: String,

        /// Use the model's estimate instead of the team's
        #[arg(long)]
        accept_ai: bool,
    },

    /// Draft the sprint plan from the approved stories
    Plan {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Approve the plan and complete planning
    Approve {
        /// Approving scrum master
        scrum_master: String,

        /// Approval comments
        #[arg(long)]
        comments: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum RetroAction {
    /// Start a retrospective
    Start {
        /// Sprint session id (defaults to the configured session)
        session: Option<String>,

        /// Facilitator
        #[arg(long)]
        facilitator: String,
    },

    /// Add one piece of feedback
    Feedback {
        #[arg(value_enum)]
        category: FeedbackCategoryArg,

        /// The feedback itself
        text: String,

        /// Who gave it
        #[arg(long)]
        by: String,
    },

    /// Set team sentiment, 1 to 10
    Sentiment {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=10))]
        score: u8,
    },

    /// Replace the action items, each given as TITLE:OWNER[:PRIORITY]
    Actions {
        #[arg(long = "item", required = true, value_parser = super::handlers::parse_action_item)]
        items: Vec<crate::session::ActionItemDraft>,
    },

    /// Generate the retrospective summary and complete the retrospective
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
