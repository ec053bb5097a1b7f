use super::{Session, SprintRef};
use crate::error::{Result, SprigError};

pub type StandupSession = Session<StandupData>;

/// Replies that mean "no blocker".
const NO_BLOCKER_REPLIES: [&str; 3] = ["none", "no blockers", "nothing"];

#[derive(Debug, Clone, Default)]
pub struct StandupData {
    pub sprint: SprintRef,
    pub updates: Vec<StandupUpdate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandupUpdate {
    pub member: String,
    pub yesterday: String,
    pub today: String,
    pub blockers: String,
}

impl StandupUpdate {
    pub fn new(member: String, yesterday: String, today: String, blockers: Option<String>) -> Self {
        let blockers = blockers
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| "None".to_string());
        Self {
            member,
            yesterday,
            today,
            blockers,
        }
    }

    pub fn has_blocker(&self) -> bool {
        Self::is_blocker_text(&self.blockers)
    }

    /// Whether a blockers reply names an actual blocker.
    pub fn is_blocker_text(blockers: &str) -> bool {
        let reply = blockers.trim().to_lowercase();
        !NO_BLOCKER_REPLIES.contains(&reply.as_str())
    }
}

impl StandupSession {
    /// Append an update; returns how many updates have been collected.
    pub fn collect_update(&mut self, update: StandupUpdate) -> Result<usize> {
        let data = self.data_mut()?;
        tracing::info!(member = %update.member, "Standup update recorded");
        data.updates.push(update);
        Ok(data.updates.len())
    }

    /// `member: blocker` lines for every update that reported one.
    pub fn blockers(&self) -> Vec<String> {
        self.data()
            .updates
            .iter()
            .filter(|u| u.has_blocker())
            .map(|u| format!("{}: {}", u.member, u.blockers))
            .collect()
    }

    pub fn summary_prompt(&self) -> Result<String> {
        self.ensure_open()?;
        let data = self.data();
        if data.updates.is_empty() {
            return Err(SprigError::Validation(
                "No updates to summarize".to_string(),
            ));
        }

        let mut updates_text = String::new();
        for update in &data.updates {
            updates_text.push_str(&format!(
                "\n{}:\n  Yesterday: {}\n  Today: {}\n  Blockers: {}\n",
                update.member, update.yesterday, update.today, update.blockers
            ));
        }

        Ok(format!(
            r#"You are an AI Scrum Master. Generate a concise daily standup summary.

Sprint {sprint}
Team Updates:
{updates_text}

Create a summary that includes:

1. KEY HIGHLIGHTS
   - Main accomplishments from yesterday
   - Focus areas for today

2. BLOCKERS & ISSUES
   - List all blockers mentioned
   - Categorize by severity
   - Suggest immediate actions

3. TEAM VELOCITY
   - Overall progress assessment
   - Any concerns or risks

4. ACTION ITEMS
   - Specific follow-ups needed
   - Who needs to do what

Be concise and actionable."#,
            sprint = data.sprint.number,
        ))
    }
}
