use crate::cli::commands::SprintAction;
use crate::model::Sprint;
use crate::storage::SprintStore;
use anyhow::Result;
use chrono::{Days, Utc};
use colored::Colorize;

use super::CommandContext;
use super::utils::{print_sprint, print_sprint_list};

/// Default sprint length when no end date is given.
const DEFAULT_SPRINT_DAYS: u64 = 13;

pub fn handle_sprint(ctx: &CommandContext, action: SprintAction) -> Result<()> {
    match action {
        SprintAction::Create {
            number,
            goal,
            team,
            start,
            end,
            capacity,
            json,
        } => {
            let team = team.unwrap_or_else(|| ctx.config.sprig.team.clone());
            let start = start.unwrap_or_else(|| Utc::now().date_naive());
            let end = match end {
                Some(end) => end,
                None => start
                    .checked_add_days(Days::new(DEFAULT_SPRINT_DAYS))
                    .ok_or_else(|| anyhow::anyhow!("Sprint end date out of range"))?,
            };

            let sprint = Sprint::new(team, number, goal, start, end).with_capacity(capacity);
            ctx.repo.create(&sprint)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&sprint)?);
            } else {
                println!(
                    "{} {} {} to {}",
                    "Created".green(),
                    sprint.session_id.cyan(),
                    sprint.start_date,
                    sprint.end_date
                );
            }
            Ok(())
        }
        SprintAction::List { json } => {
            let sprints = ctx.repo.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sprints)?);
            } else {
                print_sprint_list(&sprints);
            }
            Ok(())
        }
        SprintAction::Show { session, json } => {
            let sprint = ctx.sprint(session.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sprint)?);
            } else {
                print_sprint(&sprint);
            }
            Ok(())
        }
    }
}
