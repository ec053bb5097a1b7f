use crate::model::{ActionStatus, Sprint, SprintStatus};
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use super::CommandContext;
use super::utils::format_sprint_status;

/// Everything recorded against one sprint, counted.
#[derive(Debug, Serialize)]
pub struct SprintReport {
    pub session_id: String,
    pub number: u32,
    pub status: SprintStatus,
    pub stories: usize,
    pub approved_stories: usize,
    pub approved_points: u32,
    pub capacity: u32,
    pub estimations: usize,
    pub estimations_accepted_ai: usize,
    pub estimations_agreed: usize,
    pub standups: usize,
    pub blockers: Vec<String>,
    pub retrospectives: usize,
    pub latest_sentiment: Option<u8>,
    pub open_action_items: Vec<String>,
}

impl SprintReport {
    pub fn from_sprint(sprint: &Sprint) -> Self {
        let blockers = sprint
            .standups
            .iter()
            .filter(|s| crate::session::StandupUpdate::is_blocker_text(&s.blockers))
            .map(|s| format!("{} ({}): {}", s.member, s.date, s.blockers))
            .collect();

        let open_action_items = sprint
            .retrospectives
            .iter()
            .flat_map(|r| r.action_items.iter())
            .filter(|a| matches!(a.status, ActionStatus::Open | ActionStatus::InProgress))
            .map(|a| format!("{} {} ({})", a.id, a.title, a.assigned_to))
            .collect();

        Self {
            session_id: sprint.session_id.clone(),
            number: sprint.number,
            status: sprint.status,
            stories: sprint.stories.len(),
            approved_stories: sprint.approved_stories().count(),
            approved_points: sprint.approved_points(),
            capacity: sprint.capacity,
            estimations: sprint.estimations.len(),
            estimations_accepted_ai: sprint.estimations.iter().filter(|e| e.accepted_ai).count(),
            estimations_agreed: sprint
                .estimations
                .iter()
                .filter(|e| e.team_estimate == e.ai_estimate)
                .count(),
            standups: sprint.standups.len(),
            blockers,
            retrospectives: sprint.retrospectives.len(),
            latest_sentiment: sprint.retrospectives.last().map(|r| r.sentiment),
            open_action_items,
        }
    }
}

pub fn handle_report(ctx: &CommandContext, session: Option<String>, json: bool) -> Result<()> {
    let sprint = ctx.sprint(session.as_deref())?;
    let report = SprintReport::from_sprint(&sprint);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {}",
        report.session_id.cyan().bold(),
        format_sprint_status(report.status)
    );
    println!();
    println!("{}", "Planning".bold());
    println!(
        "  Stories:     {} ({} approved)",
        report.stories, report.approved_stories
    );
    if report.capacity > 0 {
        println!(
            "  Points:      {} of {} capacity",
            report.approved_points, report.capacity
        );
    } else {
        println!("  Points:      {}", report.approved_points);
    }
    println!(
        "  Estimations: {} ({} agreed, {} took the AI estimate)",
        report.estimations, report.estimations_agreed, report.estimations_accepted_ai
    );

    println!();
    println!("{}", "Standups".bold());
    println!("  Updates:     {}", report.standups);
    if report.blockers.is_empty() {
        println!("  Blockers:    {}", "none".dimmed());
    } else {
        println!("  Blockers:");
        for blocker in &report.blockers {
            println!("    {} {}", "!".red(), blocker);
        }
    }

    println!();
    println!("{}", "Retrospectives".bold());
    println!("  Held:        {}", report.retrospectives);
    if let Some(score) = report.latest_sentiment {
        println!(
            "  Sentiment:   {}/10 ({})",
            score,
            crate::session::sentiment_label(score)
        );
    }
    if !report.open_action_items.is_empty() {
        println!("  Open action items:");
        for item in &report.open_action_items {
            println!("    - {}", item);
        }
    }

    Ok(())
}
