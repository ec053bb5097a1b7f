use crate::model::{Priority, Sprint, SprintStatus, Story};
use crate::session::{Phase, SessionStatus};
use colored::Colorize;

/// Format sprint status with color coding
pub fn format_sprint_status(status: SprintStatus) -> colored::ColoredString {
    match status {
        SprintStatus::Planning => "planning".yellow(),
        SprintStatus::Active => "active".green(),
        SprintStatus::Completed => "completed".dimmed(),
    }
}

/// Format priority with color coding
pub fn format_priority(priority: Priority) -> colored::ColoredString {
    match priority {
        Priority::High => "high".red(),
        Priority::Medium => "medium".white(),
        Priority::Low => "low".dimmed(),
    }
}

pub fn format_phase(phase: Phase) -> colored::ColoredString {
    match phase {
        Phase::NotStarted => "not started".dimmed(),
        Phase::Started => "in progress".yellow(),
        Phase::Finalized => "complete".green(),
    }
}

fn format_points(story: &Story) -> String {
    match (story.points, story.points_approved) {
        (Some(p), true) => format!("{:>2} pts", p).green().to_string(),
        (Some(p), false) => format!("{:>2} pts", p).yellow().to_string(),
        (None, _) => " - pts".dimmed().to_string(),
    }
}

/// Print a list of sprints (compact format)
pub fn print_sprint_list(sprints: &[Sprint]) {
    if sprints.is_empty() {
        println!("No sprints found.");
        return;
    }

    for sprint in sprints {
        println!(
            "{} {} {} to {} ({} stories) {}",
            sprint.session_id.cyan(),
            format_sprint_status(sprint.status),
            sprint.start_date,
            sprint.end_date,
            sprint.stories.len(),
            sprint.goal
        );
    }
}

/// Print a single sprint with details
pub fn print_sprint(sprint: &Sprint) {
    println!(
        "{} {}",
        sprint.session_id.cyan().bold(),
        format!("Sprint {}", sprint.number).bold()
    );
    println!("Team:     {}", sprint.team);
    println!("Status:   {}", format_sprint_status(sprint.status));
    println!("Dates:    {} to {}", sprint.start_date, sprint.end_date);
    if !sprint.goal.is_empty() {
        println!("Goal:     {}", sprint.goal);
    }
    if sprint.capacity > 0 {
        println!("Capacity: {} points", sprint.capacity);
    }
    if let Some(ref approver) = sprint.approved_by {
        let when = sprint
            .approved_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("Approved: {} {}", approver, when.dimmed());
    }

    println!();
    print_story_list(&sprint.stories);
}

pub fn print_story_list(stories: &[Story]) {
    if stories.is_empty() {
        println!("No stories found.");
        return;
    }

    for story in stories {
        println!(
            "{} {} [{}] {} {}",
            story.id.cyan(),
            format_points(story),
            format!("{}", story.story_type).blue(),
            format_priority(story.priority),
            story.title
        );
    }
}

pub fn print_session_status(statuses: &[SessionStatus]) {
    for status in statuses {
        let sprint = status.session_id.as_deref().unwrap_or("-");
        println!(
            "{:<14} {} {}",
            status.kind.title(),
            format_phase(status.phase),
            sprint.dimmed()
        );
    }
}
