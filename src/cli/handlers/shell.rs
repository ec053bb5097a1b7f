use crate::assistant::Assistant;
use crate::cli::commands::{
    PlanningAction, RetroAction, ShellCommand, ShellLine, StandupAction,
};
use crate::error::SprigError;
use crate::model::{FeedbackCategory, Priority};
use crate::session::{ActionItemDraft, SessionKind};
use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use colored::Colorize;
use std::io::{self, BufRead, IsTerminal, Write};

use super::CommandContext;
use super::utils::print_session_status;

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

pub fn handle_shell(ctx: &CommandContext, session: Option<String>) -> Result<()> {
    let default_session = session.or_else(|| ctx.config.sprig.session.clone());
    let assistant =
        Assistant::from_config(&ctx.config, &ctx.root)?.with_default_session(default_session);

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    if interactive {
        println!(
            "{} Type {} for commands, {} to leave.",
            "sprig shell.".bold(),
            "help".cyan(),
            "exit".cyan()
        );
    }

    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            print!("{} ", "sprig>".green());
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };

        match run_line(&assistant, &line?) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(e) => eprintln!("{} {:#}", "error:".red(), e),
        }
    }

    tracing::debug!("Shell closed");
    Ok(())
}

fn run_line(assistant: &Assistant, line: &str) -> Result<Flow> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(Flow::Continue);
    }

    let tokens = split_line(line).map_err(|e| anyhow::anyhow!(e))?;
    let parsed = match ShellLine::try_parse_from(tokens) {
        Ok(parsed) => parsed,
        Err(e) => {
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                    e.print()?;
                }
                _ => eprint!("{}", e.render()),
            }
            return Ok(Flow::Continue);
        }
    };

    dispatch(assistant, parsed.command)
}

fn dispatch(assistant: &Assistant, command: ShellCommand) -> Result<Flow> {
    match command {
        ShellCommand::Standup { action } => standup(assistant, action)?,
        ShellCommand::Planning { action } => planning(assistant, action)?,
        ShellCommand::Retro { action } => retro(assistant, action)?,
        ShellCommand::Reset { kind, all } => {
            if all {
                let mut failed = 0;
                for (kind, result) in assistant.reset_all() {
                    match result {
                        Ok(()) => println!("{} {} session", "Reset".green(), kind),
                        Err(e) => {
                            failed += 1;
                            eprintln!("{} {}", "error:".red(), e);
                        }
                    }
                }
                tracing::info!(failed, "Reset all sessions");
            } else if let Some(kind) = kind {
                let kind: SessionKind = kind.into();
                assistant.reset(kind).map_err(SprigError::from)?;
                println!("{} {} session", "Reset".green(), kind);
            }
        }
        ShellCommand::Status { json } => {
            let statuses = assistant.status();
            if json {
                println!("{}", serde_json::to_string_pretty(&statuses)?);
            } else {
                print_session_status(&statuses);
            }
        }
        ShellCommand::Exit => return Ok(Flow::Exit),
    }
    Ok(Flow::Continue)
}

fn standup(assistant: &Assistant, action: StandupAction) -> Result<()> {
    match action {
        StandupAction::Start { session } => {
            let sprint = assistant.start_standup(session.as_deref())?;
            println!(
                "{} standup for {}",
                "Started".green(),
                sprint.session_id.cyan()
            );
        }
        StandupAction::Update {
            member,
            yesterday,
            today,
            blockers,
        } => {
            let count =
                assistant.submit_update(&member, &yesterday, &today, blockers.as_deref())?;
            println!("{} update from {} ({} so far)", "Recorded".green(), member, count);
        }
        StandupAction::Summary { json } => {
            let summary = assistant.generate_standup_summary()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }
            println!(
                "{}",
                format!("Standup summary, Sprint {}", summary.sprint.number).bold()
            );
            println!("{}", summary.summary);
            if !summary.blockers.is_empty() {
                println!();
                println!("{}", "Blockers".red().bold());
                for blocker in &summary.blockers {
                    println!("  - {}", blocker);
                }
            }
            if !summary.persisted {
                println!("{}", "Updates could not be saved.".yellow());
            }
            if summary.notified {
                println!("{}", "The team has been notified.".dimmed());
            }
        }
    }
    Ok(())
}

fn planning(assistant: &Assistant, action: PlanningAction) -> Result<()> {
    match action {
        PlanningAction::Start { session } => {
            let sprint = assistant.start_planning(session.as_deref())?;
            println!(
                "{} planning for {}",
                "Started".green(),
                sprint.session_id.cyan()
            );
        }
        PlanningAction::Estimate {
            story_id,
            points,
            by,
            reasoning,
            json,
        } => {
            let comparison = assistant.estimate_story(&story_id, points, &reasoning, &by)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
                return Ok(());
            }
            println!(
                "{} {}",
                comparison.story_id.cyan().bold(),
                comparison.story_title
            );
            println!("{}", comparison.ai_response);
            println!();
            println!("Team estimate: {} points", comparison.team_estimate);
            println!(
                "AI estimate:   {} points ({})",
                comparison.ai_estimate(),
                comparison.extraction.method_label()
            );
            if comparison.agrees() {
                println!("{}", "Estimates agree.".green());
            } else {
                println!(
                    "{}",
                    "Estimates differ. Finalize with --accept-ai to take the AI estimate."
                        .yellow()
                );
            }
        }
        PlanningAction::Finalize {
            story_id,
            accept_ai,
        } => {
            let estimation = assistant.finalize_estimate(&story_id, accept_ai)?;
            let source = if estimation.accepted_ai { "AI" } else { "team" };
            println!(
                "{} {} at {} points ({} estimate)",
                "Finalized".green(),
                estimation.story_id.cyan(),
                estimation.final_estimate,
                source
            );
        }
        PlanningAction::Plan { json } => {
            let outcome = assistant.generate_plan()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
                return Ok(());
            }
            println!(
                "{}",
                format!(
                    "Sprint {} plan: {} stories, {} points",
                    outcome.sprint.number, outcome.story_count, outcome.total_points
                )
                .bold()
            );
            println!("{}", outcome.plan);
        }
        PlanningAction::Approve {
            scrum_master,
            comments,
        } => {
            let approval = assistant.approve_plan(&scrum_master, comments.as_deref())?;
            print!("{}", approval.message());
        }
    }
    Ok(())
}

fn retro(assistant: &Assistant, action: RetroAction) -> Result<()> {
    match action {
        RetroAction::Start {
            session,
            facilitator,
        } => {
            let sprint = assistant.start_retrospective(session.as_deref(), &facilitator)?;
            println!(
                "{} retrospective for {}",
                "Started".green(),
                sprint.session_id.cyan()
            );
        }
        RetroAction::Feedback { category, text, by } => {
            let category: FeedbackCategory = category.into();
            let count = assistant.add_feedback(category, &text, &by)?;
            println!(
                "{} to {} ({} items)",
                "Added".green(),
                category.heading(),
                count
            );
        }
        RetroAction::Sentiment { score } => {
            let label = assistant.set_sentiment(score)?;
            println!("Sentiment set to {}/10 ({})", score, label);
        }
        RetroAction::Actions { items } => {
            let count = assistant.create_action_items(items)?;
            println!("{} {} action items", "Drafted".green(), count);
        }
        RetroAction::Summary { json } => {
            let summary = assistant.generate_retro_summary()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }
            println!(
                "{}",
                format!("Retrospective summary, Sprint {}", summary.sprint.number).bold()
            );
            println!("{}", summary.summary);
            println!();
            println!(
                "Sentiment: {}/10 ({})",
                summary.sentiment, summary.sentiment_label
            );
            for item in &summary.action_items {
                println!(
                    "  {} {} ({}, {})",
                    item.id.cyan(),
                    item.title,
                    item.assigned_to,
                    item.priority
                );
            }
        }
    }
    Ok(())
}

/// Split a shell line into arguments, honoring quotes and backslash escapes.
pub fn split_line(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) if c == q => quote = None,
            Some('"') if c == '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c == '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                    in_token = true;
                }
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return Err("Unterminated quote".to_string());
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Parse `TITLE:OWNER[:PRIORITY]`.
///
/// The last segment is only taken as the priority when it names one, so a
/// title may itself contain colons.
pub fn parse_action_item(input: &str) -> std::result::Result<ActionItemDraft, String> {
    let invalid = || {
        format!(
            "Invalid action item '{}': expected TITLE:OWNER[:PRIORITY]",
            input
        )
    };

    let mut segments = input.trim().rsplitn(3, ':');
    let last = segments.next().unwrap_or_default().trim();
    let middle = segments.next().ok_or_else(invalid)?;
    let head = segments.next();

    let (title, owner, priority) = match (head, last.parse::<Priority>()) {
        (Some(head), Ok(priority)) => (head.to_string(), middle.trim(), priority),
        (Some(head), Err(_)) => (format!("{}:{}", head, middle), last, Priority::default()),
        (None, _) => (middle.to_string(), last, Priority::default()),
    };

    let title = title.trim();
    if title.is_empty() || owner.is_empty() {
        return Err(invalid());
    }

    Ok(ActionItemDraft {
        title: title.to_string(),
        description: String::new(),
        assigned_to: owner.to_string(),
        priority,
        target_date: None,
    })
}
