use crate::cli::commands::StoryAction;
use crate::model::Story;
use crate::storage::SprintStore;
use crate::validation;
use anyhow::Result;
use colored::Colorize;

use super::CommandContext;
use super::utils::print_story_list;

pub fn handle_story(ctx: &CommandContext, action: StoryAction) -> Result<()> {
    match action {
        StoryAction::Add {
            title,
            session,
            description,
            criteria,
            r#type,
            priority,
            assign,
            json,
        } => {
            validation::validate_title(&title)?;
            validation::validate_body("Description", &description)?;
            validation::validate_body("Acceptance criteria", &criteria)?;

            let sprint = ctx.sprint(session.as_deref())?;
            let mut added = None;
            ctx.repo.update(&sprint.session_id, &mut |s| {
                let mut story = Story::new(s.next_story_id(), title.clone())
                    .with_description(description.clone())
                    .with_acceptance_criteria(criteria.clone())
                    .with_type(r#type.into())
                    .with_priority(priority.into());
                story.assigned_to = assign.clone();
                s.stories.push(story.clone());
                added = Some(story);
                Ok(())
            })?;

            let Some(story) = added else {
                anyhow::bail!("Story was not added");
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&story)?);
            } else {
                println!(
                    "{} {} in {}",
                    "Added".green(),
                    story.id.cyan(),
                    sprint.session_id
                );
            }
            Ok(())
        }
        StoryAction::List { session, json } => {
            let sprint = ctx.sprint(session.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sprint.stories)?);
            } else {
                print_story_list(&sprint.stories);
            }
            Ok(())
        }
    }
}
