//! Best-effort chat notifications.
//!
//! Session operations report their outcome through a [`Notifier`]. Delivery
//! never affects the operation: [`dispatch`] logs a failure and moves on.

use crate::config::NotifySettings;
use crate::error::{Result, SprigError};
use serde_json::json;
use std::time::Duration;

/// At most this many feedback items are listed per retrospective section.
const MAX_LISTED_ITEMS: usize = 5;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    StandupSummary {
        sprint_number: u32,
        summary: String,
        blockers: Vec<String>,
    },
    PlanningComplete {
        sprint_number: u32,
        total_points: u32,
        story_count: usize,
        approved_by: String,
    },
    RetrospectiveSummary {
        sprint_number: u32,
        went_well: Vec<String>,
        needs_improvement: Vec<String>,
    },
    ActionItemsCreated {
        sprint_number: u32,
        /// `(id, title, owner)`
        items: Vec<(String, String, String)>,
    },
}

fn bullet_list(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        return empty.to_string();
    }
    items
        .iter()
        .take(MAX_LISTED_ITEMS)
        .map(|i| format!("- {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::StandupSummary { .. } => "standup_summary",
            Notification::PlanningComplete { .. } => "planning_complete",
            Notification::RetrospectiveSummary { .. } => "retrospective_summary",
            Notification::ActionItemsCreated { .. } => "action_items_created",
        }
    }

    /// Plain-text rendering of the message.
    pub fn render(&self) -> String {
        match self {
            Notification::StandupSummary {
                sprint_number,
                summary,
                blockers,
            } => format!(
                "Sprint {} Daily Standup\n\nSummary:\n{}\n\nBlockers:\n{}",
                sprint_number,
                summary,
                bullet_list(blockers, "None reported")
            ),
            Notification::PlanningComplete {
                sprint_number,
                total_points,
                story_count,
                approved_by,
            } => format!(
                "Sprint {} Planning Complete\n{} stories, {} points\nApproved by {}. The sprint is ready to start!",
                sprint_number, story_count, total_points, approved_by
            ),
            Notification::RetrospectiveSummary {
                sprint_number,
                went_well,
                needs_improvement,
            } => format!(
                "Sprint {} Retrospective Summary\n\nWhat Went Well:\n{}\n\nNeeds Improvement:\n{}",
                sprint_number,
                bullet_list(went_well, "No items provided"),
                bullet_list(needs_improvement, "No items provided")
            ),
            Notification::ActionItemsCreated {
                sprint_number,
                items,
            } => {
                let lines: Vec<String> = items
                    .iter()
                    .map(|(id, title, owner)| format!("- {} {} (owner: {})", id, title, owner))
                    .collect();
                format!(
                    "Sprint {} Action Items ({})\n{}",
                    sprint_number,
                    items.len(),
                    lines.join("\n")
                )
            }
        }
    }
}

pub trait Notifier: Send + Sync {
    fn is_enabled(&self) -> bool;

    fn send(&self, notification: &Notification) -> Result<()>;
}

impl<T: Notifier + ?Sized> Notifier for std::sync::Arc<T> {
    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }

    fn send(&self, notification: &Notification) -> Result<()> {
        (**self).send(notification)
    }
}

/// Used when notifications are turned off.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNotifier;

impl Notifier for DisabledNotifier {
    fn is_enabled(&self) -> bool {
        false
    }

    fn send(&self, _notification: &Notification) -> Result<()> {
        Ok(())
    }
}

/// Posts `{"text": ...}` to an incoming-webhook URL.
pub struct WebhookNotifier {
    url: String,
    http: reqwest::blocking::Client,
}

impl WebhookNotifier {
    pub fn new(url: &str) -> Result<Self> {
        url::Url::parse(url)
            .map_err(|e| SprigError::Config(format!("Invalid webhook URL '{}': {}", url, e)))?;
        Ok(Self {
            url: url.to_string(),
            http: crate::http::blocking_client(WEBHOOK_TIMEOUT)?,
        })
    }
}

impl Notifier for WebhookNotifier {
    fn is_enabled(&self) -> bool {
        true
    }

    fn send(&self, notification: &Notification) -> Result<()> {
        let response = self
            .http
            .post(&self.url)
            .json(&json!({ "text": notification.render() }))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SprigError::Notify(format!(
                "webhook returned HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }
        Ok(())
    }
}

/// Build the notifier the settings ask for.
pub fn from_settings(settings: &NotifySettings) -> Result<Box<dyn Notifier>> {
    match (&settings.webhook_url, settings.enabled) {
        (Some(url), true) => Ok(Box::new(WebhookNotifier::new(url)?)),
        _ => Ok(Box::new(DisabledNotifier)),
    }
}

/// Send without letting a failure escape. Returns whether it was delivered.
pub fn dispatch(notifier: &dyn Notifier, notification: &Notification) -> bool {
    if !notifier.is_enabled() {
        tracing::debug!(kind = notification.kind(), "Notifications disabled, skipping");
        return false;
    }
    match notifier.send(notification) {
        Ok(()) => {
            tracing::info!(kind = notification.kind(), "Notification sent");
            true
        }
        Err(e) => {
            tracing::warn!(kind = notification.kind(), error = %e, "Failed to send notification");
            false
        }
    }
}

/// First `limit` characters of `text`.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingNotifier;
    use super::*;

    fn planning() -> Notification {
        Notification::PlanningComplete {
            sprint_number: 3,
            total_points: 21,
            story_count: 4,
            approved_by: "sam".to_string(),
        }
    }

    #[test]
    fn test_dispatch_swallows_failure() {
        let notifier = RecordingNotifier::failing();
        assert!(!dispatch(&notifier, &planning()));
        assert_eq!(notifier.sent().len(), 1);
    }

    #[test]
    fn test_dispatch_success() {
        let notifier = RecordingNotifier::default();
        assert!(dispatch(&notifier, &planning()));
    }

    #[test]
    fn test_disabled_notifier_skips() {
        assert!(!dispatch(&DisabledNotifier, &planning()));
    }

    #[test]
    fn test_from_settings_disabled_without_flag() {
        let mut settings = NotifySettings::default();
        settings.webhook_url = Some("https://hooks.example.com/x".to_string());
        assert!(!from_settings(&settings).unwrap().is_enabled());

        settings.enabled = true;
        assert!(from_settings(&settings).unwrap().is_enabled());
    }

    #[test]
    fn test_render_standup_lists_blockers() {
        let text = Notification::StandupSummary {
            sprint_number: 3,
            summary: "All good".to_string(),
            blockers: vec!["bob: CI is down".to_string()],
        }
        .render();
        assert!(text.starts_with("Sprint 3 Daily Standup"));
        assert!(text.contains("- bob: CI is down"));
    }

    #[test]
    fn test_render_retro_caps_items() {
        let went_well: Vec<String> = (1..=8).map(|i| format!("item {}", i)).collect();
        let text = Notification::RetrospectiveSummary {
            sprint_number: 3,
            went_well,
            needs_improvement: Vec::new(),
        }
        .render();
        assert!(text.contains("- item 5"));
        assert!(!text.contains("- item 6"));
        assert!(text.contains("No items provided"));
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
