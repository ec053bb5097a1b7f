mod extract;
mod init;
mod report;
mod shell;
mod sprint;
mod story;
mod utils;

pub use extract::handle_extract;
pub use init::handle_init;
pub use report::{SprintReport, handle_report};
pub use shell::{handle_shell, parse_action_item, split_line};
pub use sprint::handle_sprint;
pub use story::handle_story;

use crate::config::SprigConfig;
use crate::model::Sprint;
use crate::storage::{SprintRepository, SprintStore};
use anyhow::{Result, anyhow};
use std::path::PathBuf;

/// Common context passed to all command handlers
pub struct CommandContext {
    pub config: SprigConfig,
    pub root: PathBuf,
    pub repo: SprintRepository,
}

impl CommandContext {
    pub fn new(config: SprigConfig, root: PathBuf) -> Self {
        let repo = SprintRepository::new(&config, &root);
        Self { config, root, repo }
    }

    /// The sprint named on the command line, else the configured default.
    pub fn sprint(&self, session: Option<&str>) -> Result<Sprint> {
        let session_id = session
            .or(self.config.sprig.session.as_deref())
            .ok_or_else(|| {
                anyhow!("No sprint session given. Pass one or set [sprig] session in .sprig.toml")
            })?;
        Ok(self.repo.get(session_id)?)
    }
}
