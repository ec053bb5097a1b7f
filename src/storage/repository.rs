use super::SprintStore;
use crate::{
    config::SprigConfig,
    error::{Result, SprigError},
    model::Sprint,
    validation,
};
use slug::slugify;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tempfile::NamedTempFile;

pub struct SprintRepository {
    sprints_path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl SprintRepository {
    pub fn new(config: &SprigConfig, project_root: &Path) -> Self {
        Self::at(config.data_path(project_root).join("sprints"))
    }

    pub fn at(sprints_path: PathBuf) -> Self {
        Self {
            sprints_path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.sprints_path
    }

    pub fn generate_filename(session_id: &str) -> String {
        format!("{}.toml", slugify(session_id))
    }

    fn file_path(&self, session_id: &str) -> Result<PathBuf> {
        validation::validate_id(session_id)?;
        Ok(self.sprints_path.join(Self::generate_filename(session_id)))
    }

    fn read(&self, path: &Path, session_id: &str) -> Result<Sprint> {
        if !path.exists() {
            return Err(SprigError::SprintNotFound(session_id.to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let sprint: Sprint = toml::from_str(&content)?;
        Ok(sprint)
    }

    fn write(&self, path: &Path, sprint: &Sprint) -> Result<()> {
        std::fs::create_dir_all(&self.sprints_path)?;
        let content = toml::to_string_pretty(sprint)?;
        atomic_write(path, &content)
    }
}

impl SprintStore for SprintRepository {
    fn get(&self, session_id: &str) -> Result<Sprint> {
        let path = self.file_path(session_id)?;
        self.read(&path, session_id)
    }

    fn list(&self) -> Result<Vec<Sprint>> {
        if !self.sprints_path.exists() {
            return Ok(Vec::new());
        }

        let mut sprints = Vec::new();
        for entry in std::fs::read_dir(&self.sprints_path)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_file() && path.extension().map(|e| e == "toml").unwrap_or(false) {
                match std::fs::read_to_string(&path) {
                    Ok(content) => match toml::from_str::<Sprint>(&content) {
                        Ok(sprint) => sprints.push(sprint),
                        Err(e) => tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse sprint file"
                        ),
                    },
                    Err(e) => tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read sprint file"
                    ),
                }
            }
        }

        sprints.sort_by(|a, b| a.team.cmp(&b.team).then(a.number.cmp(&b.number)));
        Ok(sprints)
    }

    fn create(&self, sprint: &Sprint) -> Result<()> {
        tracing::info!(session_id = %sprint.session_id, "Creating sprint");

        validation::validate_name(&sprint.team)?;
        validation::validate_body("Goal", &sprint.goal)?;
        if sprint.end_date < sprint.start_date {
            return Err(SprigError::Validation(
                "Sprint end date is before its start date".to_string(),
            ));
        }

        let path = self.file_path(&sprint.session_id)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if path.exists() {
            return Err(SprigError::Storage(format!(
                "Sprint already exists: {}",
                sprint.session_id
            )));
        }
        self.write(&path, sprint)
    }

    fn update(
        &self,
        session_id: &str,
        mutation: &mut dyn FnMut(&mut Sprint) -> Result<()>,
    ) -> Result<Sprint> {
        let path = self.file_path(session_id)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut sprint = self.read(&path, session_id)?;
        mutation(&mut sprint)?;
        sprint.touch();
        self.write(&path, &sprint)?;

        tracing::debug!(session_id = %session_id, "Sprint updated");
        Ok(sprint)
    }
}

/// Write to a temp file in the target's directory, then rename over the target.
fn atomic_write(target_path: &Path, content: &str) -> Result<()> {
    // Same directory as the target, required for an atomic rename
    let target_dir = target_path
        .parent()
        .ok_or_else(|| SprigError::Storage("Target path has no parent directory".to_string()))?;

    let mut temp_file = NamedTempFile::new_in(target_dir)
        .map_err(|e| SprigError::Storage(format!("Failed to create temp file: {}", e)))?;

    use std::io::Write;
    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| SprigError::Storage(format!("Failed to write to temp file: {}", e)))?;

    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| SprigError::Storage(format!("Failed to sync temp file: {}", e)))?;

    temp_file
        .persist(target_path)
        .map_err(|e| SprigError::Storage(format!("Failed to persist temp file: {}", e)))?;

    Ok(())
}
