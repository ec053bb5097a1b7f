use crate::error::{Result, SprigError};
use crate::generation::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = ".sprig.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SprigConfig {
    #[serde(default)]
    pub sprig: SprigSettings,

    #[serde(default)]
    pub generation: GenerationSettings,

    #[serde(default)]
    pub notify: NotifySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprigSettings {
    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default = "default_team")]
    pub team: String,

    /// Sprint session used when a session command omits one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

fn default_path() -> String {
    ".sprig".to_string()
}

fn default_team() -> String {
    "Alpha Team".to_string()
}

impl Default for SprigSettings {
    fn default() -> Self {
        Self {
            path: default_path(),
            team: default_team(),
            session: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_api_key_env() -> String {
    "GOOGLE_API_KEY".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    30
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GenerationSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_secs(self.retry_delay_secs),
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifySettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,

    /// Standup summaries are cut to this many characters before sending
    #[serde(default = "default_summary_limit")]
    pub summary_limit: usize,
}

fn default_summary_limit() -> usize {
    500
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            webhook_url: None,
            summary_limit: default_summary_limit(),
        }
    }
}

impl SprigConfig {
    pub fn load(start_path: &Path) -> Result<(Self, PathBuf)> {
        let config_path = Self::find_config_file(start_path)?;
        let config = Self::load_file(&config_path)?;
        let project_root = config_path
            .parent()
            .ok_or_else(|| SprigError::Config("Config file has no parent directory".to_string()))?
            .to_path_buf();
        Ok((config, project_root))
    }

    pub fn load_file(config_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(config_path)?;
        let config: SprigConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn find_config_file(start_path: &Path) -> Result<PathBuf> {
        let mut current = start_path.to_path_buf();
        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Ok(config_path);
            }
            if !current.pop() {
                return Err(SprigError::NotInitialized);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.generation.base_url).map_err(|e| {
            SprigError::Config(format!(
                "Invalid generation base_url '{}': {}",
                self.generation.base_url, e
            ))
        })?;

        if self.generation.max_attempts == 0 {
            return Err(SprigError::Config(
                "generation.max_attempts must be at least 1".to_string(),
            ));
        }

        if let Some(webhook) = &self.notify.webhook_url {
            url::Url::parse(webhook).map_err(|e| {
                SprigError::Config(format!("Invalid notify webhook_url '{}': {}", webhook, e))
            })?;
        }

        if self.notify.enabled && self.notify.webhook_url.is_none() {
            return Err(SprigError::Config(
                "notify.enabled is set but notify.webhook_url is missing".to_string(),
            ));
        }

        Ok(())
    }

    pub fn data_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.sprig.path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
