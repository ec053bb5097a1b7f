use crate::generation::GenerationFailure;
use crate::session::GuardError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SprigError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sprint not found: {0}")]
    SprintNotFound(String),

    #[error("Story not found: {0}")]
    StoryNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error(transparent)]
    Generation(#[from] GenerationFailure),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML render error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Project not initialized. Run 'sprig init' first.")]
    NotInitialized,

    #[error("Project already initialized at {0}")]
    AlreadyInitialized(String),
}

pub type Result<T> = std::result::Result<T, SprigError>;
