use crate::config::{CONFIG_FILE_NAME, SprigConfig, SprigSettings};
use crate::error::SprigError;
use anyhow::Result;
use colored::Colorize;

pub fn handle_init(
    team: Option<String>,
    path: Option<String>,
    session: Option<String>,
) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config_path = cwd.join(CONFIG_FILE_NAME);

    if config_path.exists() {
        return Err(SprigError::AlreadyInitialized(config_path.display().to_string()).into());
    }

    let defaults = SprigSettings::default();
    let team = team.unwrap_or(defaults.team);
    crate::validation::validate_name(&team)?;
    if let Some(ref session) = session {
        crate::validation::validate_id(session)?;
    }

    let config = SprigConfig {
        sprig: SprigSettings {
            path: path.unwrap_or(defaults.path),
            team,
            session,
        },
        ..Default::default()
    };

    let data_path = config.data_path(&cwd);
    std::fs::create_dir_all(data_path.join("sprints"))?;

    config.save(&config_path)?;

    println!(
        "{} sprig project in {}",
        "Initialized".green(),
        cwd.display()
    );
    println!("  Config: {}", config_path.display());
    println!("  Data:   {}", data_path.display());

    Ok(())
}
