use anyhow::{Context, Result};
use clap::Parser;

use sprig::cli::handlers::{self, CommandContext};
use sprig::cli::{Cli, Commands};
use sprig::config::SprigConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();
    sprig::logging::init(cli.verbose, cli.log_file);

    match cli.command {
        Commands::Init {
            team,
            path,
            session,
        } => handlers::handle_init(team, path, session),
        Commands::Extract {
            text,
            file,
            fallback,
            json,
        } => handlers::handle_extract(text, file, fallback, json),
        Commands::Sprint { action } => handlers::handle_sprint(&load_context()?, action),
        Commands::Story { action } => handlers::handle_story(&load_context()?, action),
        Commands::Report { session, json } => {
            handlers::handle_report(&load_context()?, session, json)
        }
        Commands::Shell { session } => handlers::handle_shell(&load_context()?, session),
    }
}

fn load_context() -> Result<CommandContext> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let (config, root) = SprigConfig::load(&cwd).context("Failed to load configuration")?;
    tracing::debug!(root = %root.display(), "Loaded configuration");
    Ok(CommandContext::new(config, root))
}
