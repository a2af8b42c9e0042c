// src/cli/mod.rs
use crate::cli::args::{Cli, Commands};
use crate::cli::error::CliResult;
use crate::config::Settings;
use crate::infrastructure::di::ServiceContainer;

pub mod args;
pub mod error;
pub mod import_commands;

pub fn execute_command(cli: Cli, settings: &Settings) -> CliResult<()> {
    if cli.generate_config {
        println!("{}", crate::config::generate_default_config());
        return Ok(());
    }

    match cli.command {
        Some(Commands::CreateDb { .. }) => import_commands::create_db(cli),
        Some(Commands::Import { .. }) => {
            import_commands::import(cli, &ServiceContainer::new(settings)?)
        }
        Some(Commands::ImportMode { .. }) => {
            import_commands::import_mode(cli, &ServiceContainer::new(settings)?)
        }
        Some(Commands::Entries { .. }) => {
            import_commands::entries(cli, &ServiceContainer::new(settings)?)
        }
        None => Ok(()),
    }
}
