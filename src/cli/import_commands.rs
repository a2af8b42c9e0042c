// src/cli/import_commands.rs
use crate::application::services::import_service::ImportRequest;
use crate::cli::args::{Cli, Commands};
use crate::cli::error::{CliError, CliResult};
use crate::domain::import::{ImportMode, ImportOptions, ImportSource};
use crate::domain::report::ImportReport;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::json::{write_entries_as_json, JsonEntryView};
use crate::infrastructure::repositories::sqlite::repository::SqliteEntryRepository;
use crossterm::style::Stylize;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, instrument};

#[instrument(skip(cli))]
pub fn create_db(cli: Cli) -> CliResult<()> {
    let Some(Commands::CreateDb { path }) = cli.command else {
        return Ok(());
    };

    if Path::new(&path).exists() {
        return Err(CliError::InvalidInput(format!(
            "Database already exists at: {}. Please choose a different path or delete the existing file.",
            path
        )));
    }

    println!("Creating new database at: {}", path);

    // Creates parent directories and runs all migrations
    SqliteEntryRepository::from_url(&path)?;

    println!("Database created successfully at: {}", path);
    Ok(())
}

#[instrument(skip(cli, services))]
pub fn import(cli: Cli, services: &ServiceContainer) -> CliResult<()> {
    let Some(Commands::Import {
        path,
        user_id,
        source,
        mark_as_read,
        disable_content_update,
    }) = cli.command
    else {
        return Ok(());
    };

    let source = ImportSource::from_str(&source)
        .map_err(|e| CliError::InvalidInput(e.to_string()))?;

    // A missing file is reported like an upload without file
    let content = if path.exists() {
        Some(fs::read(&path)?)
    } else {
        debug!("Export file not found: {}", path.display());
        None
    };

    let request = ImportRequest {
        user_id,
        source,
        content,
        options: ImportOptions {
            mark_as_read,
            disable_content_update,
        },
    };

    let report = services.import_service.import(request);
    print_report(&report);

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::ImportFailed(report.notice_key().to_string()))
    }
}

fn print_report(report: &ImportReport) {
    match report {
        ImportReport::Summary(summary) => {
            println!("{}", report.to_string().green());
            println!(
                "mode: {}, imported: {}, skipped: {}, failed: {}, queued: {}",
                summary.mode, summary.imported, summary.skipped, summary.failed, summary.queued
            );
        }
        ImportReport::Failed(_) => eprintln!("{}", report.to_string().red()),
    }
    println!("notice: {}", report.notice_key());
}

#[instrument(skip(cli, services))]
pub fn import_mode(cli: Cli, services: &ServiceContainer) -> CliResult<()> {
    let Some(Commands::ImportMode { mode }) = cli.command else {
        return Ok(());
    };

    match mode {
        Some(mode) => {
            let mode = ImportMode::from_str(&mode)
                .map_err(|e| CliError::InvalidInput(e.to_string()))?;
            services.import_service.set_mode(mode)?;
            eprintln!("Import mode set to {}", mode.to_string().green());
        }
        None => println!("{}", services.import_service.current_mode()),
    }
    Ok(())
}

#[instrument(skip(cli, services))]
pub fn entries(cli: Cli, services: &ServiceContainer) -> CliResult<()> {
    let Some(Commands::Entries { user_id, is_json }) = cli.command else {
        return Ok(());
    };

    let entries = services.import_service.entries_for_user(user_id)?;

    if is_json {
        write_entries_as_json(&JsonEntryView::from_domain_collection(&entries))?;
        return Ok(());
    }

    for entry in &entries {
        let flags = match (entry.is_archived, entry.is_starred) {
            (true, true) => " [archived, starred]",
            (true, false) => " [archived]",
            (false, true) => " [starred]",
            (false, false) => "",
        };
        println!("{}{}", entry, flags.yellow());
    }
    eprintln!("{} entries", entries.len());
    Ok(())
}
