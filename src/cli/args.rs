// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Bulk import of read-it-later exports
pub struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Turn debugging information on
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Disable colored output
    #[arg(long = "no-color", help = "disable colored output")]
    pub no_color: bool,

    /// Print the default configuration and exit
    #[arg(long = "generate-config")]
    pub generate_config: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the entry database
    CreateDb {
        /// pathname to database file
        path: String,
    },
    /// Import an export file for a user
    Import {
        /// pathname to the export file
        path: PathBuf,

        #[arg(short = 'u', long = "user", value_parser = clap::value_parser!(i32).range(1..), help = "id of the importing user")]
        user_id: i32,

        #[arg(short = 's', long = "source", default_value = "instapaper", help = "format of the export file")]
        source: String,

        #[arg(long = "mark-as-read", help = "archive every imported entry")]
        mark_as_read: bool,

        #[arg(long = "disable-content-update", help = "do not fetch article content")]
        disable_content_update: bool,
    },
    /// Show or set the import mode: inline, redis, amqp
    ImportMode {
        /// new mode; shows the current mode if omitted
        mode: Option<String>,
    },
    /// List the entries of a user
    Entries {
        #[arg(short = 'u', long = "user", value_parser = clap::value_parser!(i32).range(1..), help = "id of the user")]
        user_id: i32,

        #[arg(long = "json", help = "output as json")]
        is_json: bool,
    },
}
