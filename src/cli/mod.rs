//! Command-line interface definition

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "sheetsync",
    version,
    about = "Sync spreadsheet data into the tour operations database"
)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List a spreadsheet's sync-source worksheets
    Sheets(SheetsArgs),
    /// List destination tables
    Tables(TablesArgs),
    /// Show a destination table's columns
    Schema(SchemaArgs),
    /// Manage per-table column mappings
    Map {
        #[command(subcommand)]
        command: MapCommands,
    },
    /// Run a sheet-to-table sync
    Sync(SyncArgs),
    /// Show when a table was last synced from a spreadsheet
    History(HistoryArgs),
    /// Manage the API token
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Inspect local configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Args)]
pub struct SheetsArgs {
    /// Spreadsheet identifier
    pub spreadsheet: String,

    /// Include worksheets that do not carry the sync prefix
    #[arg(long)]
    pub all: bool,

    /// Print each worksheet's sample rows as JSON
    #[arg(long)]
    pub sample: bool,

    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct TablesArgs {
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Destination table name
    pub table: String,

    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Subcommand)]
pub enum MapCommands {
    /// Compute a mapping from the sheet headers (stored mapping wins unless --refresh)
    Auto(MapAutoArgs),
    /// Print the stored mapping for a table
    Show {
        /// Destination table name
        table: String,
    },
    /// Map one source column to one destination column
    Set {
        /// Destination table name
        table: String,
        /// Source sheet column
        source: String,
        /// Destination table column
        target: String,
    },
    /// Remove the entry for a source column
    Unset {
        /// Destination table name
        table: String,
        /// Source sheet column
        source: String,
    },
    /// Drop the stored mapping for a table
    Clear {
        /// Destination table name
        table: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Interactively edit the mapping for a table
    Edit(MapEditArgs),
}

#[derive(Debug, Args)]
pub struct MapAutoArgs {
    /// Spreadsheet identifier
    pub spreadsheet: String,
    /// Worksheet name
    pub sheet: String,
    /// Destination table name
    pub table: String,

    /// Persist the computed mapping
    #[arg(long)]
    pub save: bool,

    /// Recompute even when a stored mapping exists
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Debug, Args)]
pub struct MapEditArgs {
    /// Spreadsheet identifier
    pub spreadsheet: String,
    /// Worksheet name
    pub sheet: String,
    /// Destination table name
    pub table: String,
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Spreadsheet identifier
    pub spreadsheet: String,
    /// Worksheet to sync from
    pub sheet: String,
    /// Destination table name
    pub table: String,

    /// Delete every existing row in the destination table first.
    /// Irreversible; asks for confirmation unless --yes is given.
    #[arg(long)]
    pub truncate: bool,

    /// Let the destination skip rows unchanged since the last sync
    #[arg(long)]
    pub incremental: bool,

    /// Skip confirmation prompts (for scripted use)
    #[arg(long)]
    pub yes: bool,

    /// Directory to write the run log into after the run
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Suppress the live progress line
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Destination table name
    pub table: String,
    /// Spreadsheet identifier
    pub spreadsheet: String,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommands {
    /// Store the API token (prompts when not given)
    SetToken {
        /// Token value; omit to be prompted without echo
        token: Option<String>,
    },
    /// Report whether a token is configured and where it comes from
    Status,
    /// Remove the stored token
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the settings file and store locations
    Path,
    /// Print the effective settings
    Show,
}
