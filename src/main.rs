//! sheetsync: spreadsheet-to-database sync for tour operations
//!
//! A command-line client for the admin backend's `/sync/*` API: list
//! worksheets, inspect destination schemas, manage column mappings, and run
//! streaming sync jobs with live progress.

mod api;
mod cli;
mod config;
mod services;
mod sync;

use anyhow::Result;
use clap::Parser;
use is_terminal::IsTerminal;
use once_cell::sync::OnceCell;

use cli::{Cli, Commands};
use config::Config;

static CONFIG: OnceCell<Config> = OnceCell::new();

/// Global configuration, initialized once at startup
pub fn global_config() -> &'static Config {
    CONFIG.get().expect("configuration is initialized in main")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    if cli.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let config = Config::load().await?;
    let _ = CONFIG.set(config);

    match cli.command {
        Commands::Sheets(args) => cli::commands::sheets::handle(args).await,
        Commands::Tables(args) => cli::commands::tables::handle(args).await,
        Commands::Schema(args) => cli::commands::schema::handle(args).await,
        Commands::Map { command } => cli::commands::mapping::handle(command).await,
        Commands::Sync(args) => cli::commands::sync::handle(args).await,
        Commands::History(args) => cli::commands::history::handle(args).await,
        Commands::Auth { command } => cli::commands::auth::handle(command).await,
        Commands::Config { command } => cli::commands::config_cmd::handle(command).await,
    }
}
