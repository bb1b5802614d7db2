//! Configuration: user settings plus the SQLite store
//!
//! The store replaces what the admin web UI kept in browser-local storage
//! (per-table column mappings, the learned sync rate, the API token) with
//! explicit, migratable records owned by this process.

pub mod repository;
pub mod settings;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

pub use settings::Settings;

#[derive(Debug)]
pub struct Config {
    pub settings: Settings,
    pub pool: SqlitePool,
}

impl Config {
    /// Load settings, open the store, and run pending migrations
    pub async fn load() -> Result<Self> {
        let settings = Settings::load()?;
        let db_path = settings.database_path()?;
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await
            .with_context(|| format!("Failed to open configuration store at {}", db_path.display()))?;

        repository::migrations::run(&pool).await?;

        Ok(Self { settings, pool })
    }

    /// Bearer token for the streaming endpoint: environment first, store second
    pub async fn api_token(&self) -> Result<Option<String>> {
        if let Ok(token) = std::env::var(settings::ENV_TOKEN) {
            if !token.is_empty() {
                return Ok(Some(token));
            }
        }
        repository::options::get_string(&self.pool, repository::options::KEY_API_TOKEN).await
    }
}
