//! Command handlers

pub mod auth;
pub mod config_cmd;
pub mod history;
pub mod mapping;
pub mod schema;
pub mod sheets;
pub mod sync;
pub mod tables;

use anyhow::Result;

use crate::api::SyncApiClient;

/// Build an API client from the global configuration
pub(crate) async fn build_client() -> Result<SyncApiClient> {
    let config = crate::global_config();
    let token = config.api_token().await?;
    Ok(SyncApiClient::from_settings(&config.settings, token))
}
