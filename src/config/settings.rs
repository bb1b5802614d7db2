//! User settings: TOML file with environment overrides
//!
//! The file lives at `<config dir>/sheetsync/config.toml`; every field has
//! a default so a missing or partial file just works. `SHEETSYNC_API_URL`
//! and `SHEETSYNC_TOKEN`-style environment variables (loaded via dotenvy in
//! main) take precedence for scripted use.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const ENV_API_URL: &str = "SHEETSYNC_API_URL";
pub const ENV_SHEET_PREFIX: &str = "SHEETSYNC_SHEET_PREFIX";
pub const ENV_TOKEN: &str = "SHEETSYNC_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the backend, up to and including the API root
    pub api_base_url: String,
    /// Only worksheets whose name starts with this prefix are sync sources
    pub sheet_prefix: String,
    /// Budget for the whole worksheet listing call
    pub sheets_timeout_secs: u64,
    /// Budget for ordinary GET endpoints
    pub request_timeout_secs: u64,
    /// Override for the SQLite store location
    pub data_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api".to_string(),
            sheet_prefix: "S".to_string(),
            sheets_timeout_secs: 35,
            request_timeout_secs: 30,
            data_dir: None,
        }
    }
}

impl Settings {
    pub fn config_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sheetsync").join("config.toml"))
    }

    /// Read the settings file (if any) and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut settings = match Self::config_file() {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                toml::from_str(&content)
                    .with_context(|| format!("Invalid settings in {}", path.display()))?
            }
            _ => Self::default(),
        };

        if let Ok(url) = std::env::var(ENV_API_URL) {
            settings.api_base_url = url;
        }
        if let Ok(prefix) = std::env::var(ENV_SHEET_PREFIX) {
            settings.sheet_prefix = prefix;
        }
        Ok(settings)
    }

    /// Location of the SQLite configuration store
    pub fn database_path(&self) -> Result<PathBuf> {
        let dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .context("Could not determine a data directory for this platform")?
                .join("sheetsync"),
        };
        Ok(dir.join("sheetsync.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sensible() {
        let settings = Settings::default();
        assert_eq!(settings.sheet_prefix, "S");
        assert_eq!(settings.sheets_timeout_secs, 35);
    }

    #[test]
    fn test_partial_file_fills_missing_fields_from_defaults() {
        let settings: Settings =
            toml::from_str("api_base_url = \"https://admin.example.com/api\"").unwrap();
        assert_eq!(settings.api_base_url, "https://admin.example.com/api");
        assert_eq!(settings.sheet_prefix, "S");
    }

    #[test]
    fn test_database_path_honors_data_dir_override() {
        let settings = Settings {
            data_dir: Some(PathBuf::from("/tmp/sheetsync-test")),
            ..Settings::default()
        };
        assert_eq!(
            settings.database_path().unwrap(),
            PathBuf::from("/tmp/sheetsync-test/sheetsync.db")
        );
    }
}
