//! Free-form options repository
//!
//! String key/value pairs for small persisted state: the learned
//! milliseconds-per-row sync rate and the API token. A malformed stored
//! value is logged and treated as absent so callers always get a usable
//! default.

use anyhow::{Context, Result};
use log::warn;
use sqlx::SqlitePool;

/// Learned sync rate in milliseconds per row
pub const KEY_MS_PER_ROW: &str = "sync.ms_per_row";
/// Bearer token for the streaming endpoint
pub const KEY_API_TOKEN: &str = "auth.token";

pub async fn get_string(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM options WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to read option {}", key))?;
    Ok(row.map(|(value,)| value))
}

pub async fn set_string(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO options (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to write option {}", key))?;
    Ok(())
}

pub async fn delete(pool: &SqlitePool, key: &str) -> Result<()> {
    sqlx::query("DELETE FROM options WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to delete option {}", key))?;
    Ok(())
}

/// Numeric option; a value that does not parse counts as absent
pub async fn get_f64(pool: &SqlitePool, key: &str) -> Result<Option<f64>> {
    match get_string(pool, key).await? {
        Some(raw) => match raw.parse::<f64>() {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!("option {} holds non-numeric value {:?}: {}", key, raw, err);
                Ok(None)
            }
        },
        None => Ok(None),
    }
}

pub async fn set_f64(pool: &SqlitePool, key: &str, value: f64) -> Result<()> {
    set_string(pool, key, &value.to_string()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::repository::test_pool;

    #[tokio::test]
    async fn test_string_roundtrip_and_overwrite() {
        let pool = test_pool().await;
        set_string(&pool, KEY_API_TOKEN, "first").await.unwrap();
        set_string(&pool, KEY_API_TOKEN, "second").await.unwrap();
        assert_eq!(
            get_string(&pool, KEY_API_TOKEN).await.unwrap().as_deref(),
            Some("second")
        );
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let pool = test_pool().await;
        assert_eq!(get_string(&pool, "nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_learned_rate_roundtrip() {
        let pool = test_pool().await;
        set_f64(&pool, KEY_MS_PER_ROW, 20.0).await.unwrap();
        assert_eq!(get_f64(&pool, KEY_MS_PER_ROW).await.unwrap(), Some(20.0));
    }

    #[tokio::test]
    async fn test_malformed_value_counts_as_absent() {
        let pool = test_pool().await;
        set_string(&pool, KEY_MS_PER_ROW, "not-a-number").await.unwrap();
        assert_eq!(get_f64(&pool, KEY_MS_PER_ROW).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_removes_key() {
        let pool = test_pool().await;
        set_string(&pool, KEY_API_TOKEN, "secret").await.unwrap();
        delete(&pool, KEY_API_TOKEN).await.unwrap();
        assert_eq!(get_string(&pool, KEY_API_TOKEN).await.unwrap(), None);
    }
}
