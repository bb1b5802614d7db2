//! Schema migrations for the configuration store
//!
//! Versioned through `PRAGMA user_version`: every entry in [`MIGRATIONS`]
//! runs once, in order, and the pragma records how far a database has come.
//! Append-only: never edit an entry that has shipped.

use anyhow::{Context, Result};
use sqlx::SqlitePool;

const MIGRATIONS: &[&str] = &[
    // v1: per-table column mappings. The unique index on
    // (target_table, target_column) enforces "a destination column is
    // mapped at most once" at rest.
    "CREATE TABLE IF NOT EXISTS column_mappings (
        target_table TEXT NOT NULL,
        source_column TEXT NOT NULL,
        target_column TEXT NOT NULL,
        PRIMARY KEY (target_table, source_column),
        UNIQUE (target_table, target_column)
    )",
    // v2: free-form string options (learned sync rate, API token)
    "CREATE TABLE IF NOT EXISTS options (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )",
];

/// Bring the store up to the current schema version
pub async fn run(pool: &SqlitePool) -> Result<()> {
    let (version,): (i64,) = sqlx::query_as("PRAGMA user_version")
        .fetch_one(pool)
        .await
        .context("Failed to read store schema version")?;

    for (index, statement) in MIGRATIONS.iter().enumerate().skip(version as usize) {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Migration {} failed", index + 1))?;
        sqlx::query(&format!("PRAGMA user_version = {}", index + 1))
            .execute(pool)
            .await
            .context("Failed to record store schema version")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::repository::test_pool;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = test_pool().await;
        // test_pool already ran them once
        run(&pool).await.unwrap();

        let (version,): (i64,) = sqlx::query_as("PRAGMA user_version")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(version as usize, MIGRATIONS.len());
    }
}
