//! Column-mapping repository
//!
//! One stored mapping per destination table. A stored mapping always wins
//! over a freshly computed auto-map on reload; callers only recompute when
//! nothing is stored.

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::services::matching::ColumnMapping;

/// Load the stored mapping for a destination table (empty if none)
pub async fn get_column_mapping(pool: &SqlitePool, table: &str) -> Result<ColumnMapping> {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT source_column, target_column FROM column_mappings
         WHERE target_table = ?
         ORDER BY source_column",
    )
    .bind(table)
    .fetch_all(pool)
    .await
    .context("Failed to load column mapping")?;

    let mut mapping = ColumnMapping::new();
    for (source, target) in rows {
        mapping.insert_unchecked(source, target);
    }
    Ok(mapping)
}

/// Replace the whole stored mapping for a destination table
pub async fn replace_column_mapping(
    pool: &SqlitePool,
    table: &str,
    mapping: &ColumnMapping,
) -> Result<()> {
    debug_assert!(mapping.destinations_unique());
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query("DELETE FROM column_mappings WHERE target_table = ?")
        .bind(table)
        .execute(&mut *tx)
        .await
        .context("Failed to clear existing column mapping")?;

    for (source, target) in mapping.iter() {
        sqlx::query(
            "INSERT INTO column_mappings (target_table, source_column, target_column)
             VALUES (?, ?, ?)",
        )
        .bind(table)
        .bind(source)
        .bind(target)
        .execute(&mut *tx)
        .await
        .context("Failed to insert column mapping entry")?;
    }

    tx.commit().await.context("Failed to commit transaction")?;
    Ok(())
}

/// Set one entry, clearing any prior owner of the destination column first
/// (the editor rule, applied at rest).
pub async fn set_mapping_entry(
    pool: &SqlitePool,
    table: &str,
    source_column: &str,
    target_column: &str,
) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query("DELETE FROM column_mappings WHERE target_table = ? AND target_column = ?")
        .bind(table)
        .bind(target_column)
        .execute(&mut *tx)
        .await
        .context("Failed to clear prior owner of destination column")?;

    sqlx::query(
        "INSERT INTO column_mappings (target_table, source_column, target_column)
         VALUES (?, ?, ?)
         ON CONFLICT(target_table, source_column)
         DO UPDATE SET target_column = excluded.target_column",
    )
    .bind(table)
    .bind(source_column)
    .bind(target_column)
    .execute(&mut *tx)
    .await
    .context("Failed to set column mapping entry")?;

    tx.commit().await.context("Failed to commit transaction")?;
    Ok(())
}

/// Remove one entry by source column
pub async fn delete_mapping_entry(
    pool: &SqlitePool,
    table: &str,
    source_column: &str,
) -> Result<()> {
    sqlx::query("DELETE FROM column_mappings WHERE target_table = ? AND source_column = ?")
        .bind(table)
        .bind(source_column)
        .execute(pool)
        .await
        .context("Failed to delete column mapping entry")?;
    Ok(())
}

/// Drop the stored mapping for a destination table
pub async fn clear_column_mapping(pool: &SqlitePool, table: &str) -> Result<()> {
    sqlx::query("DELETE FROM column_mappings WHERE target_table = ?")
        .bind(table)
        .execute(pool)
        .await
        .context("Failed to clear column mapping")?;
    Ok(())
}
