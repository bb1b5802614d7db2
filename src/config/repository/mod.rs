//! Repository layer for the SQLite configuration store

pub mod mappings;
pub mod migrations;
pub mod options;

#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    // A single connection so the in-memory database is shared
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    migrations::run(&pool).await.expect("migrations");
    pool
}
