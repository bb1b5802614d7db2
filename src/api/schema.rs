//! Destination-table schema lookup with degraded-mode fallback
//!
//! Live lookup runs under [`RetryConfig::schema_lookup`] (15s budget, one
//! retry at 25s). When both attempts fail the inspector substitutes the
//! static column list for known tables, and an empty list otherwise, so the
//! mapping workflow never blocks on the schema endpoint.

use async_trait::async_trait;
use log::{debug, warn};

use super::error::ApiError;
use super::fallback::fallback_columns;
use super::models::{ColumnInfo, SchemaPayload};
use super::resilience::{RetryConfig, RetryPolicy};

/// Where a table's column list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOrigin {
    /// The live schema endpoint answered
    Live,
    /// The static per-table fallback was used
    Fallback,
    /// Both attempts failed and no fallback exists for the table
    Empty,
}

impl SchemaOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Fallback => "fallback",
            Self::Empty => "unavailable",
        }
    }
}

/// A destination table's columns plus their provenance
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<ColumnInfo>,
    pub origin: SchemaOrigin,
}

impl TableSchema {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// Seam over the live schema endpoint, so the retry/fallback flow is
/// testable without a network.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    async fn fetch_schema(&self, table: &str) -> Result<SchemaPayload, ApiError>;
}

/// Retry-then-fallback schema lookup
pub struct SchemaInspector<'a, S: SchemaSource> {
    source: &'a S,
    policy: RetryPolicy,
}

impl<'a, S: SchemaSource> SchemaInspector<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            policy: RetryPolicy::new(RetryConfig::schema_lookup()),
        }
    }

    pub fn with_policy(source: &'a S, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    /// Never fails: degrades to the fallback list, then to an empty list.
    pub async fn inspect(&self, table: &str) -> TableSchema {
        let live = self
            .policy
            .execute(|attempt| {
                debug!("schema lookup for {} (attempt {})", table, attempt);
                self.source.fetch_schema(table)
            })
            .await;

        match live {
            Ok(payload) => {
                debug!(
                    "schema for {} from {} ({} columns)",
                    table,
                    payload.source.as_deref().unwrap_or("live endpoint"),
                    payload.columns.len()
                );
                TableSchema {
                    table: table.to_string(),
                    columns: payload.columns,
                    origin: SchemaOrigin::Live,
                }
            }
            Err(err) => {
                warn!("schema lookup for {} failed: {}", table, err);
                match fallback_columns(table) {
                    Some(columns) => TableSchema {
                        table: table.to_string(),
                        columns,
                        origin: SchemaOrigin::Fallback,
                    },
                    None => TableSchema {
                        table: table.to_string(),
                        columns: Vec::new(),
                        origin: SchemaOrigin::Empty,
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted schema source: pops one canned answer per call
    struct ScriptedSource {
        answers: Mutex<Vec<Result<SchemaPayload, ApiError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedSource {
        fn new(answers: Vec<Result<SchemaPayload, ApiError>>) -> Self {
            let mut answers = answers;
            answers.reverse();
            Self {
                answers: Mutex::new(answers),
                calls: Mutex::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl SchemaSource for ScriptedSource {
        async fn fetch_schema(&self, _table: &str) -> Result<SchemaPayload, ApiError> {
            *self.calls.lock().unwrap() += 1;
            self.answers
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(ApiError::Server("script exhausted".into())))
        }
    }

    fn live_payload() -> SchemaPayload {
        SchemaPayload {
            columns: vec![ColumnInfo::new("id", "uuid", false, None)],
            source: Some("information_schema".into()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success_skips_retry() {
        let source = ScriptedSource::new(vec![Ok(live_payload())]);
        let schema = SchemaInspector::new(&source).inspect("reservations").await;
        assert_eq!(schema.origin, SchemaOrigin::Live);
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_retries_exactly_once_then_succeeds() {
        let source = ScriptedSource::new(vec![
            Err(ApiError::Server("success:false".into())),
            Ok(live_payload()),
        ]);
        let policy = RetryPolicy::new(RetryConfig::schema_lookup());
        let schema = SchemaInspector::with_policy(&source, policy)
            .inspect("reservations")
            .await;
        assert_eq!(schema.origin, SchemaOrigin::Live);
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_attempts_fail_falls_back_to_static_list() {
        let source = ScriptedSource::new(vec![
            Err(ApiError::Server("down".into())),
            Err(ApiError::Server("still down".into())),
        ]);
        let schema = SchemaInspector::new(&source).inspect("reservations").await;
        assert_eq!(schema.origin, SchemaOrigin::Fallback);
        assert_eq!(source.call_count(), 2);
        assert!(schema.column_names().contains(&"customer_name".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_table_degrades_to_empty_list() {
        let source = ScriptedSource::new(vec![
            Err(ApiError::Server("down".into())),
            Err(ApiError::Server("still down".into())),
        ]);
        let schema = SchemaInspector::new(&source).inspect("audit_log").await;
        assert_eq!(schema.origin, SchemaOrigin::Empty);
        assert!(schema.columns.is_empty());
    }
}
