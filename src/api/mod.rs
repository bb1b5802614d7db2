//! Client for the tour-operations sync backend
//!
//! Typed access to the `/sync/*` endpoints: worksheet listing, table schema
//! introspection (with retry and degraded-mode fallback), destination table
//! discovery, sync history, and the streaming sync run itself.

pub mod client;
pub mod error;
pub mod fallback;
pub mod models;
pub mod resilience;
pub mod schema;

pub use client::SyncApiClient;
pub use error::ApiError;
pub use models::{ColumnInfo, SheetInfo, SyncHistory, SyncRequest, TableInfo, filter_worksheets};
pub use resilience::{RetryConfig, RetryPolicy, RetryableError};
pub use schema::{SchemaInspector, SchemaOrigin, TableSchema};
