//! Wire types for the `/sync/*` backend API
//!
//! Field names on the wire are camelCase (the backend is shared with the
//! admin web UI); everything here renames accordingly.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ApiError;
use crate::services::matching::ColumnMapping;

/// Standard `{success, data, error}` envelope used by every endpoint
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the payload, turning `success: false` into [`ApiError::Server`]
    /// with the server-supplied message verbatim.
    pub fn into_data(self) -> Result<T, ApiError> {
        if self.success {
            self.data
                .ok_or_else(|| ApiError::Server("response contained no data".to_string()))
        } else {
            let message = self
                .error
                .or(self.message)
                .unwrap_or_else(|| "the backend reported a failure".to_string());
            Err(ApiError::Server(message))
        }
    }
}

/// One worksheet of the source spreadsheet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetInfo {
    pub name: String,
    #[serde(default)]
    pub row_count: u64,
    /// Header row, in sheet order
    #[serde(default)]
    pub columns: Vec<String>,
    /// Bounded sample of rows, keyed by header name
    #[serde(default)]
    pub sample_data: Vec<serde_json::Map<String, Value>>,
    /// Per-sheet failure; a broken worksheet does not abort the listing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SheetsPayload {
    pub sheets: Vec<SheetInfo>,
}

/// Keep only worksheets whose name starts with the configured prefix.
/// An empty prefix keeps everything.
pub fn filter_worksheets(sheets: Vec<SheetInfo>, prefix: &str) -> Vec<SheetInfo> {
    if prefix.is_empty() {
        return sheets;
    }
    sheets
        .into_iter()
        .filter(|sheet| sheet.name.starts_with(prefix))
        .collect()
}

/// One column of a destination table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub name: String,
    /// SQL-ish type descriptor, e.g. "text", "timestamp with time zone"
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<String>,
}

impl ColumnInfo {
    pub fn new(name: &str, data_type: &str, nullable: bool, default: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable,
            default: default.map(str::to_string),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SchemaPayload {
    pub columns: Vec<ColumnInfo>,
    /// Where the backend got the columns from ("information_schema", ...)
    #[serde(default)]
    pub source: Option<String>,
}

/// A destination table the backend can sync into
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInfo {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TablesPayload {
    pub tables: Vec<TableInfo>,
}

/// Last-run bookkeeping for a (table, spreadsheet) pair
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncHistory {
    #[serde(default)]
    pub last_sync_time: Option<String>,
}

/// Everything the streaming endpoint needs for one run. Immutable once
/// built; `truncate_table` is the user-opted-in destructive flag.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub target_table: String,
    pub column_mapping: ColumnMapping,
    pub truncate_table: bool,
    pub enable_incremental_sync: bool,
}
