//! HTTP client for the sync backend
//!
//! One thin method per endpoint. Every request carries a correlation id so
//! a run can be traced through the backend logs; responses are mapped onto
//! the [`ApiError`] taxonomy before anything else sees them.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::error::ApiError;
use super::models::{
    ApiEnvelope, SchemaPayload, SheetInfo, SheetsPayload, SyncHistory, SyncRequest, TableInfo,
    TablesPayload,
};
use super::schema::SchemaSource;
use crate::config::settings::Settings;

const CORRELATION_HEADER: &str = "x-correlation-id";

/// Client for the `/sync/*` endpoints
#[derive(Debug, Clone)]
pub struct SyncApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    sheets_timeout: Duration,
    request_timeout: Duration,
}

impl SyncApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            sheets_timeout: Duration::from_secs(35),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn from_settings(settings: &Settings, token: Option<String>) -> Self {
        let mut client = Self::new(settings.api_base_url.clone(), token);
        client.sheets_timeout = Duration::from_secs(settings.sheets_timeout_secs);
        client.request_timeout = Duration::from_secs(settings.request_timeout_secs);
        client
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn correlated(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let correlation_id = Uuid::new_v4();
        debug!("request correlation id {}", correlation_id);
        builder.header(CORRELATION_HEADER, correlation_id.to_string())
    }

    /// List all worksheets of a spreadsheet. Bounded by the sheets timeout
    /// (~35s); prefix filtering is the caller's concern.
    pub async fn fetch_sheets(&self, spreadsheet_id: &str) -> Result<Vec<SheetInfo>, ApiError> {
        let request = self
            .correlated(self.http.post(self.url("/sync/sheets")))
            .json(&serde_json::json!({ "spreadsheetId": spreadsheet_id }))
            .send();

        let response = match tokio::time::timeout(self.sheets_timeout, request).await {
            Ok(result) => result?,
            Err(_) => return Err(ApiError::Timeout(self.sheets_timeout)),
        };

        let payload: SheetsPayload = Self::parse_envelope(Self::check_status(response)?).await?;
        Ok(payload.sheets)
    }

    /// Raw schema fetch, one attempt, no client-side deadline; retry and
    /// per-attempt budgets belong to [`super::schema::SchemaInspector`].
    pub async fn fetch_schema_once(&self, table: &str) -> Result<SchemaPayload, ApiError> {
        let url = format!("{}?table={}", self.url("/sync/schema"), urlencoding::encode(table));
        let response = self.correlated(self.http.get(url)).send().await?;
        Self::parse_envelope(Self::check_status(response)?).await
    }

    /// List destination tables available for syncing
    pub async fn fetch_tables(&self) -> Result<Vec<TableInfo>, ApiError> {
        let response = self
            .correlated(self.http.get(self.url("/sync/all-tables")))
            .timeout(self.request_timeout)
            .send()
            .await?;
        let payload: TablesPayload = Self::parse_envelope(Self::check_status(response)?).await?;
        Ok(payload.tables)
    }

    /// Server-side mapping suggestions. The response is only ever logged at
    /// debug level; the local mapper is authoritative.
    pub async fn fetch_mapping_suggestions(
        &self,
        sheet_columns: &[String],
        table: &str,
    ) -> Result<serde_json::Value, ApiError> {
        let url = format!(
            "{}?sheetColumns={}&tableName={}",
            self.url("/sync/tables"),
            urlencoding::encode(&sheet_columns.join(",")),
            urlencoding::encode(table)
        );
        let response = self
            .correlated(self.http.get(url))
            .timeout(self.request_timeout)
            .send()
            .await?;
        let body = Self::check_status(response)?
            .json::<serde_json::Value>()
            .await?;
        Ok(body)
    }

    /// Last sync time for a (table, spreadsheet) pair
    pub async fn fetch_history(
        &self,
        table: &str,
        spreadsheet_id: &str,
    ) -> Result<SyncHistory, ApiError> {
        let url = format!(
            "{}?table={}&spreadsheetId={}",
            self.url("/sync/history"),
            urlencoding::encode(table),
            urlencoding::encode(spreadsheet_id)
        );
        let response = self
            .correlated(self.http.get(url))
            .timeout(self.request_timeout)
            .send()
            .await?;
        Self::parse_envelope(Self::check_status(response)?).await
    }

    /// Open the streaming sync endpoint. Returns the raw response; the
    /// caller owns decoding the newline-delimited event body.
    pub async fn start_sync_stream(&self, request: &SyncRequest) -> Result<Response, ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::MissingToken)?;
        let response = self
            .correlated(self.http.post(self.url("/sync/flexible/stream")))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        Self::check_status(response)
    }

    /// Map 403/404 and other non-success statuses onto the taxonomy
    fn check_status(response: Response) -> Result<Response, ApiError> {
        match response.status() {
            StatusCode::FORBIDDEN => Err(ApiError::PermissionDenied),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            status if !status.is_success() => Err(ApiError::Status(status)),
            _ => Ok(response),
        }
    }

    async fn parse_envelope<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let bytes = response.bytes().await?;
        let envelope: ApiEnvelope<T> =
            serde_json::from_slice(&bytes).map_err(ApiError::Decode)?;
        envelope.into_data()
    }
}

#[async_trait]
impl SchemaSource for SyncApiClient {
    async fn fetch_schema(&self, table: &str) -> Result<SchemaPayload, ApiError> {
        self.fetch_schema_once(table).await
    }
}
