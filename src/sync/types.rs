//! Core data types for streaming sync runs
//!
//! A run is one POST to the streaming endpoint whose response body is a
//! newline-delimited sequence of [`SyncEvent`]s, delivered and consumed
//! strictly in emission order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// One event on the sync stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SyncEvent {
    /// The destination accepted the run and counted the source rows
    Start { total: u64 },
    /// Periodic row-level progress
    Progress {
        processed: u64,
        total: u64,
        #[serde(default)]
        inserted: u64,
        #[serde(default)]
        updated: u64,
        #[serde(default)]
        errors: u64,
    },
    Info { message: String },
    Warn { message: String },
    Error { message: String },
    /// Terminal event; a stream that ends without one is a failed run
    Result {
        success: bool,
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        details: Option<Value>,
    },
}

/// Lifecycle of one sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    /// Request sent, waiting for the chunked response to open
    Requesting,
    /// Decoding events off the response body
    Streaming,
    Completed,
    Failed,
}

impl RunPhase {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Requesting => "requesting",
            Self::Streaming => "streaming",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Row counters, taken verbatim from the most recent progress event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub processed: u64,
    pub total: u64,
    pub inserted: u64,
    pub updated: u64,
    pub errors: u64,
}

/// Terminal summary of a run
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub success: bool,
    pub message: String,
    pub stats: SyncStats,
    pub duration: Duration,
}
