//! Run log and live counters for a sync run
//!
//! Consumes the event stream in arrival order and keeps: a monotonically
//! non-decreasing percentage, counters copied verbatim from the latest
//! progress event, and an append-only tagged log. PROGRESS lines are only
//! written at 10%-of-total checkpoints to bound log volume; everything else
//! is logged as it arrives. Filtering and export never touch run state.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use colored::Colorize;

use super::types::{SyncEvent, SyncStats};

/// Severity/kind tag on a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    Start,
    Progress,
    Info,
    Warn,
    Error,
    Result,
}

impl LogTag {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::Progress => "PROGRESS",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Result => "RESULT",
        }
    }

    fn colored_label(&self) -> String {
        match self {
            Self::Start => self.label().cyan().to_string(),
            Self::Progress => self.label().blue().to_string(),
            Self::Info => self.label().normal().to_string(),
            Self::Warn => self.label().yellow().to_string(),
            Self::Error => self.label().red().to_string(),
            Self::Result => self.label().green().bold().to_string(),
        }
    }
}

/// One line of the run log
#[derive(Debug, Clone)]
pub struct LogLine {
    pub at: DateTime<Local>,
    pub tag: LogTag,
    pub message: String,
}

impl LogLine {
    fn render_plain(&self) -> String {
        format!(
            "[{}] {:<8} {}",
            self.at.format("%H:%M:%S"),
            self.tag.label(),
            self.message
        )
    }

    pub fn render_colored(&self) -> String {
        format!(
            "[{}] {:<8} {}",
            self.at.format("%H:%M:%S").to_string().dimmed(),
            self.tag.colored_label(),
            self.message
        )
    }
}

/// Presenter state for one run
#[derive(Debug, Default)]
pub struct SyncPresenter {
    stats: SyncStats,
    percent: f64,
    log: Vec<LogLine>,
    /// Row count at which the next PROGRESS line is due
    next_checkpoint: u64,
    checkpoint_step: u64,
}

impl SyncPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one stream event, in arrival order
    pub fn handle_event(&mut self, event: &SyncEvent) {
        match event {
            SyncEvent::Start { total } => {
                self.stats.total = *total;
                self.checkpoint_step = (*total / 10).max(1);
                self.next_checkpoint = self.checkpoint_step;
                self.push(LogTag::Start, format!("sync started, {} rows to process", total));
            }
            SyncEvent::Progress {
                processed,
                total,
                inserted,
                updated,
                errors,
            } => {
                self.stats = SyncStats {
                    processed: *processed,
                    total: *total,
                    inserted: *inserted,
                    updated: *updated,
                    errors: *errors,
                };
                // Coarse checkpoints only, so a 10k-row run logs ~10 lines
                while self.checkpoint_step > 0 && *processed >= self.next_checkpoint {
                    self.push(
                        LogTag::Progress,
                        format!(
                            "{}/{} rows ({} inserted, {} updated, {} errors)",
                            processed, total, inserted, updated, errors
                        ),
                    );
                    self.next_checkpoint += self.checkpoint_step;
                }
            }
            SyncEvent::Info { message } => self.push(LogTag::Info, message.clone()),
            SyncEvent::Warn { message } => self.push(LogTag::Warn, message.clone()),
            SyncEvent::Error { message } => self.push(LogTag::Error, message.clone()),
            SyncEvent::Result { success, message, .. } => {
                let text = match (success, message) {
                    (true, Some(m)) => format!("sync finished: {}", m),
                    (true, None) => "sync finished".to_string(),
                    (false, Some(m)) => format!("sync failed: {}", m),
                    (false, None) => "sync failed".to_string(),
                };
                self.push(LogTag::Result, text);
            }
        }
    }

    /// Non-event diagnostics (e.g. a malformed stream line)
    pub fn note_warning(&mut self, message: impl Into<String>) {
        self.push(LogTag::Warn, message.into());
    }

    /// Monotone merge of a percentage computed elsewhere
    pub fn update_percent(&mut self, percent: f64) -> f64 {
        self.percent = self.percent.max(percent);
        self.percent
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Log lines, optionally restricted to one tag
    pub fn lines(&self, filter: Option<LogTag>) -> Vec<&LogLine> {
        self.log
            .iter()
            .filter(|line| filter.map_or(true, |tag| line.tag == tag))
            .collect()
    }

    /// Write the full log to `dir` as a timestamped text file
    pub fn export(&self, dir: &Path) -> Result<PathBuf> {
        let name = format!("sync-log-{}.txt", Local::now().format("%Y%m%d-%H%M%S"));
        let path = dir.join(name);
        let body: String = self
            .log
            .iter()
            .map(|line| format!("{}\n", line.render_plain()))
            .collect();
        std::fs::write(&path, body)
            .with_context(|| format!("Failed to write sync log to {}", path.display()))?;
        Ok(path)
    }

    fn push(&mut self, tag: LogTag, message: String) {
        self.log.push(LogLine {
            at: Local::now(),
            tag,
            message,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(processed: u64, total: u64, inserted: u64, updated: u64, errors: u64) -> SyncEvent {
        SyncEvent::Progress {
            processed,
            total,
            inserted,
            updated,
            errors,
        }
    }

    #[test]
    fn test_counts_track_latest_progress_event_verbatim() {
        let mut presenter = SyncPresenter::new();
        presenter.handle_event(&SyncEvent::Start { total: 10 });
        presenter.handle_event(&progress(4, 10, 3, 1, 0));
        presenter.handle_event(&progress(10, 10, 7, 3, 0));

        let stats = presenter.stats();
        assert_eq!(stats.processed, 10);
        assert_eq!(stats.inserted, 7);
        assert_eq!(stats.updated, 3);
        assert_eq!(stats.errors, 0);
    }

    #[test]
    fn test_percent_never_regresses() {
        let mut presenter = SyncPresenter::new();
        assert_eq!(presenter.update_percent(40.0), 40.0);
        assert_eq!(presenter.update_percent(25.0), 40.0);
        assert_eq!(presenter.update_percent(41.5), 41.5);
    }

    #[test]
    fn test_progress_lines_only_at_ten_percent_checkpoints() {
        let mut presenter = SyncPresenter::new();
        presenter.handle_event(&SyncEvent::Start { total: 100 });

        // 1..=9 rows: below the first checkpoint (10), no PROGRESS lines
        for processed in 1..10 {
            presenter.handle_event(&progress(processed, 100, processed, 0, 0));
        }
        assert_eq!(presenter.lines(Some(LogTag::Progress)).len(), 0);

        presenter.handle_event(&progress(10, 100, 10, 0, 0));
        assert_eq!(presenter.lines(Some(LogTag::Progress)).len(), 1);

        // Jumping several checkpoints at once emits the missed ones too
        presenter.handle_event(&progress(35, 100, 35, 0, 0));
        assert_eq!(presenter.lines(Some(LogTag::Progress)).len(), 3);
    }

    #[test]
    fn test_log_preserves_arrival_order_and_filters_by_tag() {
        let mut presenter = SyncPresenter::new();
        presenter.handle_event(&SyncEvent::Start { total: 2 });
        presenter.handle_event(&SyncEvent::Warn {
            message: "row 1 skipped".into(),
        });
        presenter.handle_event(&SyncEvent::Info {
            message: "halfway".into(),
        });
        presenter.note_warning("line 7 was malformed");

        let all = presenter.lines(None);
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].tag, LogTag::Start);

        let warns = presenter.lines(Some(LogTag::Warn));
        assert_eq!(warns.len(), 2);
        assert_eq!(warns[1].message, "line 7 was malformed");
    }

    #[test]
    fn test_export_writes_timestamped_file() {
        let mut presenter = SyncPresenter::new();
        presenter.handle_event(&SyncEvent::Start { total: 1 });
        presenter.handle_event(&SyncEvent::Result {
            success: true,
            message: Some("1 row".into()),
            details: None,
        });

        let dir = tempfile::tempdir().unwrap();
        let path = presenter.export(dir.path()).unwrap();
        let body = std::fs::read_to_string(&path).unwrap();
        assert!(path.file_name().unwrap().to_str().unwrap().starts_with("sync-log-"));
        assert!(body.contains("START"));
        assert!(body.contains("sync finished: 1 row"));
    }

    #[test]
    fn test_full_run_reaches_exact_counts() {
        // start{10}, five progress events, result{success} -> counts and 100%
        let mut presenter = SyncPresenter::new();
        presenter.handle_event(&SyncEvent::Start { total: 10 });
        for (p, i, u) in [(2, 2, 0), (4, 3, 1), (6, 5, 1), (8, 6, 2), (10, 7, 3)] {
            presenter.handle_event(&progress(p, 10, i, u, 0));
        }
        presenter.handle_event(&SyncEvent::Result {
            success: true,
            message: None,
            details: None,
        });
        presenter.update_percent(100.0);

        let stats = presenter.stats();
        assert_eq!(
            (stats.processed, stats.inserted, stats.updated, stats.errors),
            (10, 7, 3, 0)
        );
        assert_eq!(presenter.percent(), 100.0);
    }
}
