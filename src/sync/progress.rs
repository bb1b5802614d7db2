//! Progress percentage and ETA estimation for a sync run
//!
//! Purely cosmetic: nothing here affects what the destination does. The
//! estimator crawls toward 95% on a learned rows-per-second rate until real
//! progress events arrive, then follows them (capped at 99 until the
//! terminal result). The percentage never regresses.
//!
//! All methods take the caller's `elapsed` so tests never touch a clock.

use std::time::Duration;

/// Learned rate bounds, in milliseconds per row
pub const MIN_MS_PER_ROW: f64 = 3.0;
pub const MAX_MS_PER_ROW: f64 = 200.0;
pub const DEFAULT_MS_PER_ROW: f64 = 10.0;

/// Row-count guess when the selected sheet's count is unknown
pub const DEFAULT_ROW_ESTIMATE: u64 = 200;

/// Floor for the initial ETA
const MIN_ETA_MS: f64 = 1500.0;

/// Percentage ceiling for the pre-progress crawl
const CRAWL_CEILING: f64 = 95.0;

/// Percentage ceiling until the result event lands
const PROGRESS_CEILING: f64 = 99.0;

#[derive(Debug, Clone)]
pub struct ProgressEstimator {
    ms_per_row: f64,
    estimated_rows: u64,
    eta_ms: f64,
    percent: f64,
    total: Option<u64>,
    processed: u64,
    finished: bool,
}

impl ProgressEstimator {
    /// `estimated_rows` is usually the selected sheet's row count;
    /// `learned_ms_per_row` the persisted rate from the previous run.
    pub fn new(estimated_rows: Option<u64>, learned_ms_per_row: Option<f64>) -> Self {
        let ms_per_row = learned_ms_per_row
            .unwrap_or(DEFAULT_MS_PER_ROW)
            .clamp(MIN_MS_PER_ROW, MAX_MS_PER_ROW);
        let estimated_rows = estimated_rows.unwrap_or(DEFAULT_ROW_ESTIMATE);
        let eta_ms = (estimated_rows as f64 * ms_per_row).max(MIN_ETA_MS);
        Self {
            ms_per_row,
            estimated_rows,
            eta_ms,
            percent: 0.0,
            total: None,
            processed: 0,
            finished: false,
        }
    }

    /// Timer tick: advance toward 95% at the pace the ETA implies
    pub fn tick(&mut self, elapsed: Duration) -> f64 {
        if self.finished {
            return self.percent;
        }
        let implied = (elapsed.as_millis() as f64 / self.eta_ms) * 100.0;
        self.percent = self.percent.max(implied.min(CRAWL_CEILING));
        self.percent
    }

    /// The start event carries the authoritative row count; re-anchor the ETA
    pub fn on_start(&mut self, total: u64) {
        self.total = Some(total);
        self.estimated_rows = total;
        self.eta_ms = (total as f64 * self.ms_per_row).max(MIN_ETA_MS);
    }

    /// A progress event overrides the crawl with real numbers
    pub fn on_progress(&mut self, processed: u64, total: u64) -> f64 {
        self.processed = processed;
        if total > 0 {
            self.total = Some(total);
            let real = (processed as f64 / total as f64) * 100.0;
            self.percent = self.percent.max(real.min(PROGRESS_CEILING));
        }
        self.percent
    }

    /// Estimated time remaining: observed pace once any row has landed,
    /// the learned rate before that.
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        let total = self.total.unwrap_or(self.estimated_rows);
        let left = total.saturating_sub(self.processed);
        if self.processed > 0 {
            let per_row_ms = elapsed.as_millis() as f64 / self.processed as f64;
            Duration::from_millis((left as f64 * per_row_ms) as u64)
        } else {
            Duration::from_millis((left as f64 * self.ms_per_row) as u64)
        }
    }

    /// Only the terminal result event may push the bar to 100
    pub fn complete(&mut self) {
        self.finished = true;
        self.percent = 100.0;
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn eta(&self) -> Duration {
        Duration::from_millis(self.eta_ms as u64)
    }

    /// Rate to persist after a successful run
    pub fn learned_rate_after(&self, duration: Duration, inserted: u64, updated: u64) -> f64 {
        let rows = (inserted + updated).max(self.estimated_rows).max(1);
        (duration.as_millis() as f64 / rows as f64).clamp(MIN_MS_PER_ROW, MAX_MS_PER_ROW)
    }
}
