//! Sync run orchestration
//!
//! Drives one run through `Idle → Requesting → Streaming → {Completed |
//! Failed}`: opens the streaming endpoint, decodes events off the chunked
//! body, and feeds the estimator and presenter. A ~200ms ticker keeps the
//! progress bar moving between events. There is no mid-stream cancel; once
//! streaming starts the run ends at stream-end or transport failure, and
//! partial writes stay in the destination table.

use std::io::Write;
use std::time::Instant;

use futures::StreamExt;
use log::{debug, warn};

use super::presenter::SyncPresenter;
use super::progress::ProgressEstimator;
use super::stream::{DecodedLine, EventDecoder};
use super::types::{RunPhase, SyncEvent, SyncOutcome, SyncStats};
use crate::api::{ApiError, SyncApiClient, SyncRequest};

const TICK_MILLIS: u64 = 200;

/// Terminal result event, once seen on the stream
#[derive(Debug, Clone)]
struct ResultSeen {
    success: bool,
    message: Option<String>,
}

pub struct SyncRunner<'a> {
    client: &'a SyncApiClient,
    phase: RunPhase,
    render: bool,
}

impl<'a> SyncRunner<'a> {
    pub fn new(client: &'a SyncApiClient) -> Self {
        Self {
            client,
            phase: RunPhase::Idle,
            render: false,
        }
    }

    /// Draw a live progress line on stdout while streaming
    pub fn with_render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Execute one run to completion. `Err` means the stream could not be
    /// opened or broke mid-flight; a run that streamed to the end returns
    /// `Ok` with `outcome.success` reflecting the result event.
    pub async fn run(
        &mut self,
        request: &SyncRequest,
        estimator: &mut ProgressEstimator,
        presenter: &mut SyncPresenter,
    ) -> Result<SyncOutcome, ApiError> {
        self.phase = RunPhase::Requesting;
        let response = match self.client.start_sync_stream(request).await {
            Ok(response) => response,
            Err(err) => {
                self.phase = RunPhase::Failed;
                return Err(err);
            }
        };

        self.phase = RunPhase::Streaming;
        let started = Instant::now();
        let mut body = response.bytes_stream();
        let mut decoder = EventDecoder::new();
        let mut ticker = tokio::time::interval(std::time::Duration::from_millis(TICK_MILLIS));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut result_seen: Option<ResultSeen> = None;

        'stream: loop {
            tokio::select! {
                chunk = body.next() => match chunk {
                    Some(Ok(bytes)) => {
                        for decoded in decoder.feed(&bytes) {
                            apply_decoded(decoded, estimator, presenter, &mut result_seen);
                        }
                        if result_seen.is_some() {
                            // The result event is terminal by contract
                            break 'stream;
                        }
                    }
                    Some(Err(err)) => {
                        self.finish_render();
                        self.phase = RunPhase::Failed;
                        return Err(ApiError::Transport(err));
                    }
                    None => {
                        if decoder.pending_len() > 0 {
                            debug!("stream ended with {} buffered bytes", decoder.pending_len());
                        }
                        if let Some(decoded) = decoder.finish() {
                            apply_decoded(decoded, estimator, presenter, &mut result_seen);
                        }
                        break 'stream;
                    }
                },
                _ = ticker.tick() => {
                    let percent = estimator.tick(started.elapsed());
                    presenter.update_percent(percent);
                    if self.render {
                        render_progress(presenter.percent(), presenter.stats(), estimator, started);
                    }
                }
            }
        }

        self.finish_render();
        let duration = started.elapsed();
        let (phase, outcome) = finalize(result_seen, presenter, estimator, duration);
        self.phase = phase;
        Ok(outcome)
    }

    fn finish_render(&self) {
        if self.render {
            println!();
        }
    }
}

/// Route one decoded line into the estimator/presenter pair
fn apply_decoded(
    decoded: DecodedLine,
    estimator: &mut ProgressEstimator,
    presenter: &mut SyncPresenter,
    result_seen: &mut Option<ResultSeen>,
) {
    match decoded {
        DecodedLine::Event(event) => {
            match &event {
                SyncEvent::Start { total } => estimator.on_start(*total),
                SyncEvent::Progress {
                    processed, total, ..
                } => {
                    let percent = estimator.on_progress(*processed, *total);
                    presenter.update_percent(percent);
                }
                SyncEvent::Result { success, message, .. } => {
                    *result_seen = Some(ResultSeen {
                        success: *success,
                        message: message.clone(),
                    });
                }
                _ => {}
            }
            presenter.handle_event(&event);
        }
        DecodedLine::Malformed { line, error } => {
            warn!("malformed stream line ({}): {}", error, line);
            presenter.note_warning(format!("ignoring malformed stream line: {}", error));
        }
    }
}

/// Classify the end of the stream into a terminal phase and outcome
fn finalize(
    result_seen: Option<ResultSeen>,
    presenter: &mut SyncPresenter,
    estimator: &mut ProgressEstimator,
    duration: std::time::Duration,
) -> (RunPhase, SyncOutcome) {
    let stats = presenter.stats();
    match result_seen {
        Some(ResultSeen {
            success: true,
            message,
        }) => {
            estimator.complete();
            presenter.update_percent(100.0);
            (
                RunPhase::Completed,
                SyncOutcome {
                    success: true,
                    message: message.unwrap_or_else(|| "sync completed".to_string()),
                    stats,
                    duration,
                },
            )
        }
        Some(ResultSeen {
            success: false,
            message,
        }) => (
            RunPhase::Failed,
            SyncOutcome {
                success: false,
                message: message.unwrap_or_else(|| "the backend reported a failure".to_string()),
                stats,
                duration,
            },
        ),
        // Stream ended without a result event
        None => (
            RunPhase::Failed,
            SyncOutcome {
                success: false,
                message: "sync result not received".to_string(),
                stats,
                duration,
            },
        ),
    }
}

fn render_progress(
    percent: f64,
    stats: SyncStats,
    estimator: &ProgressEstimator,
    started: Instant,
) {
    let remaining = estimator.remaining(started.elapsed());
    print!(
        "\r  {:5.1}%  {}/{} rows  ({} inserted, {} updated, {} errors)  ~{}s left ",
        percent,
        stats.processed,
        stats.total,
        stats.inserted,
        stats.updated,
        stats.errors,
        remaining.as_secs()
    );
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_events(
        events: Vec<SyncEvent>,
        estimator: &mut ProgressEstimator,
        presenter: &mut SyncPresenter,
    ) -> Option<ResultSeen> {
        let mut result_seen = None;
        for event in events {
            apply_decoded(DecodedLine::Event(event), estimator, presenter, &mut result_seen);
        }
        result_seen
    }

    #[test]
    fn test_successful_run_reaches_final_counts_and_hundred_percent() {
        let mut estimator = ProgressEstimator::new(Some(10), None);
        let mut presenter = SyncPresenter::new();

        let events = vec![
            SyncEvent::Start { total: 10 },
            SyncEvent::Progress { processed: 2, total: 10, inserted: 2, updated: 0, errors: 0 },
            SyncEvent::Progress { processed: 4, total: 10, inserted: 3, updated: 1, errors: 0 },
            SyncEvent::Progress { processed: 6, total: 10, inserted: 5, updated: 1, errors: 0 },
            SyncEvent::Progress { processed: 8, total: 10, inserted: 6, updated: 2, errors: 0 },
            SyncEvent::Progress { processed: 10, total: 10, inserted: 7, updated: 3, errors: 0 },
            SyncEvent::Result { success: true, message: None, details: None },
        ];

        // Percentage stays below 100 while events are still arriving
        let result = feed_events(events, &mut estimator, &mut presenter);
        assert!(presenter.percent() < 100.0);

        let (phase, outcome) = finalize(
            result,
            &mut presenter,
            &mut estimator,
            std::time::Duration::from_millis(4000),
        );

        assert_eq!(phase, RunPhase::Completed);
        assert!(outcome.success);
        let stats = outcome.stats;
        assert_eq!(
            (stats.processed, stats.inserted, stats.updated, stats.errors),
            (10, 7, 3, 0)
        );
        assert_eq!(presenter.percent(), 100.0);
    }

    #[test]
    fn test_stream_end_without_result_is_a_failure() {
        let mut estimator = ProgressEstimator::new(Some(10), None);
        let mut presenter = SyncPresenter::new();

        let result = feed_events(
            vec![
                SyncEvent::Start { total: 10 },
                SyncEvent::Progress { processed: 5, total: 10, inserted: 5, updated: 0, errors: 0 },
            ],
            &mut estimator,
            &mut presenter,
        );
        assert!(result.is_none());

        let (phase, outcome) = finalize(
            result,
            &mut presenter,
            &mut estimator,
            std::time::Duration::from_secs(1),
        );
        assert_eq!(phase, RunPhase::Failed);
        assert!(!outcome.success);
        assert_eq!(outcome.message, "sync result not received");
        // Partial counts are still reported
        assert_eq!(outcome.stats.processed, 5);
        assert!(presenter.percent() < 100.0);
    }

    #[test]
    fn test_failed_result_surfaces_server_message() {
        let mut estimator = ProgressEstimator::new(Some(10), None);
        let mut presenter = SyncPresenter::new();

        let result = feed_events(
            vec![SyncEvent::Result {
                success: false,
                message: Some("destination table is locked".into()),
                details: None,
            }],
            &mut estimator,
            &mut presenter,
        );

        let (phase, outcome) = finalize(
            result,
            &mut presenter,
            &mut estimator,
            std::time::Duration::from_secs(1),
        );
        assert_eq!(phase, RunPhase::Failed);
        assert_eq!(outcome.message, "destination table is locked");
    }

    #[test]
    fn test_malformed_line_becomes_warning_without_aborting() {
        let mut estimator = ProgressEstimator::new(Some(10), None);
        let mut presenter = SyncPresenter::new();
        let mut result_seen = None;

        apply_decoded(
            DecodedLine::Malformed {
                line: "{broken".into(),
                error: "EOF while parsing".into(),
            },
            &mut estimator,
            &mut presenter,
            &mut result_seen,
        );

        assert!(result_seen.is_none());
        let warns = presenter.lines(Some(crate::sync::presenter::LogTag::Warn));
        assert_eq!(warns.len(), 1);
        assert!(warns[0].message.contains("malformed"));
    }
}
