//! Streaming sheet-to-table sync
//!
//! One run at a time: the runner owns the single event stream, the decoder
//! turns chunks into events, the estimator turns events into a percentage
//! and ETA, and the presenter keeps the tagged run log and final counters.

pub mod presenter;
pub mod progress;
pub mod runner;
pub mod stream;
pub mod types;

pub use presenter::{LogLine, LogTag, SyncPresenter};
pub use progress::ProgressEstimator;
pub use runner::SyncRunner;
pub use stream::{DecodedLine, EventDecoder};
pub use types::{RunPhase, SyncEvent, SyncOutcome, SyncStats};
