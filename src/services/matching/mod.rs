// Matching service for computing sheet-to-table column mappings
//
// Pure business logic, decoupled from the CLI and the configuration store:
// ranking source headers per destination column and resolving a full
// default mapping. Persistence and the interactive editor live elsewhere.

pub mod core;
pub mod models;
pub mod synonyms;

pub use core::{MAX_SUGGESTIONS, auto_map, suggest};
pub use models::{ColumnMapping, MatchType, Suggestion};
