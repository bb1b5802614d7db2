use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How a source sheet column was matched to a destination column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    /// Case-insensitive name equality
    Exact,
    /// One name contains the other, case-insensitively
    Substring,
    /// Equal after stripping underscores ("customer_name" ≈ "customername")
    Normalized,
    /// Hit in the bilingual synonym table
    Synonym,
}

impl MatchType {
    /// Display label for match type
    pub fn label(&self) -> &'static str {
        match self {
            MatchType::Exact => "[Exact]",
            MatchType::Substring => "[Substring]",
            MatchType::Normalized => "[Normalized]",
            MatchType::Synonym => "[Synonym]",
        }
    }

    /// Relative confidence, used to order destination columns during
    /// auto-mapping. Mirrors the tier order of `suggest`.
    pub fn confidence(&self) -> f64 {
        match self {
            MatchType::Exact => 1.0,
            MatchType::Substring => 0.9,
            MatchType::Normalized => 0.8,
            MatchType::Synonym => 0.7,
        }
    }
}

/// One candidate source column for a destination column
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub source_column: String,
    pub match_type: MatchType,
}

impl Suggestion {
    pub fn new(source_column: impl Into<String>, match_type: MatchType) -> Self {
        Self {
            source_column: source_column.into(),
            match_type,
        }
    }
}

/// Mapping from source sheet column to destination table column.
///
/// Invariant: a destination column appears as a value at most once. Manual
/// edits go through [`ColumnMapping::assign`], which clears any prior owner
/// of the destination column before inserting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    entries: BTreeMap<String, String>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `source` to `destination`, removing any other entry that already
    /// points at `destination`.
    pub fn assign(&mut self, source: impl Into<String>, destination: impl Into<String>) {
        let destination = destination.into();
        self.entries.retain(|_, dest| *dest != destination);
        self.entries.insert(source.into(), destination);
    }

    /// Insert without clearing a prior owner. Only for loading records that
    /// already satisfy the invariant (the store enforces it at rest).
    pub fn insert_unchecked(&mut self, source: impl Into<String>, destination: impl Into<String>) {
        self.entries.insert(source.into(), destination.into());
    }

    pub fn remove_source(&mut self, source: &str) -> Option<String> {
        self.entries.remove(source)
    }

    pub fn destination_for(&self, source: &str) -> Option<&str> {
        self.entries.get(source).map(String::as_str)
    }

    pub fn source_for(&self, destination: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, dest)| dest.as_str() == destination)
            .map(|(source, _)| source.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when no destination column appears as a value more than once
    pub fn destinations_unique(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.entries.values().all(|dest| seen.insert(dest))
    }
}

impl FromIterator<(String, String)> for ColumnMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
