//! Core matching functions for sheet-to-table column mapping

use std::collections::HashSet;

use super::models::{ColumnMapping, MatchType, Suggestion};
use super::synonyms::synonyms_for;

/// Upper bound on suggestions per destination column
pub const MAX_SUGGESTIONS: usize = 5;

/// Rank source sheet columns as candidates for `destination_column`.
///
/// Tiers run in order (exact, substring, underscore-normalized, synonym)
/// and each tier appends to the result, so an exact match is always first.
/// Duplicates across tiers keep their first-seen position; the list is
/// capped at [`MAX_SUGGESTIONS`].
pub fn suggest(destination_column: &str, source_columns: &[String]) -> Vec<Suggestion> {
    let dest_lower = destination_column.to_lowercase();
    let dest_normalized = dest_lower.replace('_', "");

    let mut seen: HashSet<&str> = HashSet::new();
    let mut suggestions = Vec::new();

    // 1. Case-insensitive exact equality
    for source in source_columns {
        if source.to_lowercase() == dest_lower {
            add_suggestion(&mut suggestions, &mut seen, source, MatchType::Exact);
        }
    }

    // 2. Substring containment, either direction
    for source in source_columns {
        let source_lower = source.to_lowercase();
        if source_lower.contains(&dest_lower) || dest_lower.contains(&source_lower) {
            add_suggestion(&mut suggestions, &mut seen, source, MatchType::Substring);
        }
    }

    // 3. Underscore-stripped equality
    for source in source_columns {
        if source.to_lowercase().replace('_', "") == dest_normalized {
            add_suggestion(&mut suggestions, &mut seen, source, MatchType::Normalized);
        }
    }

    // 4. Curated bilingual synonyms
    if let Some(synonyms) = synonyms_for(destination_column) {
        for source in source_columns {
            let source_lower = source.to_lowercase();
            if synonyms
                .iter()
                .any(|synonym| source_lower.contains(&synonym.to_lowercase()))
            {
                add_suggestion(&mut suggestions, &mut seen, source, MatchType::Synonym);
            }
        }
    }

    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

fn add_suggestion<'a>(
    suggestions: &mut Vec<Suggestion>,
    seen: &mut HashSet<&'a str>,
    source: &'a str,
    match_type: MatchType,
) {
    if seen.insert(source) {
        suggestions.push(Suggestion::new(source, match_type));
    }
}

/// Compute a default mapping for a destination table.
///
/// Destination columns are processed in descending best-suggestion
/// confidence (ties keep schema order), and each claims its best source
/// column that no earlier destination took. A destination column therefore
/// never appears twice, and neither does a source column; columns with no
/// unclaimed candidate stay unmapped.
pub fn auto_map(destination_columns: &[String], source_columns: &[String]) -> ColumnMapping {
    let mut candidates: Vec<(usize, &String, Vec<Suggestion>)> = destination_columns
        .iter()
        .enumerate()
        .filter_map(|(index, dest)| {
            let suggestions = suggest(dest, source_columns);
            if suggestions.is_empty() {
                None
            } else {
                Some((index, dest, suggestions))
            }
        })
        .collect();

    // Stable: equal confidence falls back to destination schema order
    candidates.sort_by(|a, b| {
        let conf_a = a.2[0].match_type.confidence();
        let conf_b = b.2[0].match_type.confidence();
        conf_b.partial_cmp(&conf_a).unwrap().then(a.0.cmp(&b.0))
    });

    let mut claimed: HashSet<&str> = HashSet::new();
    let mut mapping = ColumnMapping::new();

    for (_, dest, suggestions) in &candidates {
        let unclaimed = suggestions
            .iter()
            .find(|s| !claimed.contains(s.source_column.as_str()));
        if let Some(suggestion) = unclaimed {
            claimed.insert(suggestion.source_column.as_str());
            mapping.insert_unchecked(suggestion.source_column.clone(), (*dest).clone());
        }
    }

    mapping
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_exact_match_is_always_first() {
        let sources = cols(&["고객명", "status_note", "Status"]);
        let suggestions = suggest("status", &sources);
        assert_eq!(suggestions[0].source_column, "Status");
        assert_eq!(suggestions[0].match_type, MatchType::Exact);
    }

    #[test]
    fn test_substring_matches_both_directions() {
        let sources = cols(&["name", "customer_name_kr"]);
        let suggestions = suggest("customer_name", &sources);
        let names: Vec<&str> = suggestions.iter().map(|s| s.source_column.as_str()).collect();
        // dest contains "name", and "customer_name_kr" contains dest
        assert!(names.contains(&"name"));
        assert!(names.contains(&"customer_name_kr"));
    }

    #[test]
    fn test_normalized_match_ignores_underscores() {
        let sources = cols(&["customername"]);
        let suggestions = suggest("customer_name", &sources);
        assert_eq!(suggestions[0].match_type, MatchType::Normalized);
        assert_eq!(suggestions[0].source_column, "customername");
    }

    #[test]
    fn test_synonym_match_via_korean_alias() {
        let sources = cols(&["예약번호", "고객명"]);
        let suggestions = suggest("id", &sources);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].source_column, "예약번호");
        assert_eq!(suggestions[0].match_type, MatchType::Synonym);
    }

    #[test]
    fn test_duplicates_across_tiers_keep_first_position() {
        // "status" matches exact and substring and synonym-free tiers
        let sources = cols(&["status"]);
        let suggestions = suggest("status", &sources);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].match_type, MatchType::Exact);
    }

    #[test]
    fn test_suggestions_capped_at_five() {
        let sources = cols(&[
            "status", "status_1", "status_2", "status_3", "status_4", "status_5",
        ]);
        let suggestions = suggest("status", &sources);
        assert_eq!(suggestions.len(), MAX_SUGGESTIONS);
        assert_eq!(suggestions[0].source_column, "status");
    }

    #[test]
    fn test_auto_map_korean_booking_sheet() {
        // Worksheet "S-Tour-Bookings": rowCount 3, two Korean headers
        let sources = cols(&["예약번호", "고객명"]);
        let destinations = cols(&[
            "id",
            "created_at",
            "customer_name",
            "customer_phone",
            "customer_email",
            "product_id",
            "tour_date",
            "people_count",
            "pickup_location",
            "status",
            "total_price",
            "memo",
        ]);

        let mapping = auto_map(&destinations, &sources);

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.destination_for("예약번호"), Some("id"));
        assert_eq!(mapping.destination_for("고객명"), Some("customer_name"));
    }

    #[test]
    fn test_auto_map_destinations_are_unique() {
        // Both "name" and "customer_name" rank the source "name" highly
        let sources = cols(&["name", "phone"]);
        let destinations = cols(&["name", "customer_name", "customer_phone"]);

        let mapping = auto_map(&destinations, &sources);

        assert!(mapping.destinations_unique());
        // Exact match wins the contested source
        assert_eq!(mapping.destination_for("name"), Some("name"));
    }

    #[test]
    fn test_auto_map_tie_goes_to_earlier_destination() {
        // "상태비고" hits the synonym tables of both "status" (상태) and
        // "memo" (비고) at the same tier: schema order decides
        let sources = cols(&["상태비고"]);
        let destinations = cols(&["status", "memo"]);

        let mapping = auto_map(&destinations, &sources);

        assert_eq!(mapping.destination_for("상태비고"), Some("status"));
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn test_auto_map_claimed_source_falls_to_next_candidate() {
        // "customer_name" (exact, higher confidence) claims its source
        // first; "name" then falls to its next unclaimed suggestion
        let sources = cols(&["customer_name", "nickname"]);
        let destinations = cols(&["name", "customer_name"]);

        let mapping = auto_map(&destinations, &sources);

        assert_eq!(
            mapping.destination_for("customer_name"),
            Some("customer_name")
        );
        assert_eq!(mapping.destination_for("nickname"), Some("name"));
    }

    #[test]
    fn test_auto_map_source_with_no_remaining_candidate_stays_unmapped() {
        let sources = cols(&["customer_name"]);
        let destinations = cols(&["name", "customer_name"]);

        let mapping = auto_map(&destinations, &sources);

        assert_eq!(mapping.len(), 1);
        assert_eq!(
            mapping.destination_for("customer_name"),
            Some("customer_name")
        );
        assert_eq!(mapping.source_for("name"), None);
    }

    #[test]
    fn test_auto_map_unmatched_destinations_stay_unmapped() {
        let sources = cols(&["완전히다른헤더"]);
        let destinations = cols(&["id", "customer_name"]);
        let mapping = auto_map(&destinations, &sources);
        assert!(mapping.is_empty());
    }
}
