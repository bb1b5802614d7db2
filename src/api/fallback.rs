//! Hardcoded column lists for known destination tables
//!
//! Used when the live schema endpoint is unreachable after its retry so the
//! mapping workflow stays usable in degraded mode. Kept in sync with the
//! production migrations by hand; a table missing here simply yields no
//! fallback.

use super::models::ColumnInfo;

/// Destination tables with a degraded-mode column list
pub const FALLBACK_TABLE_NAMES: &[&str] = &[
    "reservations",
    "tours",
    "customers",
    "products",
    "team_members",
    "vehicles",
];

/// Static column list for `table`, if one is maintained
pub fn fallback_columns(table: &str) -> Option<Vec<ColumnInfo>> {
    let columns: &[(&str, &str, bool, Option<&str>)] = match table {
        "reservations" => &[
            ("id", "uuid", false, Some("gen_random_uuid()")),
            ("created_at", "timestamp with time zone", false, Some("now()")),
            ("customer_name", "text", false, None),
            ("customer_phone", "text", true, None),
            ("customer_email", "text", true, None),
            ("product_id", "uuid", true, None),
            ("tour_date", "date", true, None),
            ("people_count", "integer", false, Some("1")),
            ("pickup_location", "text", true, None),
            ("status", "text", false, Some("'pending'")),
            ("total_price", "numeric", true, None),
            ("memo", "text", true, None),
        ],
        "tours" => &[
            ("id", "uuid", false, Some("gen_random_uuid()")),
            ("tour_date", "date", false, None),
            ("product_id", "uuid", false, None),
            ("guide_id", "uuid", true, None),
            ("vehicle_id", "uuid", true, None),
            ("status", "text", false, Some("'scheduled'")),
            ("created_at", "timestamp with time zone", false, Some("now()")),
        ],
        "customers" => &[
            ("id", "uuid", false, Some("gen_random_uuid()")),
            ("name", "text", false, None),
            ("phone", "text", true, None),
            ("email", "text", true, None),
            ("language", "text", true, Some("'ko'")),
            ("created_at", "timestamp with time zone", false, Some("now()")),
        ],
        "products" => &[
            ("id", "uuid", false, Some("gen_random_uuid()")),
            ("name", "text", false, None),
            ("category", "text", true, None),
            ("base_price", "numeric", false, Some("0")),
            ("duration_hours", "integer", true, None),
            ("is_active", "boolean", false, Some("true")),
        ],
        "team_members" => &[
            ("id", "uuid", false, Some("gen_random_uuid()")),
            ("name", "text", false, None),
            ("role", "text", false, Some("'guide'")),
            ("phone", "text", true, None),
            ("email", "text", true, None),
            ("is_active", "boolean", false, Some("true")),
        ],
        "vehicles" => &[
            ("id", "uuid", false, Some("gen_random_uuid()")),
            ("name", "text", false, None),
            ("capacity", "integer", false, None),
            ("plate_number", "text", true, None),
            ("is_active", "boolean", false, Some("true")),
        ],
        _ => return None,
    };

    Some(
        columns
            .iter()
            .map(|(name, data_type, nullable, default)| {
                ColumnInfo::new(name, data_type, *nullable, *default)
            })
            .collect(),
    )
}
