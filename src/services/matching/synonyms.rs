//! Bilingual column-name synonym table
//!
//! Operators keep sheet headers in Korean while destination tables use
//! English snake_case; this table bridges the two. Keyed by destination
//! column name; a source header matches when its lowercased text contains
//! one of the listed synonyms (also lowercased).
//!
//! Keep synonyms specific. A loose entry like "번호" alone would drag
//! every "...번호" header (phone numbers included) onto the same column.

use std::collections::HashMap;

use once_cell::sync::Lazy;

static SYNONYMS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    table.insert(
        "id",
        &["예약번호", "예약 번호", "booking id", "booking no", "reservation id"],
    );
    table.insert(
        "customer_name",
        &["고객명", "고객 이름", "예약자명", "guest name", "customer name"],
    );
    table.insert(
        "customer_phone",
        &["전화번호", "연락처", "휴대폰", "phone", "mobile"],
    );
    table.insert("customer_email", &["이메일", "메일주소", "email", "e-mail"]);
    table.insert(
        "tour_date",
        &["투어날짜", "투어 날짜", "출발일", "tour date", "departure"],
    );
    table.insert(
        "people_count",
        &["인원", "인원수", "참가인원", "pax", "people"],
    );
    table.insert(
        "pickup_location",
        &["픽업", "픽업장소", "집합장소", "pickup", "meeting point"],
    );
    table.insert("status", &["상태", "예약상태", "진행상태"]);
    table.insert(
        "total_price",
        &["금액", "총액", "결제금액", "판매가", "price", "amount"],
    );
    table.insert("memo", &["메모", "비고", "요청사항", "note", "remarks"]);
    table.insert("product_id", &["상품명", "투어명", "product", "tour name"]);
    table.insert("guide_id", &["가이드", "guide"]);
    table.insert("vehicle_id", &["차량", "vehicle"]);
    table.insert("capacity", &["정원", "탑승인원", "seats"]);
    table.insert("plate_number", &["차량번호", "번호판", "plate"]);
    table.insert("role", &["직책", "담당", "role"]);
    table.insert("language", &["언어", "사용언어", "language"]);
    table
});

/// Synonyms for a destination column, if any are curated
pub fn synonyms_for(destination_column: &str) -> Option<&'static [&'static str]> {
    SYNONYMS
        .get(destination_column.to_lowercase().as_str())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_korean_booking_number_maps_to_id() {
        let synonyms = synonyms_for("id").unwrap();
        assert!(synonyms.contains(&"예약번호"));
    }

    #[test]
    fn test_lookup_is_case_insensitive_on_destination() {
        assert!(synonyms_for("Customer_Name").is_some());
    }

    #[test]
    fn test_unknown_destination_has_no_synonyms() {
        assert!(synonyms_for("created_at").is_none());
    }
}
