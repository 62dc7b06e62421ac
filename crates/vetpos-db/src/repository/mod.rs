//! # Repository Module
//!
//! One repository per pricing table.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Row → Domain Conversion                              │
//! │                                                                         │
//! │  db.price_rules().list_by_price_book(1)                                │
//! │       │                                                                 │
//! │       │  SQL Query (runtime-checked, sqlx::query_as)                   │
//! │       ▼                                                                 │
//! │  PriceRuleRow   (#[derive(FromRow)], plain columns)                    │
//! │       │                                                                 │
//! │       │  TryFrom: parse enums + dates, validate                        │
//! │       ▼                                                                 │
//! │  PriceRule      (vetpos-core type)                                     │
//! │       │                                                                 │
//! │       └── malformed row ──► DbError::InvalidRecord                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Products by SKU or id
//! - [`price_book::PriceBookRepository`] - Price books
//! - [`price_rule::PriceRuleRepository`] - Rules of a price book
//! - [`volume_tier::VolumeTierRepository`] - Tiers for a product or category

pub mod price_book;
pub mod price_rule;
pub mod product;
pub mod volume_tier;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Which end of a validity window a stored date describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WindowBound {
    From,
    To,
}

/// Parses a stored validity bound.
///
/// Accepted forms:
/// - RFC 3339 (`2025-03-01T08:00:00Z`)
/// - SQLite datetime (`2025-03-01 08:00:00`, UTC)
/// - Bare date (`2025-03-01`): start of day for `From`, last nanosecond of
///   the day for `To`
pub(crate) fn parse_window_bound(
    raw: Option<&str>,
    bound: WindowBound,
) -> Result<Option<DateTime<Utc>>, String> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(instant.with_timezone(&Utc)));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(Some(naive.and_utc()));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("unparsable date '{}'", raw))?;
    let naive = match bound {
        WindowBound::From => date.and_hms_opt(0, 0, 0),
        WindowBound::To => date.and_hms_nano_opt(23, 59, 59, 999_999_999),
    };

    naive
        .map(|n| Some(n.and_utc()))
        .ok_or_else(|| format!("unparsable date '{}'", raw))
}

/// Storage form of a validity bound.
pub(crate) fn format_window_bound(instant: Option<DateTime<Utc>>) -> Option<String> {
    instant.map(|i| i.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use vetpos_core::pricing::window_contains;

    #[test]
    fn test_bare_dates_cover_whole_day() {
        let from = parse_window_bound(Some("2025-03-01"), WindowBound::From).unwrap();
        let to = parse_window_bound(Some("2025-03-01"), WindowBound::To).unwrap();

        assert_eq!(from, Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()));
        assert!(to.unwrap() > Utc.with_ymd_and_hms(2025, 3, 1, 23, 59, 59).unwrap());
        assert!(to.unwrap() < Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_bare_end_date_includes_last_instant_of_day() {
        let to = parse_window_bound(Some("2025-03-31"), WindowBound::To).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 59).unwrap()
            + chrono::Duration::microseconds(999_500);
        let next_day = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();

        assert!(window_contains(None, to, late));
        assert!(!window_contains(None, to, next_day));

        // survives the storage round trip
        let stored = format_window_bound(to);
        assert_eq!(parse_window_bound(stored.as_deref(), WindowBound::To).unwrap(), to);
    }

    #[test]
    fn test_instants_round_trip() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap();
        let stored = format_window_bound(Some(instant));

        let parsed = parse_window_bound(stored.as_deref(), WindowBound::To).unwrap();
        assert_eq!(parsed, Some(instant));

        let sqlite_style = parse_window_bound(Some("2025-03-01 08:30:00"), WindowBound::From).unwrap();
        assert_eq!(sqlite_style, Some(instant));
    }

    #[test]
    fn test_empty_and_invalid_bounds() {
        assert_eq!(parse_window_bound(None, WindowBound::From).unwrap(), None);
        assert_eq!(parse_window_bound(Some("  "), WindowBound::From).unwrap(), None);
        assert!(parse_window_bound(Some("next tuesday"), WindowBound::To).is_err());
    }
}
