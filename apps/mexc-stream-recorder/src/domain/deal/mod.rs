//! Deal Domain Types
//!
//! A deal is one executed trade from the feed. This module holds the
//! normalized form written to the store and the rules that produce it from
//! wire values: side-code mapping, symbol key normalization, and
//! millisecond-to-second timestamp truncation.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// Timestamp format used for deal rows in the store.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Direction of an executed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Taker bought.
    Buy,
    /// Taker sold.
    Sell,
}

impl Side {
    /// Map the integer side code from the wire.
    ///
    /// Code 1 is a buy; every other code maps to a sell. The feed documents
    /// codes 1 and 2 only, but the mapping is deliberately lenient so an
    /// unexpected code never produces a third value.
    #[must_use]
    pub const fn from_wire_code(code: i64) -> Self {
        if code == 1 { Self::Buy } else { Self::Sell }
    }

    /// Store representation of the side.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized deal, ready to be persisted.
///
/// Created once per inbound frame, written immediately, never retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealRecord {
    /// Catalog key: the wire symbol tag lowercased with separators stripped.
    pub symbol: String,
    /// Execution time truncated to second resolution (UTC).
    pub executed_at: NaiveDateTime,
    /// Trade direction.
    pub side: Side,
    /// Execution price.
    pub price: Decimal,
    /// Executed quantity.
    pub quantity: Decimal,
}

impl DealRecord {
    /// Execution time formatted as it is written to the store
    /// (`YYYY-MM-DD HH:MM:SS`).
    #[must_use]
    pub fn executed_at_str(&self) -> String {
        self.executed_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Normalize a wire symbol tag (e.g. `BTC_USDT`) to its catalog key
/// (`btcusdt`).
#[must_use]
pub fn catalog_key(wire_symbol: &str) -> String {
    wire_symbol.replace('_', "").to_lowercase()
}

/// Convert a millisecond epoch timestamp to a second-resolution UTC
/// timestamp.
///
/// Sub-second precision is truncated, not rounded. Returns `None` for values
/// outside the representable range.
#[must_use]
pub fn timestamp_from_millis(millis: i64) -> Option<NaiveDateTime> {
    chrono::DateTime::from_timestamp(millis.div_euclid(1000), 0).map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case(1, Side::Buy; "code one is buy")]
    #[test_case(2, Side::Sell; "code two is sell")]
    #[test_case(5, Side::Sell; "unexpected code falls through to sell")]
    #[test_case(0, Side::Sell; "zero falls through to sell")]
    #[test_case(-3, Side::Sell; "negative falls through to sell")]
    fn side_mapping(code: i64, expected: Side) {
        assert_eq!(Side::from_wire_code(code), expected);
    }

    #[test]
    fn side_store_representation() {
        assert_eq!(Side::Buy.as_str(), "BUY");
        assert_eq!(Side::Sell.as_str(), "SELL");
    }

    #[test_case("BTC_USDT", "btcusdt")]
    #[test_case("ETH_USDT", "ethusdt")]
    #[test_case("SOLUSDT", "solusdt"; "no separator to strip")]
    fn catalog_key_normalization(wire: &str, expected: &str) {
        assert_eq!(catalog_key(wire), expected);
    }

    #[test]
    fn timestamp_conversion_matches_known_instant() {
        let ts = timestamp_from_millis(1_700_000_000_000).unwrap();
        assert_eq!(ts.format(TIMESTAMP_FORMAT).to_string(), "2023-11-14 22:13:20");
    }

    #[test]
    fn timestamp_truncates_subsecond_precision() {
        let exact = timestamp_from_millis(1_700_000_000_000).unwrap();
        let late = timestamp_from_millis(1_700_000_000_999).unwrap();
        assert_eq!(exact, late);
    }

    #[test]
    fn record_formats_second_resolution_timestamp() {
        let record = DealRecord {
            symbol: "btcusdt".to_string(),
            executed_at: timestamp_from_millis(1_700_000_000_000).unwrap(),
            side: Side::Buy,
            price: Decimal::new(650_005, 1),
            quantity: Decimal::new(1, 2),
        };
        assert_eq!(record.executed_at_str(), "2023-11-14 22:13:20");
    }

    proptest! {
        #[test]
        fn side_is_buy_iff_code_is_one(code in any::<i64>()) {
            let side = Side::from_wire_code(code);
            if code == 1 {
                prop_assert_eq!(side, Side::Buy);
            } else {
                prop_assert_eq!(side, Side::Sell);
            }
        }

        #[test]
        fn catalog_key_has_no_separators_or_uppercase(s in "[A-Z_]{1,16}") {
            let key = catalog_key(&s);
            prop_assert!(!key.contains('_'));
            prop_assert!(!key.chars().any(char::is_uppercase));
        }
    }
}
