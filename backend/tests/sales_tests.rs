//! Sale arithmetic and status tests

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{line_subtotal, sale_total, SaleStatus};
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn line_subtotal_is_price_times_quantity_minus_discount() {
        assert_eq!(line_subtotal(dec("4.50"), 4, dec("0.00")), dec("18.00"));
        assert_eq!(line_subtotal(dec("4.50"), 4, dec("3.00")), dec("15.00"));
    }

    #[test]
    fn sale_total_sums_line_subtotals() {
        let lines = [
            (dec("4.50"), 4, dec("0.00")),
            (dec("12.00"), 1, dec("2.00")),
            (dec("0.99"), 10, dec("0.00")),
        ];
        assert_eq!(sale_total(&lines), dec("37.90"));
    }

    #[test]
    fn empty_sale_totals_zero() {
        let lines: [(Decimal, i32, Decimal); 0] = [];
        assert_eq!(sale_total(&lines), Decimal::ZERO);
    }

    #[test]
    fn status_parses_known_values_only() {
        assert_eq!(SaleStatus::parse("completed"), Some(SaleStatus::Completed));
        assert_eq!(SaleStatus::parse("pending"), Some(SaleStatus::Pending));
        assert_eq!(SaleStatus::parse("cancelled"), Some(SaleStatus::Cancelled));
        assert_eq!(SaleStatus::parse("refunded"), None);
        assert_eq!(SaleStatus::parse("Completed"), None);
    }

    #[test]
    fn status_serializes_to_snake_case() {
        assert_eq!(
            serde_json::to_string(&SaleStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100000i64).prop_map(|n| Decimal::new(n, 2)) // 0.01 to 1000.00
    }

    fn line_strategy() -> impl Strategy<Value = (Decimal, i32, Decimal)> {
        (price_strategy(), 1i32..=100).prop_map(|(price, qty)| (price, qty, Decimal::ZERO))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The sale total equals the sum of its line subtotals, in any order.
        #[test]
        fn prop_total_is_order_independent(
            mut lines in prop::collection::vec(line_strategy(), 1..10)
        ) {
            let total = sale_total(&lines);
            lines.reverse();
            prop_assert_eq!(sale_total(&lines), total);
        }

        /// Without discounts every subtotal is positive and the total grows
        /// with each line.
        #[test]
        fn prop_total_grows_with_lines(
            lines in prop::collection::vec(line_strategy(), 2..10)
        ) {
            let total = sale_total(&lines);
            let without_last = sale_total(&lines[..lines.len() - 1]);
            prop_assert!(total > without_last);
        }

        /// A discount never raises a line subtotal.
        #[test]
        fn prop_discount_never_raises_subtotal(
            price in price_strategy(),
            qty in 1i32..=100,
            discount in (0i64..=1000i64).prop_map(|n| Decimal::new(n, 2))
        ) {
            let with = line_subtotal(price, qty, discount);
            let without = line_subtotal(price, qty, Decimal::ZERO);
            prop_assert!(with <= without);
        }

        /// Status round-trips through its string form.
        #[test]
        fn prop_status_round_trips(idx in 0usize..3) {
            let status = [SaleStatus::Completed, SaleStatus::Pending, SaleStatus::Cancelled][idx];
            prop_assert_eq!(SaleStatus::parse(status.as_str()), Some(status));
        }
    }
}
