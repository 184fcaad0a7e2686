//! Sale status and the sale totals arithmetic used by the ledger engine

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a sale. Status is the only field that changes after
/// creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Completed,
    Pending,
    Cancelled,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Completed => "completed",
            SaleStatus::Pending => "pending",
            SaleStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "completed" => Some(SaleStatus::Completed),
            "pending" => Some(SaleStatus::Pending),
            "cancelled" => Some(SaleStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subtotal of a single line: unit price x quantity - discount.
pub fn line_subtotal(unit_price: Decimal, quantity: i32, discount: Decimal) -> Decimal {
    unit_price * Decimal::from(quantity) - discount
}

/// Sale total as the sum of the line subtotals.
pub fn sale_total<'a, I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = &'a (Decimal, i32, Decimal)>,
{
    lines
        .into_iter()
        .map(|(price, qty, discount)| line_subtotal(*price, *qty, *discount))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn subtotal_applies_discount() {
        assert_eq!(line_subtotal(dec("10.50"), 3, dec("1.50")), dec("30.00"));
    }

    #[test]
    fn total_is_sum_of_subtotals() {
        let lines = [
            (dec("5.00"), 2, dec("0.00")),
            (dec("12.00"), 1, dec("2.00")),
        ];
        assert_eq!(sale_total(&lines), dec("20.00"));
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            SaleStatus::Completed,
            SaleStatus::Pending,
            SaleStatus::Cancelled,
        ] {
            assert_eq!(SaleStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SaleStatus::parse("refunded"), None);
    }
}
