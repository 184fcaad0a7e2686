//! Stock severity classification

use serde::{Deserialize, Serialize};

/// Severity label for a product's stock level, used by the digest and the
/// stock detail endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StockSeverity {
    OutOfStock,
    Critical,
    Low,
    Ok,
}

impl StockSeverity {
    /// Classify a stock level against its minimum threshold.
    ///
    /// `approaching_factor` widens the band that counts as "low but not yet
    /// critical" (1.2 means within 20% above the minimum).
    pub fn classify(stock: i32, min_stock: i32, approaching_factor: f64) -> Self {
        if stock <= 0 {
            StockSeverity::OutOfStock
        } else if stock <= min_stock {
            StockSeverity::Critical
        } else if (stock as f64) <= min_stock as f64 * approaching_factor {
            StockSeverity::Low
        } else {
            StockSeverity::Ok
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockSeverity::OutOfStock => "OUT OF STOCK",
            StockSeverity::Critical => "CRITICAL",
            StockSeverity::Low => "LOW",
            StockSeverity::Ok => "OK",
        }
    }

    /// Sort key, most urgent first.
    pub fn rank(&self) -> u8 {
        match self {
            StockSeverity::OutOfStock => 0,
            StockSeverity::Critical => 1,
            StockSeverity::Low => 2,
            StockSeverity::Ok => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_stock_is_out_of_stock() {
        assert_eq!(
            StockSeverity::classify(0, 5, 1.2),
            StockSeverity::OutOfStock
        );
    }

    #[test]
    fn stock_at_minimum_is_critical() {
        assert_eq!(StockSeverity::classify(5, 5, 1.2), StockSeverity::Critical);
    }

    #[test]
    fn stock_within_approach_band_is_low() {
        // min 10, factor 1.2 -> low band is (10, 12]
        assert_eq!(StockSeverity::classify(12, 10, 1.2), StockSeverity::Low);
        assert_eq!(StockSeverity::classify(13, 10, 1.2), StockSeverity::Ok);
    }
}
