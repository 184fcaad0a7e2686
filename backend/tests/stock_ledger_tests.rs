//! Stock ledger and alert tests
//!
//! Covers the reconciliation arithmetic (stock always equals the net sum of
//! movements), exit validation, and alert priority banding.

use proptest::prelude::*;
use shared::{adjustment_delta, net_stock, AlertBanding, AlertPriority, MovementType, StockSeverity};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn ledger_reconciles_entries_and_exits() {
        let ledger = [
            (MovementType::Entry, 50),
            (MovementType::Exit, 20),
            (MovementType::Entry, 5),
            (MovementType::Exit, 10),
        ];
        assert_eq!(net_stock(&ledger), 25);
    }

    #[test]
    fn adjustment_records_signed_delta() {
        // Setting stock 17 -> 5 must be logged as -12 so the net sum holds
        assert_eq!(adjustment_delta(17, 5), -12);

        let ledger = [
            (MovementType::Entry, 17),
            (MovementType::Adjustment, adjustment_delta(17, 5)),
        ];
        assert_eq!(net_stock(&ledger), 5);
    }

    #[test]
    fn cancellation_entries_restore_the_exits() {
        // A sale with two lines, then its cancellation
        let ledger = [
            (MovementType::Entry, 30),
            (MovementType::Exit, 4),
            (MovementType::Exit, 7),
            (MovementType::Entry, 4),
            (MovementType::Entry, 7),
        ];
        assert_eq!(net_stock(&ledger), 30);
    }

    #[test]
    fn default_banding_matches_alert_scenarios() {
        let banding = AlertBanding::default();

        // Stock 4 against minimum 5 is a high priority alert
        assert_eq!(banding.priority_for(4, 5), Some(AlertPriority::High));
        // At the minimum exactly is still high with the default band
        assert_eq!(banding.priority_for(5, 5), Some(AlertPriority::High));
        // Just above the minimum is the approaching band
        assert_eq!(banding.priority_for(6, 5), Some(AlertPriority::Low));
        // Comfortably above produces no alert
        assert_eq!(banding.priority_for(7, 5), None);
        // Out of stock is always high
        assert_eq!(banding.priority_for(0, 5), Some(AlertPriority::High));
    }

    #[test]
    fn narrow_high_band_produces_medium_alerts() {
        let banding = AlertBanding {
            high_band: 0.5,
            approaching_factor: 1.2,
        };
        assert_eq!(banding.priority_for(3, 10), Some(AlertPriority::High));
        assert_eq!(banding.priority_for(7, 10), Some(AlertPriority::Medium));
        assert_eq!(banding.priority_for(11, 10), Some(AlertPriority::Low));
        assert_eq!(banding.priority_for(13, 10), None);
    }

    #[test]
    fn severity_ranks_most_urgent_first() {
        let severities = [
            StockSeverity::classify(0, 5, 1.2),
            StockSeverity::classify(3, 5, 1.2),
            StockSeverity::classify(6, 5, 1.2),
            StockSeverity::classify(20, 5, 1.2),
        ];
        let ranks: Vec<u8> = severities.iter().map(|s| s.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
    }
}

// ============================================================================
// Cancellation Reversal Semantics
// ============================================================================

#[cfg(test)]
mod reversal_tests {
    use super::*;

    struct ProductState {
        stock: i32,
        active: bool,
    }

    /// Sale-path exit: only active products can be sold from.
    fn sell(product: &mut ProductState, quantity: i32) -> Result<(), &'static str> {
        if !product.active {
            return Err("product not found");
        }
        if product.stock < quantity {
            return Err("insufficient stock");
        }
        product.stock -= quantity;
        Ok(())
    }

    /// Cancellation entry: restoration is unconditional and must succeed for
    /// deactivated products too.
    fn restore(product: &mut ProductState, quantity: i32) {
        product.stock += quantity;
    }

    #[test]
    fn cancellation_restores_stock_of_deactivated_product() {
        let mut product = ProductState {
            stock: 10,
            active: true,
        };

        sell(&mut product, 4).unwrap();
        assert_eq!(product.stock, 6);

        // Product is deactivated after the sale, then the sale is cancelled
        product.active = false;
        restore(&mut product, 4);
        assert_eq!(product.stock, 10);
    }

    #[test]
    fn deactivated_product_cannot_be_sold() {
        let mut product = ProductState {
            stock: 10,
            active: false,
        };
        assert!(sell(&mut product, 1).is_err());
        assert_eq!(product.stock, 10);
    }

    #[test]
    fn reversal_keeps_ledger_reconciled() {
        // The compensating entries land on the ledger like any other movement
        let ledger = [
            (MovementType::Entry, 10),
            (MovementType::Exit, 4),
            (MovementType::Entry, 4),
        ];
        assert_eq!(net_stock(&ledger), 10);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn movement_strategy() -> impl Strategy<Value = (MovementType, i32)> {
        prop_oneof![
            (1i32..=1000).prop_map(|q| (MovementType::Entry, q)),
            (1i32..=1000).prop_map(|q| (MovementType::Exit, q)),
            (-1000i32..=1000).prop_map(|q| (MovementType::Adjustment, q)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Replaying a ledger through the check-and-apply rules always leaves
        /// stock equal to the net sum of the applied movements.
        #[test]
        fn prop_applied_ledger_reconciles(
            movements in prop::collection::vec(movement_strategy(), 1..30)
        ) {
            let mut stock: i64 = 0;
            let mut applied = Vec::new();

            for (kind, qty) in movements {
                match kind {
                    MovementType::Entry => {
                        stock += qty as i64;
                        applied.push((kind, qty));
                    }
                    MovementType::Exit => {
                        // Exits that would drive stock negative are rejected
                        if stock >= qty as i64 {
                            stock -= qty as i64;
                            applied.push((kind, qty));
                        }
                    }
                    MovementType::Adjustment => {
                        if stock + qty as i64 >= 0 {
                            stock += qty as i64;
                            applied.push((kind, qty));
                        }
                    }
                }
            }

            prop_assert!(stock >= 0);
            prop_assert_eq!(stock, net_stock(&applied));
        }

        /// An adjustment to any non-negative target reconciles exactly.
        #[test]
        fn prop_adjustment_reaches_target(
            current in 0i32..=10000,
            target in 0i32..=10000
        ) {
            let delta = adjustment_delta(current, target);
            prop_assert_eq!(current + delta, target);
        }

        /// Cancelling a sale (one compensating entry per exit) restores the
        /// original stock level.
        #[test]
        fn prop_cancellation_restores_stock(
            initial in 100i32..=10000,
            quantities in prop::collection::vec(1i32..=50, 1..6)
        ) {
            let mut ledger = vec![(MovementType::Entry, initial)];
            let sold: i32 = quantities.iter().sum();
            prop_assume!(sold <= initial);

            for q in &quantities {
                ledger.push((MovementType::Exit, *q));
            }
            for q in &quantities {
                ledger.push((MovementType::Entry, *q));
            }

            prop_assert_eq!(net_stock(&ledger), initial as i64);
        }

        /// Alert priority is monotone: lowering stock never lowers the
        /// severity of the derived alert.
        #[test]
        fn prop_priority_is_monotone_in_stock(
            min_stock in 1i32..=100,
            stock in 0i32..=200
        ) {
            let banding = AlertBanding::default();
            let rank = |p: Option<AlertPriority>| match p {
                Some(AlertPriority::High) => 0,
                Some(AlertPriority::Medium) => 1,
                Some(AlertPriority::Low) => 2,
                None => 3,
            };

            let here = rank(banding.priority_for(stock, min_stock));
            let lower = rank(banding.priority_for(stock.saturating_sub(1), min_stock));
            prop_assert!(lower <= here);
        }

        /// No alert is ever derived for stock comfortably above the band.
        #[test]
        fn prop_no_alert_above_approach_band(
            min_stock in 1i32..=100,
            extra in 1i32..=100
        ) {
            let banding = AlertBanding::default();
            let stock = (min_stock as f64 * banding.approaching_factor).ceil() as i32 + extra;
            prop_assert_eq!(banding.priority_for(stock, min_stock), None);
        }
    }
}
