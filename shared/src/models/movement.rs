//! Inventory movement models
//!
//! Movements form an append-only ledger: a product's stock must always equal
//! the net sum of its movements. Entries add, exits subtract, and adjustments
//! record the signed delta that brought the stock to the requested absolute
//! value.

use serde::{Deserialize, Serialize};

/// Kind of stock change recorded in the ledger
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Entry,
    Exit,
    Adjustment,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Entry => "entry",
            MovementType::Exit => "exit",
            MovementType::Adjustment => "adjustment",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "entry" => Some(MovementType::Entry),
            "exit" => Some(MovementType::Exit),
            "adjustment" => Some(MovementType::Adjustment),
            _ => None,
        }
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signed delta an adjustment must record so the ledger still reconciles:
/// setting stock 17 -> 5 is logged as -12.
pub fn adjustment_delta(current_stock: i32, target_stock: i32) -> i32 {
    target_stock - current_stock
}

/// Net stock implied by a sequence of (type, quantity) ledger rows.
pub fn net_stock<'a, I>(movements: I) -> i64
where
    I: IntoIterator<Item = &'a (MovementType, i32)>,
{
    movements
        .into_iter()
        .fold(0i64, |acc, (kind, qty)| match kind {
            MovementType::Entry => acc + *qty as i64,
            MovementType::Exit => acc - *qty as i64,
            MovementType::Adjustment => acc + *qty as i64,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjustment_delta_is_signed() {
        assert_eq!(adjustment_delta(17, 5), -12);
        assert_eq!(adjustment_delta(3, 10), 7);
        assert_eq!(adjustment_delta(4, 4), 0);
    }

    #[test]
    fn net_stock_reconciles_all_movement_kinds() {
        let ledger = [
            (MovementType::Entry, 20),
            (MovementType::Exit, 6),
            (MovementType::Adjustment, -4),
            (MovementType::Entry, 1),
        ];
        assert_eq!(net_stock(&ledger), 11);
    }
}
