//! Stock alert enums and the priority banding rules

use serde::{Deserialize, Serialize};

/// Priority of a stock alert
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    High,
    Medium,
    Low,
}

impl AlertPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertPriority::High => "high",
            AlertPriority::Medium => "medium",
            AlertPriority::Low => "low",
        }
    }

}

/// Lifecycle status of a stock alert. Pending alerts transition to Resolved
/// or Ignored, never back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Pending,
    Resolved,
    Ignored,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Pending => "pending",
            AlertStatus::Resolved => "resolved",
            AlertStatus::Ignored => "ignored",
        }
    }
}

/// Configurable priority banding for alert derivation.
///
/// `high_band` is the fraction of the minimum at or below which an alert is
/// High rather than Medium; with the default of 1.0 every level at or below
/// the minimum is High. `approaching_factor` extends a Low band above the
/// minimum for products approaching the threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AlertBanding {
    pub high_band: f64,
    pub approaching_factor: f64,
}

impl Default for AlertBanding {
    fn default() -> Self {
        Self {
            high_band: 1.0,
            approaching_factor: 1.2,
        }
    }
}

impl AlertBanding {
    /// Priority an alert should carry for the given stock level, or `None`
    /// when the level does not warrant an alert.
    pub fn priority_for(&self, stock: i32, min_stock: i32) -> Option<AlertPriority> {
        if stock <= 0 {
            return Some(AlertPriority::High);
        }
        let stock = stock as f64;
        let min = min_stock as f64;
        if stock <= min * self.high_band {
            Some(AlertPriority::High)
        } else if stock <= min {
            Some(AlertPriority::Medium)
        } else if stock <= min * self.approaching_factor {
            Some(AlertPriority::Low)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_banding_flags_at_minimum_as_high() {
        let banding = AlertBanding::default();
        assert_eq!(banding.priority_for(4, 5), Some(AlertPriority::High));
        assert_eq!(banding.priority_for(5, 5), Some(AlertPriority::High));
        assert_eq!(banding.priority_for(0, 5), Some(AlertPriority::High));
    }

    #[test]
    fn approaching_band_is_low() {
        let banding = AlertBanding::default();
        assert_eq!(banding.priority_for(6, 5), Some(AlertPriority::Low));
        assert_eq!(banding.priority_for(7, 5), None);
    }

    #[test]
    fn narrow_high_band_yields_medium() {
        let banding = AlertBanding {
            high_band: 0.5,
            approaching_factor: 1.2,
        };
        assert_eq!(banding.priority_for(2, 10), Some(AlertPriority::High));
        assert_eq!(banding.priority_for(8, 10), Some(AlertPriority::Medium));
        assert_eq!(banding.priority_for(12, 10), Some(AlertPriority::Low));
    }
}
