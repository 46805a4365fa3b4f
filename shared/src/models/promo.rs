//! Promo code models

use serde::{Deserialize, Serialize};

/// How a promo's value is applied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountKind {
    /// `value` is a percentage of the subtotal
    Percentage,
    /// `value` is a flat currency amount
    FixedAmount,
}

/// One entry of the static promo table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromoRule {
    /// Uppercase code as entered by the customer
    pub code: String,
    pub kind: DiscountKind,
    pub value: f64,
    /// Minimum subtotal for the code to apply
    pub min_order: f64,
    /// Zeroes the delivery fee while active on a delivery order
    pub free_delivery: bool,
}

/// The currently active promo, if any. At most one at a time; applying a
/// new code replaces the previous one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PromoState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub discount_amount: f64,
    #[serde(default)]
    pub free_delivery: bool,
}

impl PromoState {
    pub fn is_active(&self) -> bool {
        self.code.is_some()
    }

    /// Clear the active promo, restoring zero discount.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Result of successfully applying a code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromoApplication {
    pub code: String,
    pub discount_amount: f64,
    pub free_delivery: bool,
}
