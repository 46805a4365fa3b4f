//! Order model and status state machine

use super::cart::CartLine;
use super::location::DeliveryLocation;
use super::profile::Profile;
use serde::{Deserialize, Serialize};

/// Order status
///
/// The lifecycle is `PENDING → PREPARING → READY → (OUT_FOR_DELIVERY →)
/// COMPLETED`; `CANCELLED` is reachable from any non-terminal state.
/// `OUT_FOR_DELIVERY` only occurs on delivery orders.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    OutForDelivery,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Whether no further transitions are allowed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether the state machine permits moving from `self` to `next`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == Self::Cancelled {
            return true;
        }
        matches!(
            (self, next),
            (Self::Pending, Self::Preparing)
                | (Self::Preparing, Self::Ready)
                | (Self::Ready, Self::OutForDelivery)
                | (Self::Ready, Self::Completed)
                | (Self::OutForDelivery, Self::Completed)
        )
    }
}

/// Derived charge breakdown, snapshotted into each order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct PriceBreakdown {
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub service_fee: f64,
    pub discount: f64,
    /// `max(0, subtotal + delivery_fee + service_fee - discount)`
    pub total: f64,
    /// Amount due at order time; equals `total` at the current 100%
    /// deposit fraction, kept separate for partial-deposit support.
    pub deposit: f64,
}

/// An order record. Immutable once created except for `status`, which is
/// advanced only by the order tracker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Monotonic local id, never reused
    pub id: u64,
    /// User-facing reference ("WFC0042")
    pub reference: String,
    /// Cart snapshot at checkout
    pub lines: Vec<CartLine>,
    /// Charge breakdown snapshot at checkout
    pub pricing: PriceBreakdown,
    pub status: OrderStatus,
    /// Creation timestamp (millis)
    pub created_at: i64,
    pub is_delivery: bool,
    /// Delivery destination snapshot, `None` for pickup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_location: Option<DeliveryLocation>,
    /// Customer profile snapshot
    pub customer: Profile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
    /// Whether a payment screenshot was attached
    #[serde(default)]
    pub payment_proof_present: bool,
}

impl Order {
    pub fn total_quantity(&self) -> i32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

/// A status change reported by the order-management backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusEvent {
    pub order_id: u64,
    pub status: OrderStatus,
    /// Event timestamp (millis)
    pub at: i64,
}
