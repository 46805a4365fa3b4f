//! Pricing engine
//!
//! Computes the charge breakdown from cart lines, the fulfilment choice,
//! and the active promo. Uses rust_decimal for precise calculations,
//! stores as f64.

use rust_decimal::prelude::*;
use shared::geo;
use shared::models::{CartLine, PriceBreakdown, PromoState};

use crate::config::Config;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub(crate) fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub(crate) fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Stateless totals calculator, configured once from [`Config`].
///
/// `compute` is pure: it never mutates anything and identical inputs give
/// identical breakdowns, so it is called freely on every cart mutation and
/// again right before checkout.
#[derive(Debug, Clone, Copy)]
pub struct PricingEngine {
    service_fee: f64,
    deposit_fraction: f64,
}

impl PricingEngine {
    pub fn new(service_fee: f64, deposit_fraction: f64) -> Self {
        Self {
            service_fee,
            deposit_fraction,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.service_fee, config.deposit_fraction)
    }

    /// Compute the full charge breakdown.
    ///
    /// The delivery fee is `0` for pickup. For delivery it is the caller's
    /// override if given (typically a routed-distance fee from the
    /// location provider), else the schedule fee for the straight-line
    /// `distance_m`. A free-delivery promo zeroes the fee here, at compute
    /// time, so recomputing after a distance change can never double-apply
    /// it.
    pub fn compute(
        &self,
        lines: &[CartLine],
        is_delivery: bool,
        delivery_fee_override: Option<f64>,
        distance_m: Option<f64>,
        promo: &PromoState,
    ) -> PriceBreakdown {
        let subtotal = lines
            .iter()
            .map(|line| to_decimal(line.unit_price) * Decimal::from(line.quantity))
            .sum::<Decimal>();

        let delivery_fee = if !is_delivery || promo.free_delivery {
            Decimal::ZERO
        } else {
            let fee = delivery_fee_override
                .or_else(|| distance_m.map(geo::delivery_fee))
                .unwrap_or(0.0);
            to_decimal(fee)
        };

        let service_fee = to_decimal(self.service_fee);
        let discount = to_decimal(promo.discount_amount);

        let total = (subtotal + delivery_fee + service_fee - discount).max(Decimal::ZERO);
        let deposit = total * to_decimal(self.deposit_fraction);

        PriceBreakdown {
            subtotal: to_f64(subtotal),
            delivery_fee: to_f64(delivery_fee),
            service_fee: to_f64(service_fee),
            discount: to_f64(discount),
            total: to_f64(total),
            deposit: to_f64(deposit),
        }
    }
}
