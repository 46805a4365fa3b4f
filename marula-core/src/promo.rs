//! Promo engine
//!
//! Validates codes against the static rule table and computes the
//! discount for the current subtotal. Application never mutates state
//! here; the caller installs the returned [`PromoApplication`] into its
//! [`PromoState`] only on success.

use std::collections::HashMap;

use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{DiscountKind, PromoApplication, PromoRule};

use crate::pricing::{to_decimal, to_f64};

pub struct PromoEngine {
    rules: HashMap<String, PromoRule>,
}

impl PromoEngine {
    pub fn new(rules: Vec<PromoRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|r| (r.code.to_uppercase(), r))
            .collect();
        Self { rules }
    }

    /// Look up a code, case-insensitively.
    pub fn lookup(&self, code: &str) -> Option<&PromoRule> {
        self.rules.get(&code.trim().to_uppercase())
    }

    /// Validate `code` against the subtotal and compute its discount.
    ///
    /// Fails with `InvalidPromoCode` for unknown codes and
    /// `MinimumOrderNotMet` when the subtotal is below the rule's
    /// threshold; neither failure changes any state.
    pub fn apply(&self, code: &str, subtotal: f64) -> AppResult<PromoApplication> {
        let normalized = code.trim().to_uppercase();
        let rule = self.lookup(&normalized).ok_or_else(|| {
            AppError::new(ErrorCode::InvalidPromoCode).with_detail("code", normalized.clone())
        })?;

        if subtotal < rule.min_order {
            return Err(AppError::new(ErrorCode::MinimumOrderNotMet)
                .with_detail("code", normalized.clone())
                .with_detail("min_order", rule.min_order)
                .with_detail("subtotal", subtotal));
        }

        let discount_amount = match rule.kind {
            DiscountKind::Percentage => to_f64(
                to_decimal(subtotal) * to_decimal(rule.value) / Decimal::ONE_HUNDRED,
            ),
            DiscountKind::FixedAmount => rule.value,
        };

        Ok(PromoApplication {
            code: normalized,
            discount_amount,
            free_delivery: rule.free_delivery,
        })
    }
}

impl Default for PromoEngine {
    /// The deployment's static promo table.
    fn default() -> Self {
        Self::new(vec![
            PromoRule {
                code: "WIZA10".to_string(),
                kind: DiscountKind::Percentage,
                value: 10.0,
                min_order: 50.0,
                free_delivery: false,
            },
            PromoRule {
                code: "FRESH5".to_string(),
                kind: DiscountKind::Percentage,
                value: 5.0,
                min_order: 0.0,
                free_delivery: false,
            },
            PromoRule {
                code: "K20OFF".to_string(),
                kind: DiscountKind::FixedAmount,
                value: 20.0,
                min_order: 150.0,
                free_delivery: false,
            },
            PromoRule {
                code: "FREEDEL".to_string(),
                kind: DiscountKind::FixedAmount,
                value: 0.0,
                min_order: 100.0,
                free_delivery: true,
            },
        ])
    }
}
