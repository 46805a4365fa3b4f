//! Cart store
//!
//! Owns the ordered list of cart lines. Every mutation persists the full
//! cart snapshot synchronously; a persistence failure is logged and not
//! surfaced, so a flaky disk never blocks adding food to the cart.

use rust_decimal::Decimal;
use shared::models::{CartLine, ItemKind, LineKey, PriceBreakdown, PromoState};

use crate::pricing::{PricingEngine, to_decimal, to_f64};
use crate::storage::LocalStore;

pub struct CartStore {
    lines: Vec<CartLine>,
    store: LocalStore,
}

impl CartStore {
    /// Load the persisted cart from the local store.
    pub fn load(store: LocalStore) -> Self {
        let lines = store.load_cart();
        Self { lines, store }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line quantities.
    pub fn total_quantity(&self) -> i32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Add an uncustomized item. Merges into an existing line with the
    /// same plain identity by incrementing quantity, else appends a new
    /// line with quantity 1. Item metadata is taken as given; catalog
    /// lookup is the caller's concern.
    pub fn add_item(
        &mut self,
        item_id: i64,
        name: &str,
        unit_price: f64,
        image: Option<String>,
        kind: ItemKind,
    ) {
        let key = LineKey::plain(item_id);
        if let Some(line) = self.lines.iter_mut().find(|l| l.key() == key) {
            line.quantity += 1;
        } else {
            self.lines.push(CartLine {
                item_id,
                name: name.to_string(),
                unit_price,
                quantity: 1,
                image,
                toppings: Vec::new(),
                instructions: String::new(),
                kind,
            });
        }
        self.persist();
    }

    /// Add a customized item. The unit price is the base price plus the
    /// per-topping charge for each selected topping. Merges only when
    /// item id, toppings, and instructions all match exactly.
    #[allow(clippy::too_many_arguments)]
    pub fn add_customized_item(
        &mut self,
        item_id: i64,
        name: &str,
        base_price: f64,
        toppings: Vec<String>,
        instructions: String,
        topping_unit_price: f64,
        image: Option<String>,
    ) {
        let unit_price = to_f64(
            to_decimal(base_price)
                + to_decimal(topping_unit_price) * Decimal::from(toppings.len() as i64),
        );

        let key = LineKey::new(item_id, &toppings, &instructions);
        if let Some(line) = self.lines.iter_mut().find(|l| l.key() == key) {
            line.quantity += 1;
        } else {
            self.lines.push(CartLine {
                item_id,
                name: name.to_string(),
                unit_price,
                quantity: 1,
                image,
                toppings,
                instructions,
                kind: ItemKind::Food,
            });
        }
        self.persist();
    }

    /// Add `delta` (possibly negative) to one line's quantity. A result
    /// of zero or less removes the line entirely.
    pub fn update_quantity(&mut self, key: &LineKey, delta: i32) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.key() == *key) {
            line.quantity += delta;
        }
        self.lines.retain(|l| l.quantity > 0);
        self.persist();
    }

    /// Remove one specific line, identified by its full merge key.
    pub fn remove_line(&mut self, key: &LineKey) {
        self.lines.retain(|l| l.key() != *key);
        self.persist();
    }

    /// Remove every line with the given item id, regardless of
    /// customization. Use [`remove_line`](Self::remove_line) to target a
    /// single customized line.
    pub fn remove_item(&mut self, item_id: i64) {
        self.lines.retain(|l| l.item_id != item_id);
        self.persist();
    }

    /// Empty the cart (called after a successful checkout).
    pub fn clear(&mut self) {
        self.lines.clear();
        self.persist();
    }

    /// Current charge breakdown for these lines.
    pub fn totals(
        &self,
        engine: &PricingEngine,
        is_delivery: bool,
        delivery_fee_override: Option<f64>,
        distance_m: Option<f64>,
        promo: &PromoState,
    ) -> PriceBreakdown {
        engine.compute(
            &self.lines,
            is_delivery,
            delivery_fee_override,
            distance_m,
            promo,
        )
    }

    fn persist(&self) {
        if let Err(e) = self.store.store_cart(&self.lines) {
            tracing::warn!(error = %e, "Failed to persist cart snapshot");
        }
    }
}
