//! Cart line model

use serde::{Deserialize, Serialize};

/// Broad menu category of a line, used for display grouping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    #[default]
    Food,
    Drink,
}

/// One distinct cart entry: item + customization + quantity.
///
/// Two lines are the same entry (and merge by incrementing quantity) only
/// when their [`LineKey`]s are equal; any difference in toppings or
/// instructions makes a distinct line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Menu item id (catalog lookup is the caller's concern)
    pub item_id: i64,
    /// Item name as shown to the customer
    pub name: String,
    /// Per-unit price including topping charges
    pub unit_price: f64,
    /// Quantity, always ≥ 1 for a stored line
    pub quantity: i32,
    /// Image reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Selected toppings (possibly empty)
    #[serde(default)]
    pub toppings: Vec<String>,
    /// Free-form preparation instructions (possibly empty)
    #[serde(default)]
    pub instructions: String,
    /// Menu category
    #[serde(default)]
    pub kind: ItemKind,
}

impl CartLine {
    /// Merge identity of this line.
    pub fn key(&self) -> LineKey {
        LineKey::new(self.item_id, &self.toppings, &self.instructions)
    }

    /// Line total for display. Pricing recomputes this with Decimal.
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

/// Merge identity for cart lines: `(item_id, toppings-set, instructions)`.
///
/// Toppings are compared as a set (sorted, deduplicated), so selection
/// order does not create spurious distinct lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub item_id: i64,
    toppings: Vec<String>,
    instructions: String,
}

impl LineKey {
    pub fn new(item_id: i64, toppings: &[String], instructions: &str) -> Self {
        let mut toppings: Vec<String> = toppings.to_vec();
        toppings.sort();
        toppings.dedup();
        Self {
            item_id,
            toppings,
            instructions: instructions.to_string(),
        }
    }

    /// Key of a plain (uncustomized) addition of the given item.
    pub fn plain(item_id: i64) -> Self {
        Self::new(item_id, &[], "")
    }
}
