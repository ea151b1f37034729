//! Cart state and totals
//!
//! The cart maps product ids to quantities and outlives any catalog: entries
//! may reference ids that no longer resolve after a reload, and totals degrade
//! to a placeholder line for those instead of failing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::catalog::Catalog;

/// Upper bound for a stored line quantity.
pub const MAX_QUANTITY: u32 = 9_999;

/// Display name for a cart line whose product id no longer resolves.
pub const UNKNOWN_PRODUCT_NAME: &str = "(unknown)";

/// Quantity-keyed product selections.
///
/// Invariant: every stored quantity is in `[1, MAX_QUANTITY]`; a line driven
/// to zero or below is removed, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: BTreeMap<String, u32>,
}

/// One resolved cart line for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
    pub subtotal: f64,
}

/// Resolved cart lines with their grand total.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartTotals {
    pub lines: Vec<CartLineView>,
    pub grand_total: f64,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to the line's quantity, creating the line at 0 if absent.
    ///
    /// A resulting quantity of zero or below removes the line; anything else
    /// is clamped into `[1, MAX_QUANTITY]`.
    pub fn adjust_quantity(&mut self, product_id: &str, delta: i64) {
        let current = i64::from(self.quantity(product_id).unwrap_or(0));
        let next = current.saturating_add(delta);
        if next <= 0 {
            self.lines.remove(product_id);
        } else {
            let clamped = next.min(i64::from(MAX_QUANTITY)) as u32;
            self.lines.insert(product_id.to_string(), clamped);
        }
    }

    /// Insert a line with an already-validated quantity. Out-of-range values
    /// are clamped; zero removes the line.
    pub fn set_quantity(&mut self, product_id: &str, quantity: u32) {
        if quantity == 0 {
            self.lines.remove(product_id);
        } else {
            self.lines
                .insert(product_id.to_string(), quantity.min(MAX_QUANTITY));
        }
    }

    pub fn remove_line(&mut self, product_id: &str) {
        self.lines.remove(product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn quantity(&self, product_id: &str) -> Option<u32> {
        self.lines.get(product_id).copied()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all line quantities, for badge-style counters.
    pub fn total_units(&self) -> u64 {
        self.lines.values().map(|q| u64::from(*q)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines in stable id order.
    pub fn lines(&self) -> impl Iterator<Item = (&str, u32)> {
        self.lines.iter().map(|(id, qty)| (id.as_str(), *qty))
    }

    /// Resolve every line against the catalog and compute subtotals.
    ///
    /// A pure read: the cart is not mutated. Stale ids resolve to a
    /// zero-price placeholder line named [`UNKNOWN_PRODUCT_NAME`].
    pub fn compute_totals(&self, catalog: &Catalog) -> CartTotals {
        let mut totals = CartTotals::default();
        for (id, quantity) in self.lines() {
            let (name, unit_price) = match catalog.product_by_id(id) {
                Some(p) => (p.name.clone(), p.price),
                None => (UNKNOWN_PRODUCT_NAME.to_string(), 0.0),
            };
            let subtotal = unit_price * f64::from(quantity);
            totals.grand_total += subtotal;
            totals.lines.push(CartLineView {
                product_id: id.to_string(),
                name,
                unit_price,
                quantity,
                subtotal,
            });
        }
        totals
    }
}
