//! Cart and checkout quote types

use serde::{Deserialize, Serialize};

/// One line in a cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub product_id: String,
    pub vendor_id: String,
    pub title: String,
    pub qty: i64,
    pub unit_price_cents: i64,
    /// unit_price_cents * qty
    pub line_total_cents: i64,
    pub currency: String,
    /// Last stock figure seen for the product (0 = untracked)
    pub available_stock: i64,
    pub updated_at: i64,
}

impl CartItem {
    /// `unit_price_cents * qty`, or `None` when it does not fit in an i64
    pub fn line_total(unit_price_cents: i64, qty: i64) -> Option<i64> {
        unit_price_cents.checked_mul(qty)
    }

}

/// Read view of an actor's cart
///
/// `item_count` and `subtotal_cents` are derived from `items` on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub actor_key: String,
    pub currency: String,
    /// Insertion order
    pub items: Vec<CartItem>,
    pub item_count: i64,
    pub subtotal_cents: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Vendor-scoped slice of a checkout quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteShipment {
    pub vendor_id: String,
    pub items: Vec<CartItem>,
    pub item_count: i64,
    pub subtotal_cents: i64,
    pub shipping_fee_cents: i64,
    /// subtotal_cents + shipping_fee_cents
    pub total_cents: i64,
}

/// Ephemeral pricing of a cart, never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutQuote {
    pub currency: String,
    /// Sorted by vendor id
    pub shipments: Vec<QuoteShipment>,
    pub item_count: i64,
    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}
