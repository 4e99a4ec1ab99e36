//! Product Model

use serde::{Deserialize, Serialize};

/// Point-in-time copy of a catalog product, captured at add-to-cart time
///
/// Prices are tax-inclusive integer cents. A stock of `0` means the catalog
/// does not track stock for the product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub product_id: String,
    pub vendor_id: String,
    pub title: String,
    pub currency: String,
    pub unit_price_cents: i64,
    pub stock_qty: i64,
}

impl ProductSnapshot {
    /// Non-empty identity fields and non-negative price/stock
    pub fn is_valid(&self) -> bool {
        !self.product_id.trim().is_empty()
            && !self.vendor_id.trim().is_empty()
            && !self.title.trim().is_empty()
            && !self.currency.trim().is_empty()
            && self.unit_price_cents >= 0
            && self.stock_qty >= 0
    }

    /// Whether a tracked stock figure is below `qty`
    pub fn is_short_of(&self, qty: i64) -> bool {
        self.stock_qty > 0 && qty > self.stock_qty
    }
}
