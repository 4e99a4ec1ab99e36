use super::*;
use shared::models::ProductSnapshot;

const SHIPPING_FEE: i64 = 500;

fn create_test_ledger() -> OrderLedger {
    OrderLedger::new(Arc::new(CartStore::new("USD", SHIPPING_FEE)))
}

fn product(id: &str, vendor: &str, price: i64) -> ProductSnapshot {
    ProductSnapshot {
        product_id: id.to_string(),
        vendor_id: vendor.to_string(),
        title: format!("Product {}", id),
        currency: "USD".to_string(),
        unit_price_cents: price,
        stock_qty: 0,
    }
}

// ========================================================================
// Helper: fill a cart with vendor A 2×600 and vendor B 1×2600
// ========================================================================

fn fill_two_vendor_cart(ledger: &OrderLedger, actor: &Actor) {
    ledger
        .carts()
        .upsert_item(actor, &product("p-b", "vendor-b", 2600), 1)
        .unwrap();
    ledger
        .carts()
        .upsert_item(actor, &product("p-a", "vendor-a", 600), 2)
        .unwrap();
}

fn place_two_vendor_order(ledger: &OrderLedger, actor: &Actor, key: &str) -> Order {
    fill_two_vendor_cart(ledger, actor);
    ledger.place_order(actor, key).unwrap()
}

mod test_status;
