//! CartStore - per-actor mutable carts
//!
//! Carts are created lazily on first access and keep their lines in insertion
//! order. Every read derives `item_count`/`subtotal_cents` from the live lines,
//! so the aggregates can never drift from the items.

use crate::checkout::build_quote;
use crate::core::{CommerceError, CommerceResult};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use shared::models::{Actor, ActorKey, ProductSnapshot};
use shared::order::{Cart, CartItem, CheckoutQuote};
use shared::util::{now_millis, prefixed_id};
use std::collections::HashMap;

/// Internal cart state
#[derive(Debug, Clone)]
struct CartState {
    currency: String,
    /// Item ids in insertion order
    ordered_ids: Vec<String>,
    items: HashMap<String, CartItem>,
    /// product_id -> item_id
    by_product: HashMap<String, String>,
    created_at: i64,
    updated_at: i64,
}

impl CartState {
    fn new(currency: &str) -> Self {
        let now = now_millis();
        Self {
            currency: currency.to_string(),
            ordered_ids: Vec::new(),
            items: HashMap::new(),
            by_product: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn ordered_items(&self) -> Vec<CartItem> {
        self.ordered_ids
            .iter()
            .filter_map(|id| self.items.get(id).cloned())
            .collect()
    }

    fn snapshot(&self, key: &ActorKey) -> Cart {
        let items = self.ordered_items();
        let item_count = items.iter().map(|i| i.qty).sum();
        let subtotal_cents = items.iter().map(|i| i.line_total_cents).sum();
        Cart {
            actor_key: key.to_string(),
            currency: self.currency.clone(),
            items,
            item_count,
            subtotal_cents,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Whether item count and subtotal still fit in an i64 once the line
    /// `replacing` (if any) is swapped for one of `qty` / `line_total`
    fn totals_fit(&self, replacing: Option<&str>, qty: i64, line_total: i64) -> bool {
        let mut item_count = Some(qty);
        let mut subtotal = Some(line_total);
        for (id, item) in &self.items {
            if replacing == Some(id.as_str()) {
                continue;
            }
            item_count = item_count.and_then(|n| n.checked_add(item.qty));
            subtotal = subtotal.and_then(|n| n.checked_add(item.line_total_cents));
        }
        item_count.is_some() && subtotal.is_some()
    }

    fn clear(&mut self) {
        self.ordered_ids.clear();
        self.items.clear();
        self.by_product.clear();
        self.updated_at = now_millis();
    }
}

/// Cart Store
///
/// Owns one lock over all carts. Cart operations never take any other
/// service's lock.
pub struct CartStore {
    carts: RwLock<HashMap<ActorKey, CartState>>,
    currency: String,
    shipping_fee_cents: i64,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("carts", &self.carts.read().len())
            .field("currency", &self.currency)
            .field("shipping_fee_cents", &self.shipping_fee_cents)
            .finish()
    }
}

impl CartStore {
    pub fn new(currency: impl Into<String>, shipping_fee_cents: i64) -> Self {
        Self {
            carts: RwLock::new(HashMap::new()),
            currency: currency.into(),
            shipping_fee_cents,
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn shipping_fee_cents(&self) -> i64 {
        self.shipping_fee_cents
    }

    /// Get the actor's cart, creating an empty one on first access
    pub fn get_cart(&self, actor: &Actor) -> CommerceResult<Cart> {
        let key = actor_key(actor)?;

        let carts = self.carts.upgradable_read();
        if let Some(state) = carts.get(&key) {
            return Ok(state.snapshot(&key));
        }

        let mut carts = RwLockUpgradableReadGuard::upgrade(carts);
        let state = carts
            .entry(key.clone())
            .or_insert_with(|| CartState::new(&self.currency));
        Ok(state.snapshot(&key))
    }

    /// Add a product line, or re-price an existing line for the same product
    pub fn upsert_item(
        &self,
        actor: &Actor,
        product: &ProductSnapshot,
        qty: i64,
    ) -> CommerceResult<Cart> {
        let key = actor_key(actor)?;
        if qty <= 0 {
            return Err(CommerceError::InvalidQuantity);
        }
        if !product.is_valid() {
            return Err(CommerceError::InvalidProduct);
        }
        if product.is_short_of(qty) {
            return Err(CommerceError::InsufficientStock);
        }
        let line_total = CartItem::line_total(product.unit_price_cents, qty)
            .ok_or(CommerceError::InvalidQuantity)?;

        let mut carts = self.carts.write();
        let state = carts
            .entry(key.clone())
            .or_insert_with(|| CartState::new(&self.currency));
        if state.currency != product.currency {
            return Err(CommerceError::CurrencyMismatch {
                cart: state.currency.clone(),
                product: product.currency.clone(),
            });
        }

        let existing_id = state.by_product.get(&product.product_id).cloned();
        if !state.totals_fit(existing_id.as_deref(), qty, line_total) {
            return Err(CommerceError::InvalidQuantity);
        }

        let now = now_millis();
        match existing_id.and_then(|id| state.items.get_mut(&id)) {
            Some(item) => {
                item.qty = qty;
                item.unit_price_cents = product.unit_price_cents;
                item.line_total_cents = line_total;
                item.available_stock = product.stock_qty;
                item.updated_at = now;
                tracing::debug!(actor = %key, item_id = %item.id, qty, "Cart line re-priced");
            }
            None => {
                let item = CartItem {
                    id: prefixed_id("cit"),
                    product_id: product.product_id.clone(),
                    vendor_id: product.vendor_id.clone(),
                    title: product.title.trim().to_string(),
                    qty,
                    unit_price_cents: product.unit_price_cents,
                    line_total_cents: line_total,
                    currency: product.currency.clone(),
                    available_stock: product.stock_qty,
                    updated_at: now,
                };
                tracing::debug!(
                    actor = %key,
                    item_id = %item.id,
                    product_id = %item.product_id,
                    qty,
                    "Cart line added"
                );
                state
                    .by_product
                    .insert(item.product_id.clone(), item.id.clone());
                state.ordered_ids.push(item.id.clone());
                state.items.insert(item.id.clone(), item);
            }
        }
        state.updated_at = now;

        Ok(state.snapshot(&key))
    }

    /// Change the quantity of an existing line
    pub fn update_item_qty(&self, actor: &Actor, item_id: &str, qty: i64) -> CommerceResult<Cart> {
        let key = actor_key(actor)?;
        if qty <= 0 {
            return Err(CommerceError::InvalidQuantity);
        }

        let mut carts = self.carts.write();
        let state = carts
            .entry(key.clone())
            .or_insert_with(|| CartState::new(&self.currency));
        let item = state
            .items
            .get(item_id)
            .ok_or_else(|| CommerceError::CartItemNotFound(item_id.to_string()))?;
        if item.available_stock > 0 && qty > item.available_stock {
            return Err(CommerceError::InsufficientStock);
        }
        let line_total = CartItem::line_total(item.unit_price_cents, qty)
            .ok_or(CommerceError::InvalidQuantity)?;
        if !state.totals_fit(Some(item_id), qty, line_total) {
            return Err(CommerceError::InvalidQuantity);
        }

        let now = now_millis();
        if let Some(item) = state.items.get_mut(item_id) {
            item.qty = qty;
            item.line_total_cents = line_total;
            item.updated_at = now;
        }
        state.updated_at = now;

        Ok(state.snapshot(&key))
    }

    /// Remove a line from the cart
    pub fn remove_item(&self, actor: &Actor, item_id: &str) -> CommerceResult<Cart> {
        let key = actor_key(actor)?;

        let mut carts = self.carts.write();
        let state = carts
            .entry(key.clone())
            .or_insert_with(|| CartState::new(&self.currency));
        let item = state
            .items
            .remove(item_id)
            .ok_or_else(|| CommerceError::CartItemNotFound(item_id.to_string()))?;
        state.by_product.remove(&item.product_id);
        state.ordered_ids.retain(|id| id != item_id);
        state.updated_at = now_millis();

        Ok(state.snapshot(&key))
    }

    /// Price the actor's current cart
    pub fn quote(&self, actor: &Actor) -> CommerceResult<CheckoutQuote> {
        let key = actor_key(actor)?;
        let carts = self.carts.read();
        let items = carts
            .get(&key)
            .map(CartState::ordered_items)
            .unwrap_or_default();
        build_quote(&self.currency, &items, self.shipping_fee_cents)
    }

    /// Quote the cart, hand the quote to `commit`, and clear the cart only if
    /// `commit` succeeds. The cart lock is held across all three steps.
    pub(crate) fn checkout<T>(
        &self,
        key: &ActorKey,
        commit: impl FnOnce(CheckoutQuote) -> CommerceResult<T>,
    ) -> CommerceResult<T> {
        let mut carts = self.carts.write();
        let state = carts
            .entry(key.clone())
            .or_insert_with(|| CartState::new(&self.currency));

        let quote = build_quote(&state.currency, &state.ordered_items(), self.shipping_fee_cents)?;
        let committed = commit(quote)?;
        state.clear();

        Ok(committed)
    }
}

/// Resolve the ownership key or fail with `InvalidActor`
pub(crate) fn actor_key(actor: &Actor) -> CommerceResult<ActorKey> {
    actor.key().ok_or(CommerceError::InvalidActor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> CartStore {
        CartStore::new("USD", 500)
    }

    fn product(id: &str, vendor: &str, price: i64, stock: i64) -> ProductSnapshot {
        ProductSnapshot {
            product_id: id.to_string(),
            vendor_id: vendor.to_string(),
            title: format!("Product {}", id),
            currency: "USD".to_string(),
            unit_price_cents: price,
            stock_qty: stock,
        }
    }

    #[test]
    fn test_get_cart_creates_empty_cart() {
        let store = create_test_store();
        let cart = store.get_cart(&Actor::guest("g1")).unwrap();
        assert_eq!(cart.actor_key, "guest:g1");
        assert_eq!(cart.currency, "USD");
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal_cents, 0);
    }

    #[test]
    fn test_invalid_actor_rejected() {
        let store = create_test_store();
        assert_eq!(
            store.get_cart(&Actor::buyer(" ")).unwrap_err(),
            CommerceError::InvalidActor
        );
        assert_eq!(
            store
                .upsert_item(&Actor::guest(""), &product("p1", "v1", 100, 0), 1)
                .unwrap_err(),
            CommerceError::InvalidActor
        );
    }

    #[test]
    fn test_upsert_validation() {
        let store = create_test_store();
        let actor = Actor::buyer("u1");

        assert_eq!(
            store
                .upsert_item(&actor, &product("p1", "v1", 100, 0), 0)
                .unwrap_err(),
            CommerceError::InvalidQuantity
        );

        let mut bad = product("p1", "v1", 100, 0);
        bad.vendor_id = String::new();
        assert_eq!(
            store.upsert_item(&actor, &bad, 1).unwrap_err(),
            CommerceError::InvalidProduct
        );

        assert_eq!(
            store
                .upsert_item(&actor, &product("p1", "v1", 100, 2), 3)
                .unwrap_err(),
            CommerceError::InsufficientStock
        );

        let mut eur = product("p2", "v1", 100, 0);
        eur.currency = "EUR".to_string();
        assert!(matches!(
            store.upsert_item(&actor, &eur, 1).unwrap_err(),
            CommerceError::CurrencyMismatch { .. }
        ));

        // nothing was added by the failed calls
        assert!(store.get_cart(&actor).unwrap().is_empty());
    }

    #[test]
    fn test_aggregates_follow_items() {
        let store = create_test_store();
        let actor = Actor::buyer("u1");

        store
            .upsert_item(&actor, &product("p1", "v1", 600, 0), 2)
            .unwrap();
        let cart = store
            .upsert_item(&actor, &product("p2", "v2", 2600, 10), 1)
            .unwrap();

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.item_count, 3);
        assert_eq!(cart.subtotal_cents, 3800);
        assert_eq!(
            cart.subtotal_cents,
            cart.items
                .iter()
                .map(|i| i.unit_price_cents * i.qty)
                .sum::<i64>()
        );
        // insertion order
        assert_eq!(cart.items[0].product_id, "p1");
        assert_eq!(cart.items[1].product_id, "p2");
    }

    #[test]
    fn test_repeat_add_overwrites_line() {
        let store = create_test_store();
        let actor = Actor::guest("g1");

        let first = store
            .upsert_item(&actor, &product("p1", "v1", 600, 0), 2)
            .unwrap();
        let second = store
            .upsert_item(&actor, &product("p1", "v1", 550, 7), 5)
            .unwrap();

        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].id, first.items[0].id);
        assert_eq!(second.items[0].qty, 5);
        assert_eq!(second.items[0].unit_price_cents, 550);
        assert_eq!(second.items[0].available_stock, 7);
        assert_eq!(second.subtotal_cents, 2750);
    }

    #[test]
    fn test_update_item_qty() {
        let store = create_test_store();
        let actor = Actor::buyer("u1");
        let cart = store
            .upsert_item(&actor, &product("p1", "v1", 600, 4), 1)
            .unwrap();
        let item_id = cart.items[0].id.clone();

        let cart = store.update_item_qty(&actor, &item_id, 3).unwrap();
        assert_eq!(cart.items[0].line_total_cents, 1800);
        assert!(cart.updated_at >= cart.created_at);

        assert_eq!(
            store.update_item_qty(&actor, &item_id, 5).unwrap_err(),
            CommerceError::InsufficientStock
        );
        assert_eq!(
            store.update_item_qty(&actor, &item_id, -1).unwrap_err(),
            CommerceError::InvalidQuantity
        );
        assert!(matches!(
            store.update_item_qty(&actor, "cit_missing", 1).unwrap_err(),
            CommerceError::CartItemNotFound(_)
        ));
    }

    #[test]
    fn test_line_total_overflow_rejected() {
        let store = create_test_store();
        let actor = Actor::buyer("u1");

        // untracked stock never caps the quantity
        assert_eq!(
            store
                .upsert_item(&actor, &product("p1", "v1", 600, 0), i64::MAX / 100)
                .unwrap_err(),
            CommerceError::InvalidQuantity
        );
        assert!(store.get_cart(&actor).unwrap().is_empty());

        let cart = store
            .upsert_item(&actor, &product("p1", "v1", 600, 0), 2)
            .unwrap();
        let item_id = cart.items[0].id.clone();
        assert_eq!(
            store
                .update_item_qty(&actor, &item_id, i64::MAX / 100)
                .unwrap_err(),
            CommerceError::InvalidQuantity
        );
        assert_eq!(
            store
                .upsert_item(&actor, &product("p1", "v1", 600, 0), i64::MAX / 100)
                .unwrap_err(),
            CommerceError::InvalidQuantity
        );

        let cart = store.get_cart(&actor).unwrap();
        assert_eq!(cart.items[0].qty, 2);
        assert_eq!(cart.subtotal_cents, 1200);
    }

    #[test]
    fn test_cart_subtotal_overflow_rejected() {
        let store = create_test_store();
        let actor = Actor::guest("g1");
        let half = i64::MAX / 2 + 1;

        // each line fits on its own, the sum does not
        store
            .upsert_item(&actor, &product("p1", "v1", half, 0), 1)
            .unwrap();
        let cart = store
            .upsert_item(&actor, &product("p2", "v2", 1, 0), half - 1)
            .unwrap();
        assert_eq!(cart.subtotal_cents, i64::MAX);
        assert_eq!(cart.item_count, half);

        assert_eq!(
            store
                .upsert_item(&actor, &product("p3", "v3", 1, 0), 1)
                .unwrap_err(),
            CommerceError::InvalidQuantity
        );
        let p2_line = cart.items[1].id.clone();
        assert_eq!(
            store.update_item_qty(&actor, &p2_line, half).unwrap_err(),
            CommerceError::InvalidQuantity
        );
        // replacing a line only counts its new total
        let cart = store
            .upsert_item(&actor, &product("p2", "v2", 1, 0), 5)
            .unwrap();
        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.subtotal_cents, half + 5);
    }

    #[test]
    fn test_remove_item() {
        let store = create_test_store();
        let actor = Actor::buyer("u1");
        store
            .upsert_item(&actor, &product("p1", "v1", 600, 0), 1)
            .unwrap();
        let cart = store
            .upsert_item(&actor, &product("p2", "v1", 100, 0), 1)
            .unwrap();

        let cart = store.remove_item(&actor, &cart.items[0].id).unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].product_id, "p2");
        assert_eq!(cart.subtotal_cents, 100);

        assert!(matches!(
            store.remove_item(&actor, "cit_missing").unwrap_err(),
            CommerceError::CartItemNotFound(_)
        ));

        // the removed product can be added again as a new line
        let cart = store
            .upsert_item(&actor, &product("p1", "v1", 600, 0), 1)
            .unwrap();
        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.items[1].product_id, "p1");
    }

    #[test]
    fn test_carts_are_actor_scoped() {
        let store = create_test_store();
        let buyer = Actor::buyer("u1");
        let cart = store
            .upsert_item(&buyer, &product("p1", "v1", 600, 0), 1)
            .unwrap();

        let other = Actor::guest("u1");
        assert!(store.get_cart(&other).unwrap().is_empty());
        assert!(matches!(
            store.remove_item(&other, &cart.items[0].id).unwrap_err(),
            CommerceError::CartItemNotFound(_)
        ));
    }

    #[test]
    fn test_checkout_clears_only_on_commit() {
        let store = create_test_store();
        let actor = Actor::buyer("u1");
        let key = actor.key().unwrap();
        store
            .upsert_item(&actor, &product("p1", "v1", 600, 0), 2)
            .unwrap();

        let failed: CommerceResult<()> =
            store.checkout(&key, |_| Err(CommerceError::IdempotencyKey));
        assert!(failed.is_err());
        assert_eq!(store.get_cart(&actor).unwrap().item_count, 2);

        let total = store.checkout(&key, |quote| Ok(quote.total_cents)).unwrap();
        assert_eq!(total, 1700);
        assert!(store.get_cart(&actor).unwrap().is_empty());
    }
}
