//! OrderLedger - idempotent order placement and order/shipment state
//!
//! # Place Order Flow
//!
//! ```text
//! place_order(actor, key)
//!     ├─ 1. Resolve actor key, validate idempotency key
//!     ├─ 2. Replay check under read lock ("<actor>::<key>")
//!     ├─ 3. Take ledger write lock, re-check replay
//!     ├─ 4. CartStore::checkout (cart write lock)
//!     │      ├─ quote the live cart
//!     │      ├─ mint shipment / order / item ids, store order + request key
//!     │      └─ clear the cart
//!     └─ 5. Return the new order
//! ```
//!
//! Lock order is always ledger → cart; cart operations never take the ledger
//! lock, so placement cannot deadlock with cart mutations.

use super::state_machine::{can_transition_order, can_transition_shipment};
use crate::cart::{CartStore, actor_key};
use crate::core::{CommerceError, CommerceResult};
use parking_lot::RwLock;
use shared::models::Actor;
use shared::order::{
    CheckoutQuote, Order, OrderItem, OrderShipment, OrderStatus, ShipmentStatus,
    ShipmentStatusEvent, VendorShipment,
};
use shared::util::{now_millis, prefixed_id};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
struct LedgerState {
    orders: HashMap<String, Order>,
    /// "<actor key>::<idempotency key>" -> order id
    order_ids_by_request: HashMap<String, String>,
    /// shipment id -> order id
    shipment_order_index: HashMap<String, String>,
}

/// Order Ledger
pub struct OrderLedger {
    state: RwLock<LedgerState>,
    carts: Arc<CartStore>,
}

impl std::fmt::Debug for OrderLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderLedger")
            .field("orders", &self.state.read().orders.len())
            .field("carts", &self.carts)
            .finish()
    }
}

impl OrderLedger {
    pub fn new(carts: Arc<CartStore>) -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
            carts,
        }
    }

    pub fn carts(&self) -> &Arc<CartStore> {
        &self.carts
    }

    // ========================================================================
    // Placement
    // ========================================================================

    /// Turn the actor's cart into an order, exactly once per idempotency key
    ///
    /// A replayed key returns the stored order verbatim, even if the cart has
    /// changed since.
    pub fn place_order(&self, actor: &Actor, idempotency_key: &str) -> CommerceResult<Order> {
        let key = actor_key(actor)?;
        let idempotency_key = idempotency_key.trim();
        if idempotency_key.is_empty() {
            return Err(CommerceError::IdempotencyKey);
        }
        let request_key = format!("{}::{}", key, idempotency_key);

        // 1. Replay check
        if let Some(order) = self.replayed_order(&self.state.read(), &request_key) {
            tracing::debug!(order_id = %order.id, actor = %key, "Replayed place-order request");
            return Ok(order);
        }

        let mut state = self.state.write();

        // 2. Double-check under the write lock
        if let Some(order) = self.replayed_order(&state, &request_key) {
            tracing::debug!(order_id = %order.id, actor = %key, "Replayed place-order request");
            return Ok(order);
        }

        // 3. Quote, store and clear the cart atomically
        let order = self.carts.checkout(&key, |quote| {
            let order = build_order(actor, idempotency_key, quote);
            for shipment in &order.shipments {
                state
                    .shipment_order_index
                    .insert(shipment.id.clone(), order.id.clone());
            }
            state
                .order_ids_by_request
                .insert(request_key.clone(), order.id.clone());
            state.orders.insert(order.id.clone(), order.clone());
            Ok(order)
        })?;

        tracing::info!(
            order_id = %order.id,
            actor = %key,
            shipments = order.shipments.len(),
            total_cents = order.total_cents,
            "Order placed"
        );
        Ok(order)
    }

    fn replayed_order(&self, state: &LedgerState, request_key: &str) -> Option<Order> {
        state
            .order_ids_by_request
            .get(request_key)
            .and_then(|id| state.orders.get(id))
            .cloned()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Ownership-scoped lookup: buyers see their own orders, guests theirs
    pub fn get_order(&self, actor: &Actor, order_id: &str) -> CommerceResult<Option<Order>> {
        actor_key(actor)?;
        let state = self.state.read();
        let order = state.orders.get(order_id.trim()).filter(|order| match actor {
            Actor::Buyer { .. } => order.buyer_user_id.as_deref() == actor.buyer_user_id(),
            Actor::Guest { .. } => order.guest_token.as_deref() == actor.guest_token(),
        });
        Ok(order.cloned())
    }

    pub fn get_order_for_admin(&self, order_id: &str) -> Option<Order> {
        self.state.read().orders.get(order_id.trim()).cloned()
    }

    /// All orders, newest first, optionally filtered by status
    pub fn list_orders(&self, status_filter: Option<&str>) -> CommerceResult<Vec<Order>> {
        let status = match status_filter.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                raw.parse::<OrderStatus>()
                    .map_err(|_| CommerceError::InvalidOrderStatus(raw.to_string()))?,
            ),
            None => None,
        };

        let state = self.state.read();
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|order| status.is_none_or(|s| order.status == s))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(orders)
    }

    // ========================================================================
    // Order status
    // ========================================================================

    /// Admin override, enforcing the same monotonic rules as payment callbacks
    pub fn update_order_status(&self, order_id: &str, status: &str) -> CommerceResult<Order> {
        let target = status
            .parse::<OrderStatus>()
            .map_err(|_| CommerceError::InvalidOrderStatus(status.to_string()))?;

        let mut state = self.state.write();
        let order = state
            .orders
            .get_mut(order_id.trim())
            .ok_or_else(|| CommerceError::OrderNotFound(order_id.to_string()))?;

        if order.status == target {
            return Ok(order.clone());
        }
        if !can_transition_order(order.status, target) {
            tracing::warn!(
                order_id = %order.id,
                from = %order.status,
                to = %target,
                "Rejected order status transition"
            );
            return Err(CommerceError::OrderStatusTransition {
                from: order.status.to_string(),
                to: target.to_string(),
            });
        }

        let from = order.status;
        order.status = target;
        order.updated_at = now_millis();
        tracing::info!(order_id = %order.id, from = %from, to = %target, "Order status updated");
        Ok(order.clone())
    }

    pub fn mark_order_paid(&self, order_id: &str) -> bool {
        self.apply_payment_status(order_id, OrderStatus::Paid)
    }

    pub fn mark_order_cod_confirmed(&self, order_id: &str) -> bool {
        self.apply_payment_status(order_id, OrderStatus::CodConfirmed)
    }

    pub fn mark_order_payment_failed(&self, order_id: &str) -> bool {
        self.apply_payment_status(order_id, OrderStatus::PaymentFailed)
    }

    /// Payment callbacks: a disallowed transition is a successful no-op, so a
    /// late "failed" can never overwrite "paid". Returns whether the order
    /// exists.
    fn apply_payment_status(&self, order_id: &str, target: OrderStatus) -> bool {
        let mut state = self.state.write();
        let Some(order) = state.orders.get_mut(order_id.trim()) else {
            tracing::warn!(order_id = %order_id, status = %target, "Payment callback for unknown order");
            return false;
        };

        if order.status != target && can_transition_order(order.status, target) {
            tracing::info!(order_id = %order.id, from = %order.status, to = %target, "Order payment status changed");
            order.status = target;
            order.updated_at = now_millis();
        } else {
            tracing::debug!(order_id = %order.id, status = %order.status, ignored = %target, "Payment callback left order unchanged");
        }
        true
    }

    // ========================================================================
    // Vendor shipments
    // ========================================================================

    /// Vendor-scoped shipments, most recently updated first
    pub fn list_vendor_shipments(&self, vendor_id: &str) -> CommerceResult<Vec<VendorShipment>> {
        let vendor_id = non_blank_vendor(vendor_id)?;

        let state = self.state.read();
        let mut shipments: Vec<VendorShipment> = state
            .orders
            .values()
            .flat_map(move |order| {
                order
                    .shipments
                    .iter()
                    .filter(move |s| s.vendor_id == vendor_id)
                    .map(move |s| VendorShipment::from_order(order, s))
            })
            .collect();
        shipments.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        Ok(shipments)
    }

    pub fn get_vendor_shipment(
        &self,
        vendor_id: &str,
        shipment_id: &str,
    ) -> CommerceResult<Option<VendorShipment>> {
        let vendor_id = non_blank_vendor(vendor_id)?;

        let state = self.state.read();
        let Some((order, shipment)) = locate_shipment(&state, shipment_id.trim()) else {
            return Ok(None);
        };
        if shipment.vendor_id != vendor_id {
            return Err(CommerceError::ShipmentForbidden(shipment.id.clone()));
        }
        Ok(Some(VendorShipment::from_order(order, shipment)))
    }

    /// Advance a vendor's shipment one step (or cancel it)
    ///
    /// Re-sending the current status is a no-op that adds no timeline entry.
    pub fn update_vendor_shipment_status(
        &self,
        vendor_id: &str,
        shipment_id: &str,
        status: &str,
        actor_user_id: &str,
    ) -> CommerceResult<VendorShipment> {
        let vendor_id = non_blank_vendor(vendor_id)?;
        let shipment_id = shipment_id.trim();
        if shipment_id.is_empty() {
            return Err(CommerceError::ShipmentNotFound(String::new()));
        }
        let target = status
            .parse::<ShipmentStatus>()
            .map_err(|_| CommerceError::InvalidShipmentStatus(status.to_string()))?;

        let mut state = self.state.write();
        let order_id = state
            .shipment_order_index
            .get(shipment_id)
            .cloned()
            .ok_or_else(|| CommerceError::ShipmentNotFound(shipment_id.to_string()))?;
        let order = state
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| CommerceError::ShipmentNotFound(shipment_id.to_string()))?;
        let index = order
            .shipments
            .iter()
            .position(|s| s.id == shipment_id)
            .ok_or_else(|| CommerceError::ShipmentNotFound(shipment_id.to_string()))?;

        let shipment = &mut order.shipments[index];
        if shipment.vendor_id != vendor_id {
            return Err(CommerceError::ShipmentForbidden(shipment_id.to_string()));
        }
        if shipment.status == target {
            return Ok(VendorShipment::from_order(order, &order.shipments[index]));
        }
        if !can_transition_shipment(shipment.status, target) {
            tracing::warn!(
                shipment_id = %shipment_id,
                vendor_id = %vendor_id,
                from = %shipment.status,
                to = %target,
                "Rejected shipment status transition"
            );
            return Err(CommerceError::ShipmentTransition {
                from: shipment.status.to_string(),
                to: target.to_string(),
            });
        }

        let now = now_millis();
        let from = shipment.status;
        shipment.status = target;
        shipment.updated_at = now;
        match target {
            ShipmentStatus::Shipped => shipment.shipped_at = Some(now),
            ShipmentStatus::Delivered => shipment.delivered_at = Some(now),
            _ => {}
        }
        let actor_user_id = actor_user_id.trim();
        shipment.timeline.push(ShipmentStatusEvent {
            status: target,
            actor_user_id: (!actor_user_id.is_empty()).then(|| actor_user_id.to_string()),
            at: now,
        });
        order.updated_at = now;

        tracing::info!(
            order_id = %order.id,
            shipment_id = %shipment_id,
            vendor_id = %vendor_id,
            from = %from,
            to = %target,
            "Shipment status updated"
        );
        Ok(VendorShipment::from_order(order, &order.shipments[index]))
    }
}

fn non_blank_vendor(vendor_id: &str) -> CommerceResult<&str> {
    let vendor_id = vendor_id.trim();
    if vendor_id.is_empty() {
        return Err(CommerceError::InvalidVendor);
    }
    Ok(vendor_id)
}

fn locate_shipment<'a>(
    state: &'a LedgerState,
    shipment_id: &str,
) -> Option<(&'a Order, &'a OrderShipment)> {
    let order = state
        .shipment_order_index
        .get(shipment_id)
        .and_then(|order_id| state.orders.get(order_id))?;
    let shipment = order.shipment(shipment_id)?;
    Some((order, shipment))
}

/// Denormalize a quote into an immutable order
fn build_order(actor: &Actor, idempotency_key: &str, quote: CheckoutQuote) -> Order {
    let now = now_millis();
    let mut items = Vec::new();
    let mut shipments = Vec::with_capacity(quote.shipments.len());

    for group in quote.shipments {
        let shipment_id = prefixed_id("shp");
        for line in &group.items {
            items.push(OrderItem {
                id: prefixed_id("oit"),
                shipment_id: shipment_id.clone(),
                product_id: line.product_id.clone(),
                vendor_id: line.vendor_id.clone(),
                title: line.title.clone(),
                qty: line.qty,
                unit_price_cents: line.unit_price_cents,
                line_total_cents: line.line_total_cents,
                currency: line.currency.clone(),
            });
        }
        shipments.push(OrderShipment {
            id: shipment_id,
            vendor_id: group.vendor_id,
            status: ShipmentStatus::Pending,
            item_count: group.item_count,
            subtotal_cents: group.subtotal_cents,
            shipping_fee_cents: group.shipping_fee_cents,
            total_cents: group.total_cents,
            timeline: vec![ShipmentStatusEvent {
                status: ShipmentStatus::Pending,
                actor_user_id: None,
                at: now,
            }],
            shipped_at: None,
            delivered_at: None,
            created_at: now,
            updated_at: now,
        });
    }

    Order {
        id: prefixed_id("ord"),
        buyer_user_id: actor.buyer_user_id().map(str::to_string),
        guest_token: actor.guest_token().map(str::to_string),
        status: OrderStatus::PendingPayment,
        currency: quote.currency,
        item_count: quote.item_count,
        subtotal_cents: quote.subtotal_cents,
        shipping_cents: quote.shipping_cents,
        discount_cents: quote.discount_cents,
        tax_cents: quote.tax_cents,
        total_cents: quote.total_cents,
        items,
        shipments,
        idempotency_key: idempotency_key.to_string(),
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests;
