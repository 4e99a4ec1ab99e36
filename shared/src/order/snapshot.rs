//! Placed order types
//!
//! An order is a denormalized snapshot of the cart at placement time. Only
//! `status`, shipment statuses and their timelines change afterwards.

use super::{OrderStatus, ShipmentStatus};
use serde::{Deserialize, Serialize};

/// Immutable order line, tagged with the shipment that carries it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub shipment_id: String,
    pub product_id: String,
    pub vendor_id: String,
    pub title: String,
    pub qty: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    pub currency: String,
}

/// One append-only timeline entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentStatusEvent {
    pub status: ShipmentStatus,
    /// `None` for the entry recorded at order placement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_user_id: Option<String>,
    pub at: i64,
}

/// Vendor-scoped part of an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderShipment {
    pub id: String,
    pub vendor_id: String,
    pub status: ShipmentStatus,
    pub item_count: i64,
    pub subtotal_cents: i64,
    pub shipping_fee_cents: i64,
    pub total_cents: i64,
    pub timeline: Vec<ShipmentStatusEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipped_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A placed order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_token: Option<String>,
    pub status: OrderStatus,
    pub currency: String,
    pub item_count: i64,
    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    /// Always 0: promotions are not applied to order totals
    pub discount_cents: i64,
    /// Always 0: prices are tax-inclusive
    pub tax_cents: i64,
    pub total_cents: i64,
    pub items: Vec<OrderItem>,
    /// Sorted by vendor id
    pub shipments: Vec<OrderShipment>,
    pub idempotency_key: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    pub fn shipment(&self, shipment_id: &str) -> Option<&OrderShipment> {
        self.shipments.iter().find(|s| s.id == shipment_id)
    }

    pub fn items_for_shipment<'a>(
        &'a self,
        shipment_id: &'a str,
    ) -> impl Iterator<Item = &'a OrderItem> + 'a {
        self.items.iter().filter(move |i| i.shipment_id == shipment_id)
    }
}

/// A shipment as its vendor sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorShipment {
    pub id: String,
    pub order_id: String,
    pub vendor_id: String,
    pub status: ShipmentStatus,
    pub currency: String,
    pub item_count: i64,
    pub subtotal_cents: i64,
    pub shipping_fee_cents: i64,
    pub total_cents: i64,
    pub items: Vec<OrderItem>,
    pub timeline: Vec<ShipmentStatusEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipped_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl VendorShipment {
    pub fn from_order(order: &Order, shipment: &OrderShipment) -> Self {
        Self {
            id: shipment.id.clone(),
            order_id: order.id.clone(),
            vendor_id: shipment.vendor_id.clone(),
            status: shipment.status,
            currency: order.currency.clone(),
            item_count: shipment.item_count,
            subtotal_cents: shipment.subtotal_cents,
            shipping_fee_cents: shipment.shipping_fee_cents,
            total_cents: shipment.total_cents,
            items: order.items_for_shipment(&shipment.id).cloned().collect(),
            timeline: shipment.timeline.clone(),
            shipped_at: shipment.shipped_at,
            delivered_at: shipment.delivered_at,
            created_at: shipment.created_at,
            updated_at: shipment.updated_at,
        }
    }
}
