//! Audit record types
//!
//! The engine only emits change records (actor, action, target, before/after
//! snapshots). Formatting and persistence belong to the host audit component.

use super::diff::{FieldChange, diff_values};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Audit action (closed set, never free text)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    // ═══ Cart ═══
    CartItemUpserted,
    CartItemQtyUpdated,
    CartItemRemoved,

    // ═══ Orders ═══
    OrderPlaced,
    /// Admin override of an order status
    OrderStatusUpdated,

    // ═══ Payments ═══
    StripeIntentCreated,
    CodPaymentConfirmed,
    /// Payment status change driven by a webhook
    PaymentWebhookApplied,
    PaymentSettingsUpdated,

    // ═══ Shipments ═══
    ShipmentStatusUpdated,

    // ═══ Refunds ═══
    RefundRequested,
    RefundDecided,
}

impl AuditAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CartItemUpserted => "cart_item_upserted",
            Self::CartItemQtyUpdated => "cart_item_qty_updated",
            Self::CartItemRemoved => "cart_item_removed",
            Self::OrderPlaced => "order_placed",
            Self::OrderStatusUpdated => "order_status_updated",
            Self::StripeIntentCreated => "stripe_intent_created",
            Self::CodPaymentConfirmed => "cod_payment_confirmed",
            Self::PaymentWebhookApplied => "payment_webhook_applied",
            Self::PaymentSettingsUpdated => "payment_settings_updated",
            Self::ShipmentStatusUpdated => "shipment_status_updated",
            Self::RefundRequested => "refund_requested",
            Self::RefundDecided => "refund_decided",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of one successful mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub action: AuditAction,
    /// `user:<id>` / `guest:<token>` / `vendor:<id>` / `admin` / `stripe`
    pub actor: String,
    /// cart / order / shipment / payment / refund_request / payment_settings
    pub resource_type: String,
    pub resource_id: String,
    /// `None` for creations
    pub before: Option<Value>,
    pub after: Option<Value>,
    /// Field-level diff of before/after
    pub changes: Vec<FieldChange>,
    /// Unix millis
    pub timestamp: i64,
}

impl ChangeRecord {
    /// Build a record and compute its field diff
    pub fn new(
        action: AuditAction,
        actor: impl Into<String>,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        before: Option<Value>,
        after: Option<Value>,
    ) -> Self {
        let changes = diff_values(
            before.as_ref().unwrap_or(&Value::Null),
            after.as_ref().unwrap_or(&Value::Null),
        );
        Self {
            action,
            actor: actor.into(),
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            before,
            after,
            changes,
            timestamp: shared::util::now_millis(),
        }
    }
}
