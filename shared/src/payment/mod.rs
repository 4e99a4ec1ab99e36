//! Payment record types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Stripe,
    Cod,
}

/// Payment record status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Card intent created, awaiting the gateway webhook
    #[default]
    Pending,
    /// Cash on delivery confirmed, awaiting collection
    PendingCollection,
    Succeeded,
    Failed,
}

impl PaymentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PendingCollection => "pending_collection",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Card payment intent held against an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripeIntent {
    pub id: String,
    pub order_id: String,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub provider: String,
    /// Gateway's own id for the intent (`pi_...`)
    pub provider_ref: String,
    pub client_secret: String,
    pub amount_cents: i64,
    pub currency: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Cash-on-delivery confirmation held against an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodPayment {
    pub id: String,
    pub order_id: String,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub provider: String,
    pub provider_ref: String,
    pub amount_cents: i64,
    pub currency: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Any payment record, as returned by a lookup by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payment {
    Stripe(StripeIntent),
    Cod(CodPayment),
}

impl Payment {
    pub fn id(&self) -> &str {
        match self {
            Self::Stripe(p) => &p.id,
            Self::Cod(p) => &p.id,
        }
    }

    pub fn order_id(&self) -> &str {
        match self {
            Self::Stripe(p) => &p.order_id,
            Self::Cod(p) => &p.order_id,
        }
    }

    pub fn status(&self) -> PaymentStatus {
        match self {
            Self::Stripe(p) => p.status,
            Self::Cod(p) => p.status,
        }
    }
}

/// Platform payment switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSettings {
    pub stripe_enabled: bool,
    pub cod_enabled: bool,
    pub updated_at: i64,
}

/// Partial settings update; `None` leaves the field unchanged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cod_enabled: Option<bool>,
}

/// Outcome of one webhook delivery
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WebhookResult {
    pub event_id: String,
    pub processed: bool,
    pub duplicate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
}
