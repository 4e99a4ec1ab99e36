//! Order and shipment status types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A status string that names no known status
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status: {0}")]
pub struct ParseStatusError(pub String);

// ============================================================================
// Order Status
// ============================================================================

/// Order payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    PendingPayment,
    CodConfirmed,
    Paid,
    PaymentFailed,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PendingPayment => "pending_payment",
            Self::CodConfirmed => "cod_confirmed",
            Self::Paid => "paid",
            Self::PaymentFailed => "payment_failed",
        }
    }

    /// Revenue-recognized: paid or COD confirmed
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::Paid | Self::CodConfirmed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending_payment" => Ok(Self::PendingPayment),
            "cod_confirmed" => Ok(Self::CodConfirmed),
            "paid" => Ok(Self::Paid),
            "payment_failed" => Ok(Self::PaymentFailed),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

// ============================================================================
// Shipment Status
// ============================================================================

/// Vendor-scoped fulfilment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    #[default]
    Pending,
    Packed,
    Shipped,
    Delivered,
    Cancelled,
}

impl ShipmentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Packed => "packed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// The single status this one may advance to along the fulfilment chain
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Packed),
            Self::Packed => Some(Self::Shipped),
            Self::Shipped => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipmentStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "packed" => Ok(Self::Packed),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_round_trip_strings() {
        for status in [
            OrderStatus::PendingPayment,
            OrderStatus::CodConfirmed,
            OrderStatus::Paid,
            OrderStatus::PaymentFailed,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        assert_eq!(" PAID ".parse::<OrderStatus>(), Ok(OrderStatus::Paid));
        assert!("refunded".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_settled() {
        assert!(OrderStatus::Paid.is_settled());
        assert!(OrderStatus::CodConfirmed.is_settled());
        assert!(!OrderStatus::PendingPayment.is_settled());
        assert!(!OrderStatus::PaymentFailed.is_settled());
    }

    #[test]
    fn test_shipment_chain() {
        assert_eq!(ShipmentStatus::Pending.next(), Some(ShipmentStatus::Packed));
        assert_eq!(ShipmentStatus::Shipped.next(), Some(ShipmentStatus::Delivered));
        assert_eq!(ShipmentStatus::Delivered.next(), None);
        assert!(ShipmentStatus::Cancelled.is_terminal());
        assert_eq!("cancelled".parse(), Ok(ShipmentStatus::Cancelled));
        assert!("lost".parse::<ShipmentStatus>().is_err());
    }
}
