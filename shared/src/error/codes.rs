//! Unified error codes for the marketplace engine
//!
//! Every failure the engine reports maps to exactly one code so that a
//! transport layer (and its clients) can branch without string matching.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Cart and order errors
//! - 5xxx: Payment errors
//! - 6xxx: Product and vendor errors
//! - 7xxx: Shipment errors
//! - 8xxx: Refund errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for compact serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Actor resolves to neither a buyer nor a guest
    InvalidActor = 9,
    /// Idempotency key missing or blank
    IdempotencyKeyRequired = 10,

    // ==================== 4xxx: Cart / Order ====================
    /// Cart item not found
    CartItemNotFound = 4001,
    /// Cart has no items
    CartEmpty = 4002,
    /// Quantity must be positive and its line total representable
    InvalidQuantity = 4003,
    /// Currency differs from the cart currency
    CurrencyMismatch = 4004,
    /// Order not found
    OrderNotFound = 4101,
    /// Order data is malformed
    InvalidOrder = 4102,
    /// Unknown order status
    InvalidOrderStatus = 4103,
    /// Order status transition not allowed
    OrderStatusTransition = 4104,
    /// Order cannot be paid in its current status
    OrderNotPayable = 4105,
    /// Order cannot be refunded in its current status
    OrderNotRefundable = 4106,

    // ==================== 5xxx: Payment ====================
    /// Card payments are disabled
    StripeDisabled = 5001,
    /// Cash on delivery is disabled
    CodDisabled = 5002,
    /// Payment not found
    PaymentNotFound = 5003,
    /// Webhook secret is not configured
    WebhookSecretRequired = 5101,
    /// Webhook signature verification failed
    InvalidSignature = 5102,
    /// Webhook or gateway payload is malformed
    InvalidPayload = 5103,
    /// Order status could not be synchronised
    OrderSyncFailed = 5104,
    /// Payment gateway call failed
    GatewayError = 5201,

    // ==================== 6xxx: Product / Vendor ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product snapshot is malformed
    InvalidProduct = 6002,
    /// Not enough stock for the requested quantity
    InsufficientStock = 6003,
    /// Vendor id missing or blank
    InvalidVendor = 6101,

    // ==================== 7xxx: Shipment ====================
    /// Shipment not found
    ShipmentNotFound = 7001,
    /// Shipment belongs to another vendor
    ShipmentForbidden = 7002,
    /// Unknown shipment status
    InvalidShipmentStatus = 7003,
    /// Shipment status transition not allowed
    ShipmentTransition = 7004,
    /// Shipment id missing or blank
    InvalidShipment = 7005,

    // ==================== 8xxx: Refund ====================
    /// Refund request not found
    RefundRequestNotFound = 8001,
    /// Refund request belongs to another vendor
    RefundRequestForbidden = 8002,
    /// A pending refund request already exists for the shipment
    RefundRequestDuplicate = 8003,
    /// Decision must be approve or reject
    InvalidDecision = 8004,
    /// Refund request already decided
    DecisionConflict = 8005,
    /// Refund reason missing or blank
    InvalidReason = 8006,
    /// Refund amount out of range
    InvalidAmount = 8007,
    /// Unknown refund status filter
    InvalidStatusFilter = 8008,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
}

impl ErrorCode {
    /// Get the numeric value of this error code
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Success",
            ErrorCode::Unknown => "Unknown error",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidActor => "Buyer or guest identity is required",
            ErrorCode::IdempotencyKeyRequired => "Idempotency key is required",

            // Cart / Order
            ErrorCode::CartItemNotFound => "Cart item not found",
            ErrorCode::CartEmpty => "Cart is empty",
            ErrorCode::InvalidQuantity => "Quantity must be positive and within range",
            ErrorCode::CurrencyMismatch => "Currency does not match the cart",
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::InvalidOrder => "Order is invalid",
            ErrorCode::InvalidOrderStatus => "Invalid order status",
            ErrorCode::OrderStatusTransition => "Order status transition not allowed",
            ErrorCode::OrderNotPayable => "Order is not payable",
            ErrorCode::OrderNotRefundable => "Order is not refundable",

            // Payment
            ErrorCode::StripeDisabled => "Card payments are disabled",
            ErrorCode::CodDisabled => "Cash on delivery is disabled",
            ErrorCode::PaymentNotFound => "Payment not found",
            ErrorCode::WebhookSecretRequired => "Webhook secret is not configured",
            ErrorCode::InvalidSignature => "Invalid webhook signature",
            ErrorCode::InvalidPayload => "Invalid payload",
            ErrorCode::OrderSyncFailed => "Failed to update order status",
            ErrorCode::GatewayError => "Payment gateway error",

            // Product / Vendor
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::InvalidProduct => "Product is invalid",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::InvalidVendor => "Vendor is required",

            // Shipment
            ErrorCode::ShipmentNotFound => "Shipment not found",
            ErrorCode::ShipmentForbidden => "Shipment belongs to another vendor",
            ErrorCode::InvalidShipmentStatus => "Invalid shipment status",
            ErrorCode::ShipmentTransition => "Shipment status transition not allowed",
            ErrorCode::InvalidShipment => "Shipment is required",

            // Refund
            ErrorCode::RefundRequestNotFound => "Refund request not found",
            ErrorCode::RefundRequestForbidden => "Refund request belongs to another vendor",
            ErrorCode::RefundRequestDuplicate => "A pending refund request already exists",
            ErrorCode::InvalidDecision => "Decision must be approve or reject",
            ErrorCode::DecisionConflict => "Refund request already decided",
            ErrorCode::InvalidReason => "Reason is required",
            ErrorCode::InvalidAmount => "Invalid refund amount",
            ErrorCode::InvalidStatusFilter => "Invalid status filter",

            // System
            ErrorCode::InternalError => "Internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),
            9 => Ok(ErrorCode::InvalidActor),
            10 => Ok(ErrorCode::IdempotencyKeyRequired),

            // Cart / Order
            4001 => Ok(ErrorCode::CartItemNotFound),
            4002 => Ok(ErrorCode::CartEmpty),
            4003 => Ok(ErrorCode::InvalidQuantity),
            4004 => Ok(ErrorCode::CurrencyMismatch),
            4101 => Ok(ErrorCode::OrderNotFound),
            4102 => Ok(ErrorCode::InvalidOrder),
            4103 => Ok(ErrorCode::InvalidOrderStatus),
            4104 => Ok(ErrorCode::OrderStatusTransition),
            4105 => Ok(ErrorCode::OrderNotPayable),
            4106 => Ok(ErrorCode::OrderNotRefundable),

            // Payment
            5001 => Ok(ErrorCode::StripeDisabled),
            5002 => Ok(ErrorCode::CodDisabled),
            5003 => Ok(ErrorCode::PaymentNotFound),
            5101 => Ok(ErrorCode::WebhookSecretRequired),
            5102 => Ok(ErrorCode::InvalidSignature),
            5103 => Ok(ErrorCode::InvalidPayload),
            5104 => Ok(ErrorCode::OrderSyncFailed),
            5201 => Ok(ErrorCode::GatewayError),

            // Product / Vendor
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::InvalidProduct),
            6003 => Ok(ErrorCode::InsufficientStock),
            6101 => Ok(ErrorCode::InvalidVendor),

            // Shipment
            7001 => Ok(ErrorCode::ShipmentNotFound),
            7002 => Ok(ErrorCode::ShipmentForbidden),
            7003 => Ok(ErrorCode::InvalidShipmentStatus),
            7004 => Ok(ErrorCode::ShipmentTransition),
            7005 => Ok(ErrorCode::InvalidShipment),

            // Refund
            8001 => Ok(ErrorCode::RefundRequestNotFound),
            8002 => Ok(ErrorCode::RefundRequestForbidden),
            8003 => Ok(ErrorCode::RefundRequestDuplicate),
            8004 => Ok(ErrorCode::InvalidDecision),
            8005 => Ok(ErrorCode::DecisionConflict),
            8006 => Ok(ErrorCode::InvalidReason),
            8007 => Ok(ErrorCode::InvalidAmount),
            8008 => Ok(ErrorCode::InvalidStatusFilter),

            // System
            9001 => Ok(ErrorCode::InternalError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::CartEmpty.code(), 4002);
        assert_eq!(ErrorCode::InvalidSignature.code(), 5102);
        assert_eq!(ErrorCode::InsufficientStock.code(), 6003);
        assert_eq!(ErrorCode::ShipmentTransition.code(), 7004);
        assert_eq!(ErrorCode::RefundRequestDuplicate.code(), 8003);
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::OrderStatusTransition).unwrap();
        assert_eq!(json, "4104");

        let code: ErrorCode = serde_json::from_str("8005").unwrap();
        assert_eq!(code, ErrorCode::DecisionConflict);
    }

    #[test]
    fn test_deserialize_unknown_code_fails() {
        let result: Result<ErrorCode, _> = serde_json::from_str("4999");
        assert!(result.is_err());
        assert_eq!(ErrorCode::try_from(1234), Err(InvalidErrorCode(1234)));
    }

    #[test]
    fn test_try_from_matches_repr() {
        for code in [
            ErrorCode::InvalidActor,
            ErrorCode::CurrencyMismatch,
            ErrorCode::OrderNotRefundable,
            ErrorCode::GatewayError,
            ErrorCode::InvalidVendor,
            ErrorCode::InvalidShipment,
            ErrorCode::InvalidStatusFilter,
            ErrorCode::InternalError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::Success.to_string(), "E0000");
        assert_eq!(ErrorCode::CartEmpty.to_string(), "E4002");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::CartEmpty.message(), "Cart is empty");
        assert!(!ErrorCode::DecisionConflict.message().is_empty());
    }
}
