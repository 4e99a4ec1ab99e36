use crate::payments::PaymentError;
use crate::refunds::RefundError;
use shared::error::ErrorCode;
use thiserror::Error;

/// Cart, quote and order ledger errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommerceError {
    #[error("buyer or guest identity is required")]
    InvalidActor,

    #[error("quantity must be positive and the line total must fit in cents")]
    InvalidQuantity,

    #[error("product snapshot is invalid")]
    InvalidProduct,

    #[error("product not found: {0}")]
    ProductNotFound(String),

    #[error("insufficient stock")]
    InsufficientStock,

    #[error("cart currency is {cart}, product currency is {product}")]
    CurrencyMismatch { cart: String, product: String },

    #[error("cart item not found: {0}")]
    CartItemNotFound(String),

    #[error("cart is empty")]
    CartEmpty,

    #[error("idempotency key is required")]
    IdempotencyKey,

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("invalid order status: {0}")]
    InvalidOrderStatus(String),

    #[error("order status cannot change from {from} to {to}")]
    OrderStatusTransition { from: String, to: String },

    #[error("vendor is required")]
    InvalidVendor,

    #[error("shipment not found: {0}")]
    ShipmentNotFound(String),

    #[error("shipment belongs to another vendor: {0}")]
    ShipmentForbidden(String),

    #[error("invalid shipment status: {0}")]
    InvalidShipmentStatus(String),

    #[error("shipment status cannot change from {from} to {to}")]
    ShipmentTransition { from: String, to: String },
}

impl CommerceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidActor => ErrorCode::InvalidActor,
            Self::InvalidQuantity => ErrorCode::InvalidQuantity,
            Self::InvalidProduct => ErrorCode::InvalidProduct,
            Self::ProductNotFound(_) => ErrorCode::ProductNotFound,
            Self::InsufficientStock => ErrorCode::InsufficientStock,
            Self::CurrencyMismatch { .. } => ErrorCode::CurrencyMismatch,
            Self::CartItemNotFound(_) => ErrorCode::CartItemNotFound,
            Self::CartEmpty => ErrorCode::CartEmpty,
            Self::IdempotencyKey => ErrorCode::IdempotencyKeyRequired,
            Self::OrderNotFound(_) => ErrorCode::OrderNotFound,
            Self::InvalidOrderStatus(_) => ErrorCode::InvalidOrderStatus,
            Self::OrderStatusTransition { .. } => ErrorCode::OrderStatusTransition,
            Self::InvalidVendor => ErrorCode::InvalidVendor,
            Self::ShipmentNotFound(_) => ErrorCode::ShipmentNotFound,
            Self::ShipmentForbidden(_) => ErrorCode::ShipmentForbidden,
            Self::InvalidShipmentStatus(_) => ErrorCode::InvalidShipmentStatus,
            Self::ShipmentTransition { .. } => ErrorCode::ShipmentTransition,
        }
    }
}

pub type CommerceResult<T> = Result<T, CommerceError>;

/// Any engine error, as returned by the `Marketplace` entry points that span
/// more than one service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketError {
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Refund(#[from] RefundError),
}

impl MarketError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Commerce(e) => e.code(),
            Self::Payment(e) => e.code(),
            Self::Refund(e) => e.code(),
        }
    }
}

pub type MarketResult<T> = Result<T, MarketError>;
