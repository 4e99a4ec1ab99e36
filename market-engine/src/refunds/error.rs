use shared::error::ErrorCode;
use thiserror::Error;

/// Refund workflow errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefundError {
    #[error("order is required")]
    InvalidOrder,

    #[error("vendor is required")]
    InvalidVendor,

    #[error("shipment is required")]
    InvalidShipment,

    #[error("reason is required")]
    InvalidReason,

    #[error("requested amount is invalid")]
    InvalidAmount,

    #[error("order status does not allow refunds")]
    OrderNotRefundable,

    #[error("shipment not found: {0}")]
    ShipmentNotFound(String),

    #[error("pending refund request already exists")]
    RefundRequestDuplicate,

    #[error("refund request not found: {0}")]
    RefundRequestNotFound(String),

    #[error("refund request belongs to another vendor")]
    RefundRequestForbidden,

    #[error("status filter is invalid: {0}")]
    InvalidStatusFilter(String),

    #[error("decision is invalid: {0}")]
    InvalidDecision(String),

    #[error("refund request decision already made")]
    DecisionConflict,
}

impl RefundError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidOrder => ErrorCode::InvalidOrder,
            Self::InvalidVendor => ErrorCode::InvalidVendor,
            Self::InvalidShipment => ErrorCode::InvalidShipment,
            Self::InvalidReason => ErrorCode::InvalidReason,
            Self::InvalidAmount => ErrorCode::InvalidAmount,
            Self::OrderNotRefundable => ErrorCode::OrderNotRefundable,
            Self::ShipmentNotFound(_) => ErrorCode::ShipmentNotFound,
            Self::RefundRequestDuplicate => ErrorCode::RefundRequestDuplicate,
            Self::RefundRequestNotFound(_) => ErrorCode::RefundRequestNotFound,
            Self::RefundRequestForbidden => ErrorCode::RefundRequestForbidden,
            Self::InvalidStatusFilter(_) => ErrorCode::InvalidStatusFilter,
            Self::InvalidDecision(_) => ErrorCode::InvalidDecision,
            Self::DecisionConflict => ErrorCode::DecisionConflict,
        }
    }
}

pub type RefundResult<T> = Result<T, RefundError>;
