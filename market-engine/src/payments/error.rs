use shared::error::ErrorCode;
use thiserror::Error;

/// Payment coordinator errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("order is invalid")]
    InvalidOrder,

    #[error("order is not payable")]
    OrderNotPayable,

    #[error("idempotency key is required")]
    IdempotencyKey,

    #[error("stripe payments are disabled")]
    StripeDisabled,

    #[error("cod payments are disabled")]
    CodDisabled,

    #[error("stripe webhook secret is required")]
    WebhookSecretRequired,

    #[error("invalid stripe webhook signature")]
    InvalidSignature,

    #[error("invalid stripe webhook payload")]
    InvalidPayload,

    #[error("payment not found")]
    PaymentNotFound,

    #[error("order status could not be synchronised: {0}")]
    OrderSyncFailed(String),

    #[error("payment gateway error: {0}")]
    Gateway(String),
}

impl PaymentError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidOrder => ErrorCode::InvalidOrder,
            Self::OrderNotPayable => ErrorCode::OrderNotPayable,
            Self::IdempotencyKey => ErrorCode::IdempotencyKeyRequired,
            Self::StripeDisabled => ErrorCode::StripeDisabled,
            Self::CodDisabled => ErrorCode::CodDisabled,
            Self::WebhookSecretRequired => ErrorCode::WebhookSecretRequired,
            Self::InvalidSignature => ErrorCode::InvalidSignature,
            Self::InvalidPayload => ErrorCode::InvalidPayload,
            Self::PaymentNotFound => ErrorCode::PaymentNotFound,
            Self::OrderSyncFailed(_) => ErrorCode::OrderSyncFailed,
            Self::Gateway(_) => ErrorCode::GatewayError,
        }
    }
}

pub type PaymentResult<T> = Result<T, PaymentError>;
