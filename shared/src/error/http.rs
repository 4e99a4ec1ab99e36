//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the HTTP status a transport layer should answer with
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::CartItemNotFound
            | Self::OrderNotFound
            | Self::PaymentNotFound
            | Self::ProductNotFound
            | Self::ShipmentNotFound
            | Self::RefundRequestNotFound => StatusCode::NOT_FOUND,

            // 403 Forbidden
            Self::ShipmentForbidden | Self::RefundRequestForbidden => StatusCode::FORBIDDEN,

            // 409 Conflict
            Self::OrderStatusTransition
            | Self::ShipmentTransition
            | Self::DecisionConflict
            | Self::RefundRequestDuplicate
            | Self::OrderNotPayable
            | Self::OrderNotRefundable
            | Self::CurrencyMismatch => StatusCode::CONFLICT,

            // 422 Unprocessable Entity
            Self::CartEmpty | Self::InsufficientStock => StatusCode::UNPROCESSABLE_ENTITY,

            // 502 Bad Gateway
            Self::GatewayError => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable
            Self::StripeDisabled | Self::CodDisabled | Self::WebhookSecretRequired => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            // 500 Internal Server Error
            Self::Unknown | Self::OrderSyncFailed | Self::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
