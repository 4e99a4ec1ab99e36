//! Unified error codes for the marketplace engine
//!
//! - [`ErrorCode`]: one numeric code per failure condition
//! - [`ErrorCategory`]: classification of codes by domain
//!
//! Service error enums live next to their services and map themselves onto
//! an [`ErrorCode`]; this module only carries the shared catalogue.
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 4xxx: Cart and order errors
//! - 5xxx: Payment errors
//! - 6xxx: Product and vendor errors
//! - 7xxx: Shipment errors
//! - 8xxx: Refund errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{ErrorCategory, ErrorCode};
//!
//! let code = ErrorCode::RefundRequestDuplicate;
//! assert_eq!(code.category(), ErrorCategory::Refund);
//! assert_eq!(code.http_status().as_u16(), 409);
//! ```

mod category;
mod codes;
mod http;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
