//! Quote Builder
//!
//! Pure pricing of a cart into vendor-scoped shipment groups.

mod quote;

pub use quote::build_quote;
