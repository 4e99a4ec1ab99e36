//! Payment Coordinator
//!
//! - **coordinator**: card intents, COD confirmations, webhook ingestion
//! - **gateway**: `PaymentGateway` port (Stripe REST + mock)
//! - **webhook**: Stripe signature scheme and envelope parsing
//! - **sink**: `OrderStatusSink` port back into the order ledger

mod coordinator;
pub mod error;
pub mod gateway;
pub mod sink;
pub mod webhook;

pub use coordinator::PaymentCoordinator;
pub use error::{PaymentError, PaymentResult};
pub use gateway::{GatewayIntent, MockGateway, PaymentGateway, StripeGateway};
pub use sink::OrderStatusSink;
