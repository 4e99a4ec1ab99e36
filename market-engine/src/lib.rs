//! Market Engine - multi-vendor commerce engine
//!
//! # Overview
//!
//! Embedded commerce core. The host application supplies the product catalog,
//! the vendor directory and an audit sink:
//!
//! - **Carts** (`cart`): per-buyer/per-guest carts that pin a product snapshot on add
//! - **Checkout** (`checkout`): split carts into vendor shipments and price them
//! - **Orders** (`orders`): idempotent placement, order/shipment state machines, revenue
//! - **Payments** (`payments`): Stripe intents, cash on delivery, signed webhooks
//! - **Refunds** (`refunds`): shipment-level requests and vendor decisions
//! - **Audit** (`audit`): one before/after record per successful mutation
//!
//! # Layout
//!
//! ```text
//! market-engine/src/
//! ├── core/          # config, errors, Marketplace wiring
//! ├── cart/          # cart store
//! ├── checkout/      # quotes
//! ├── orders/        # order ledger, state machines, financials
//! ├── payments/      # payment coordinator, gateway, webhooks
//! ├── refunds/       # refund workflow
//! ├── audit/         # change records
//! ├── ports.rs       # host-provided collaborators
//! └── utils/         # logging
//! ```

pub mod audit;
pub mod cart;
pub mod checkout;
pub mod core;
pub mod orders;
pub mod payments;
pub mod ports;
pub mod refunds;
pub mod utils;

// Re-export public types
pub use audit::{AuditAction, AuditSink, ChangeRecord};
pub use cart::CartStore;
pub use core::{
    CommerceError, CommerceResult, EngineConfig, MarketError, MarketResult, Marketplace,
};
pub use orders::{OrderFinancials, OrderLedger};
pub use payments::{PaymentCoordinator, PaymentError, PaymentGateway, PaymentResult};
pub use ports::{InMemoryCatalog, InMemoryVendorDirectory, ProductCatalog, VendorDirectory};
pub use refunds::{RefundError, RefundResult, RefundWorkflow};

// Re-export unified error types from shared
pub use shared::{ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
