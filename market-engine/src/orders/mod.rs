//! Order Ledger
//!
//! - **ledger**: idempotent placement, order/shipment status, vendor views
//! - **state_machine**: order and shipment transition rules
//! - **financials**: gross/commission split of settled orders
//!
//! # Architecture
//!
//! ```text
//! CartStore ──checkout──→ OrderLedger ──→ Order (+ OrderShipment per vendor)
//!                              ↑
//!            OrderStatusSink (payments) / admin / vendor updates
//! ```

pub mod financials;
pub mod ledger;
pub mod state_machine;

// Re-exports
pub use financials::{OrderFinancials, settled_order_financials};
pub use ledger::OrderLedger;
pub use state_machine::{can_transition_order, can_transition_shipment};
