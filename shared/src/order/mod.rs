//! Cart, quote and order types

pub mod cart;
pub mod snapshot;
pub mod types;

pub use cart::{Cart, CartItem, CheckoutQuote, QuoteShipment};
pub use snapshot::{Order, OrderItem, OrderShipment, ShipmentStatusEvent, VendorShipment};
pub use types::{OrderStatus, ParseStatusError, ShipmentStatus};
