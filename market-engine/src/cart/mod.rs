//! Cart Store
//!
//! Per-actor carts holding product snapshots captured at add-to-cart time.

mod store;

pub use store::CartStore;
pub(crate) use store::actor_key;
