//! Shared types for the marketplace engine
//!
//! Domain types exchanged with the engine's callers, the numeric error code
//! catalogue, and small time/id utilities.

pub mod error;
pub mod models;
pub mod order;
pub mod payment;
pub mod refund;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{ErrorCategory, ErrorCode};
pub use models::{Actor, ActorKey, ProductSnapshot, VendorProfile, VerificationState};
