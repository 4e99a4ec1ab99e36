//! Refund Workflow

pub mod error;
mod workflow;

pub use error::{RefundError, RefundResult};
pub use workflow::RefundWorkflow;
