//! Data models supplied by collaborators at the engine boundary

pub mod actor;
pub mod product;
pub mod vendor;

// Re-exports
pub use actor::*;
pub use product::*;
pub use vendor::*;
