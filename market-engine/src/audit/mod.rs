//! Audit - change record emission
//!
//! # Flow
//!
//! ```text
//! Marketplace mutation succeeds
//!   └─ ChangeRecord (before / after / changes)
//!        └─ AuditSink::record()
//!             ├─ ChannelAuditSink → mpsc → AuditWorker → host audit component
//!             ├─ MemoryAuditSink
//!             └─ NoopAuditSink
//! ```
//!
//! The engine neither formats nor persists audit entries.

pub mod diff;
pub mod sink;
pub mod types;
pub mod worker;

pub use diff::{FieldChange, diff_values, snapshot};
pub use sink::{AuditSink, ChannelAuditSink, MemoryAuditSink, NoopAuditSink};
pub use types::{AuditAction, ChangeRecord};
pub use worker::AuditWorker;
