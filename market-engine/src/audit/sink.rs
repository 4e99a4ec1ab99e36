//! Audit sinks
//!
//! `ChannelAuditSink` hands records to an external consumer over a bounded
//! mpsc channel. A full channel drops the record with a warning and never
//! blocks the caller.

use super::types::ChangeRecord;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Receives change records
pub trait AuditSink: Send + Sync {
    fn record(&self, record: ChangeRecord);
}

/// Bounded channel sink
#[derive(Debug, Clone)]
pub struct ChannelAuditSink {
    tx: mpsc::Sender<ChangeRecord>,
}

impl ChannelAuditSink {
    /// Create the sink and its receiving end
    pub fn new(buffer_size: usize) -> (Self, mpsc::Receiver<ChangeRecord>) {
        let (tx, rx) = mpsc::channel(buffer_size.max(1));
        (Self { tx }, rx)
    }
}

impl AuditSink for ChannelAuditSink {
    fn record(&self, record: ChangeRecord) {
        match self.tx.try_send(record) {
            Ok(()) => {}
            Err(TrySendError::Full(record)) => {
                tracing::warn!(
                    action = %record.action,
                    resource_id = %record.resource_id,
                    "Audit channel full, record dropped"
                );
            }
            Err(TrySendError::Closed(record)) => {
                tracing::error!(
                    action = %record.action,
                    resource_id = %record.resource_id,
                    "Audit channel closed, record lost"
                );
            }
        }
    }
}

/// Discards every record
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _record: ChangeRecord) {}
}

/// In-memory sink (embedded hosts, tests)
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<ChangeRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ChangeRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: ChangeRecord) {
        self.records.lock().push(record);
    }
}
