//! Background audit worker
//!
//! Drains `ChangeRecord`s from the mpsc channel into the host audit component.
//! Exits once the channel closes.

use super::types::ChangeRecord;
use tokio::sync::mpsc;

/// Background audit worker
pub struct AuditWorker<F> {
    deliver: F,
}

impl<F> AuditWorker<F>
where
    F: FnMut(ChangeRecord) + Send,
{
    pub fn new(deliver: F) -> Self {
        Self { deliver }
    }

    /// Run until the channel closes; returns the number of records delivered
    pub async fn run(mut self, mut rx: mpsc::Receiver<ChangeRecord>) -> usize {
        tracing::info!("Audit worker started");
        let mut delivered = 0;

        while let Some(record) = rx.recv().await {
            tracing::debug!(
                action = %record.action,
                resource = %record.resource_type,
                resource_id = %record.resource_id,
                "Audit record delivered"
            );
            (self.deliver)(record);
            delivered += 1;
        }

        tracing::info!(delivered, "Audit channel closed, worker stopping");
        delivered
    }
}
