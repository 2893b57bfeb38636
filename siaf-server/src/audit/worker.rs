//! Audit log background worker
//!
//! Drains the channel into storage and exits once every sender is gone.

use tokio::sync::mpsc;

use super::service::AuditLogRequest;
use super::storage::AuditStorage;

pub struct AuditWorker {
    storage: AuditStorage,
}

impl AuditWorker {
    pub fn new(storage: AuditStorage) -> Self {
        Self { storage }
    }

    /// Run until the channel closes
    pub async fn run(self, mut rx: mpsc::Receiver<AuditLogRequest>) {
        tracing::info!("Audit log worker started");

        while let Some(req) = rx.recv().await {
            match self.storage.append(req).await {
                Ok(entry) => {
                    tracing::debug!(
                        sequence = entry.sequence,
                        action = %entry.action,
                        module = %entry.module,
                        "Audit entry recorded"
                    );
                }
                Err(e) => {
                    tracing::error!("Failed to write audit entry: {}", e);
                }
            }
        }

        tracing::info!("Audit log channel closed, worker stopping");
    }
}
