//! Audit log service
//!
//! Handlers call [`AuditService::log`]; entries travel over an mpsc channel
//! to the [`AuditWorker`](super::AuditWorker), which appends them in order.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::storage::{AuditStorage, AuditStorageError};
use super::types::*;
use crate::auth::CurrentUser;

/// One entry to append; sequence, module and hashes are filled by storage
#[derive(Debug, Clone)]
pub struct AuditLogRequest {
    pub action: AuditAction,
    pub description: String,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub status: AuditStatus,
    pub details: serde_json::Value,
}

impl AuditLogRequest {
    pub fn new(action: AuditAction, description: impl Into<String>) -> Self {
        Self {
            action,
            description: description.into(),
            user_id: None,
            username: None,
            ip_address: None,
            user_agent: None,
            status: AuditStatus::Success,
            details: serde_json::Value::Null,
        }
    }

    /// Attribute the entry to an authenticated user
    pub fn by(mut self, user: &CurrentUser) -> Self {
        self.user_id = Some(user.id.clone());
        self.username = Some(user.username.clone());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn client(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }

    pub fn failed(mut self) -> Self {
        self.status = AuditStatus::Failed;
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

pub struct AuditService {
    storage: AuditStorage,
    tx: mpsc::Sender<AuditLogRequest>,
}

impl std::fmt::Debug for AuditService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditService").finish_non_exhaustive()
    }
}

impl AuditService {
    /// Create the service and the receiving end for the worker
    pub fn new(
        storage: AuditStorage,
        buffer_size: usize,
    ) -> (Arc<Self>, mpsc::Receiver<AuditLogRequest>) {
        let (tx, rx) = mpsc::channel(buffer_size.max(1));
        (Arc::new(Self { storage, tx }), rx)
    }

    /// Queue an entry for the worker
    ///
    /// Waits when the channel is full; entries are never dropped.
    pub async fn log(&self, req: AuditLogRequest) {
        if self.tx.send(req).await.is_err() {
            tracing::error!("Audit log channel closed, audit entry lost");
        }
    }

    /// Queue a system event with no user attached
    pub async fn log_system(&self, action: AuditAction, description: impl Into<String>) {
        self.log(AuditLogRequest::new(action, description).username("system"))
            .await;
    }

    /// Append immediately, bypassing the channel
    pub async fn log_sync(&self, req: AuditLogRequest) -> Result<AuditEntry, AuditStorageError> {
        self.storage.append(req).await
    }

    pub async fn query(&self, q: &AuditQuery) -> Result<(Vec<AuditEntry>, u64), AuditStorageError> {
        self.storage.query(q).await
    }

    pub async fn verify_chain(&self) -> Result<AuditChainVerification, AuditStorageError> {
        self.storage.verify_chain().await
    }
}
