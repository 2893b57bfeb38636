//! Audit log - tamper-evident record of sensitive operations
//!
//! ```text
//! handler
//!   └─ AuditService::log() → mpsc → AuditWorker → SurrealDB (audit_log)
//!
//! SHA-256 chain: genesis → entry₁ → entry₂ → ... → entryₙ
//! ```
//!
//! - each entry stores the hash of the previous one
//! - the `audit_log` table denies update and delete
//! - `GET /api/audit-log/verify` recomputes the chain

pub mod service;
pub mod storage;
pub mod types;
pub mod worker;

pub use service::{AuditLogRequest, AuditService};
pub use storage::{AuditStorage, AuditStorageError, compute_audit_hash};
pub use types::{
    AuditAction, AuditChainVerification, AuditEntry, AuditListResponse, AuditQuery, AuditStatus,
};
pub use worker::AuditWorker;
