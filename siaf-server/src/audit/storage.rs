//! Audit log storage
//!
//! Append-only: there is no update or delete path. Every entry carries the
//! SHA-256 of its predecessor, starting from `genesis`.

use std::sync::Arc;

use serde::Deserialize;
use sha2::{Digest, Sha256};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

use super::service::AuditLogRequest;
use super::types::{AuditAction, AuditChainBreak, AuditChainVerification, AuditEntry, AuditQuery};
use crate::utils::AppError;

pub const GENESIS_HASH: &str = "genesis";

#[derive(Debug, Error)]
pub enum AuditStorageError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<surrealdb::Error> for AuditStorageError {
    fn from(err: surrealdb::Error) -> Self {
        AuditStorageError::Database(err.to_string())
    }
}

impl From<AuditStorageError> for AppError {
    fn from(err: AuditStorageError) -> Self {
        AppError::database(err.to_string())
    }
}

pub type AuditStorageResult<T> = Result<T, AuditStorageError>;

#[derive(Debug, Deserialize)]
struct LastEntry {
    sequence: u64,
    curr_hash: String,
}

#[derive(Debug, Deserialize)]
struct CountResult {
    total: u64,
}

/// Audit log storage (SurrealDB `audit_log` table)
#[derive(Clone)]
pub struct AuditStorage {
    db: Surreal<Db>,
    /// Serializes appends so sequence and prev_hash are read-modify-write safe
    append_lock: Arc<tokio::sync::Mutex<()>>,
}

impl AuditStorage {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            db,
            append_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Append one entry
    ///
    /// 1. read the last sequence and hash
    /// 2. hash the new entry over every stored field
    /// 3. write it
    pub async fn append(&self, req: AuditLogRequest) -> AuditStorageResult<AuditEntry> {
        let _guard = self.append_lock.lock().await;

        let mut result = self
            .db
            .query("SELECT sequence, curr_hash FROM audit_log ORDER BY sequence DESC LIMIT 1")
            .await?;
        let last: Vec<LastEntry> = result.take(0)?;

        let (sequence, prev_hash) = match last.first() {
            Some(last) => (last.sequence + 1, last.curr_hash.clone()),
            None => (1, GENESIS_HASH.to_string()),
        };

        let mut entry = AuditEntry {
            sequence,
            timestamp: shared::util::now_millis(),
            user_id: req.user_id,
            username: req.username,
            action: req.action,
            module: req.action.module().to_string(),
            description: req.description,
            ip_address: req.ip_address,
            user_agent: req.user_agent,
            status: req.status,
            details: req.details,
            prev_hash,
            curr_hash: String::new(),
        };
        entry.curr_hash = compute_audit_hash(&entry);

        self.db
            .query("CREATE audit_log CONTENT $data")
            .bind(("data", entry.clone()))
            .await?
            .check()?;

        Ok(entry)
    }

    /// Filtered page, newest first, with the total match count
    pub async fn query(&self, q: &AuditQuery) -> AuditStorageResult<(Vec<AuditEntry>, u64)> {
        let mut conditions = Vec::new();
        if q.from.is_some() {
            conditions.push("timestamp >= $from");
        }
        if q.to.is_some() {
            conditions.push("timestamp <= $to");
        }
        if q.action.is_some() {
            conditions.push("action = $action");
        }
        if q.module.is_some() {
            conditions.push("module = $module");
        }
        if q.user_id.is_some() {
            conditions.push("user_id = $user_id");
        }
        if q.status.is_some() {
            conditions.push("status = $status");
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT count() AS total FROM audit_log{where_clause} GROUP ALL; \
             SELECT * FROM audit_log{where_clause} ORDER BY sequence DESC LIMIT {} START {}",
            q.limit, q.offset
        );

        let mut result = self
            .db
            .query(sql)
            .bind(("from", q.from))
            .bind(("to", q.to))
            .bind(("action", q.action))
            .bind(("module", q.module.clone()))
            .bind(("user_id", q.user_id.clone()))
            .bind(("status", q.status))
            .await?;

        let count: Vec<CountResult> = result.take(0)?;
        let total = count.first().map(|c| c.total).unwrap_or(0);
        let entries: Vec<AuditEntry> = result.take(1)?;

        Ok((entries, total))
    }

    /// Walk the whole chain in sequence order and recompute every hash
    pub async fn verify_chain(&self) -> AuditStorageResult<AuditChainVerification> {
        let entries: Vec<AuditEntry> = self
            .db
            .query("SELECT * FROM audit_log ORDER BY sequence ASC")
            .await?
            .take(0)?;

        let mut breaks = Vec::new();
        let mut expected_prev = GENESIS_HASH.to_string();

        for entry in &entries {
            let recomputed = compute_audit_hash(entry);
            let link_ok = entry.prev_hash == expected_prev;
            let content_ok = recomputed == entry.curr_hash;

            if !link_ok || !content_ok {
                breaks.push(AuditChainBreak {
                    sequence: entry.sequence,
                    expected_prev_hash: expected_prev.clone(),
                    actual_prev_hash: entry.prev_hash.clone(),
                    content_tampered: !content_ok,
                });
            }
            expected_prev = entry.curr_hash.clone();
        }

        Ok(AuditChainVerification {
            total_entries: entries.len() as u64,
            chain_intact: breaks.is_empty(),
            breaks,
        })
    }
}

/// Integral floats back to integers
///
/// SurrealDB may read `5` back as `5.0`; the hash must not depend on that.
/// Only values within 2^53 convert losslessly.
fn normalize_json(value: &serde_json::Value) -> serde_json::Value {
    const MAX_SAFE_INT: f64 = (1_i64 << 53) as f64;

    match value {
        serde_json::Value::Number(n) => {
            if let Some(f) = n.as_f64()
                && f.fract() == 0.0
                && f.abs() <= MAX_SAFE_INT
            {
                return serde_json::Value::Number(serde_json::Number::from(f as i64));
            }
            value.clone()
        }
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), normalize_json(v)))
                .collect(),
        ),
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(normalize_json).collect())
        }
        _ => value.clone(),
    }
}

/// SHA-256 over every stored field of an entry, `curr_hash` excluded
///
/// Variable-length fields are `\0` separated. Optional fields are tagged so
/// `None` and `Some("")` differ.
pub fn compute_audit_hash(entry: &AuditEntry) -> String {
    let mut hasher = Sha256::new();

    hasher.update(entry.prev_hash.as_bytes());
    hasher.update(b"\x00");

    hasher.update(entry.sequence.to_le_bytes());
    hasher.update(entry.timestamp.to_le_bytes());

    hash_str(&mut hasher, &action_text(&entry.action));
    hash_str(&mut hasher, &entry.module);
    hash_str(&mut hasher, &entry.description);
    hash_str(&mut hasher, entry.status.as_str());

    hash_optional(&mut hasher, entry.user_id.as_deref());
    hash_optional(&mut hasher, entry.username.as_deref());
    hash_optional(&mut hasher, entry.ip_address.as_deref());
    hash_optional(&mut hasher, entry.user_agent.as_deref());

    let details = serde_json::to_string(&normalize_json(&entry.details)).unwrap_or_default();
    hash_str(&mut hasher, &details);

    format!("{:x}", hasher.finalize())
}

fn action_text(action: &AuditAction) -> String {
    serde_json::to_string(action).unwrap_or_default()
}

fn hash_str(hasher: &mut Sha256, value: &str) {
    hasher.update(value.as_bytes());
    hasher.update(b"\x00");
}

/// `\x00` = None, `\x01` + bytes = Some, then a separator
fn hash_optional(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(v) => {
            hasher.update(b"\x01");
            hasher.update(v.as_bytes());
        }
        None => hasher.update(b"\x00"),
    }
    hasher.update(b"\x00");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::types::AuditStatus;

    fn entry() -> AuditEntry {
        AuditEntry {
            sequence: 1,
            timestamp: 1_700_000_000_000,
            user_id: Some("user:admin".to_string()),
            username: Some("admin".to_string()),
            action: AuditAction::LoginSuccess,
            module: "auth".to_string(),
            description: "Inicio de sesión".to_string(),
            ip_address: None,
            user_agent: None,
            status: AuditStatus::Success,
            details: serde_json::json!({ "attempts": 1 }),
            prev_hash: GENESIS_HASH.to_string(),
            curr_hash: String::new(),
        }
    }

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(compute_audit_hash(&entry()), compute_audit_hash(&entry()));
        assert_eq!(compute_audit_hash(&entry()).len(), 64);
    }

    #[test]
    fn test_hash_covers_fields() {
        let base = compute_audit_hash(&entry());

        let mut changed = entry();
        changed.description.push('!');
        assert_ne!(base, compute_audit_hash(&changed));

        let mut changed = entry();
        changed.status = AuditStatus::Failed;
        assert_ne!(base, compute_audit_hash(&changed));

        let mut changed = entry();
        changed.prev_hash = "other".to_string();
        assert_ne!(base, compute_audit_hash(&changed));
    }

    #[test]
    fn test_hash_distinguishes_none_from_empty() {
        let mut empty = entry();
        empty.ip_address = Some(String::new());
        assert_ne!(compute_audit_hash(&entry()), compute_audit_hash(&empty));
    }

    #[test]
    fn test_hash_ignores_float_drift() {
        let mut drifted = entry();
        drifted.details = serde_json::json!({ "attempts": 1.0 });
        assert_eq!(compute_audit_hash(&entry()), compute_audit_hash(&drifted));
    }
}
