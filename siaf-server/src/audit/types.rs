//! Audit log types

use serde::{Deserialize, Serialize};

/// Audited action
///
/// Serialized in snake_case; the text takes part in the entry hash, so
/// variant names must stay stable once written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    // System
    SystemStartup,
    SystemShutdown,
    BackupCreated,

    // Auth
    LoginSuccess,
    LoginFailed,
    UserCreated,
    UserUpdated,
    PasswordChanged,

    // Inventory
    AssetCreated,
    AssetUpdated,
    AssetDeactivated,
    CategoryCreated,

    // Incidents
    IncidentCreated,
    IncidentUpdated,
    IncidentAssigned,
    IncidentResolved,

    // Maintenance
    MaintenanceCreated,
    MaintenanceUpdated,
    MaintenanceStarted,
    MaintenanceCompleted,

    // Custody forms
    ResponsiveFormCreated,
    ResponsiveFormApproved,
    ResponsiveFormRejected,

    // Requisitions
    RequisitionCreated,
    RequisitionUpdated,
    RequisitionApproved,
    RequisitionRejected,
    RequisitionCompleted,
    RequisitionDeleted,

    // Clients
    ClientCreated,
    ClientDeleted,
}

impl AuditAction {
    /// Module the action belongs to, stored as `module`
    pub fn module(&self) -> &'static str {
        use AuditAction::*;
        match self {
            SystemStartup | SystemShutdown | BackupCreated => "system",
            LoginSuccess | LoginFailed | UserCreated | UserUpdated | PasswordChanged => "auth",
            AssetCreated | AssetUpdated | AssetDeactivated | CategoryCreated => "inventory",
            IncidentCreated | IncidentUpdated | IncidentAssigned | IncidentResolved => "incidents",
            MaintenanceCreated | MaintenanceUpdated | MaintenanceStarted
            | MaintenanceCompleted => "maintenance",
            ResponsiveFormCreated | ResponsiveFormApproved | ResponsiveFormRejected => {
                "responsive_forms"
            }
            RequisitionCreated | RequisitionUpdated | RequisitionApproved
            | RequisitionRejected | RequisitionCompleted | RequisitionDeleted => "requisitions",
            ClientCreated | ClientDeleted => "clients",
        }
    }

    pub fn as_str(&self) -> String {
        serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_str())
    }
}

/// Outcome of the audited action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    #[default]
    Success,
    Failed,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Success => "success",
            AuditStatus::Failed => "failed",
        }
    }
}

/// Audit log entry (append-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Monotonic sequence, starts at 1
    pub sequence: u64,
    pub timestamp: i64,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub action: AuditAction,
    pub module: String,
    pub description: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub status: AuditStatus,
    pub details: serde_json::Value,
    pub prev_hash: String,
    pub curr_hash: String,
}

/// `GET /api/audit-log` filters
#[derive(Debug, Clone, Deserialize)]
pub struct AuditQuery {
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub action: Option<AuditAction>,
    pub module: Option<String>,
    pub user_id: Option<String>,
    pub status: Option<AuditStatus>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

pub const DEFAULT_AUDIT_LIMIT: usize = 50;
pub const MAX_AUDIT_LIMIT: usize = 500;

fn default_limit() -> usize {
    DEFAULT_AUDIT_LIMIT
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            action: None,
            module: None,
            user_id: None,
            status: None,
            offset: 0,
            limit: DEFAULT_AUDIT_LIMIT,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuditListResponse {
    pub items: Vec<AuditEntry>,
    pub total: u64,
    pub offset: usize,
    pub limit: usize,
}

/// Result of walking the whole chain
#[derive(Debug, Serialize)]
pub struct AuditChainVerification {
    pub total_entries: u64,
    pub chain_intact: bool,
    pub breaks: Vec<AuditChainBreak>,
}

/// A link whose hash no longer matches
#[derive(Debug, Serialize)]
pub struct AuditChainBreak {
    pub sequence: u64,
    pub expected_prev_hash: String,
    pub actual_prev_hash: String,
    /// Stored `curr_hash` differs from the recomputed one
    pub content_tampered: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serializes_snake_case() {
        assert_eq!(AuditAction::LoginFailed.as_str(), "login_failed");
        assert_eq!(
            AuditAction::ResponsiveFormApproved.to_string(),
            "responsive_form_approved"
        );
    }

    #[test]
    fn test_action_module() {
        assert_eq!(AuditAction::BackupCreated.module(), "system");
        assert_eq!(AuditAction::RequisitionDeleted.module(), "requisitions");
        assert_eq!(AuditAction::CategoryCreated.module(), "inventory");
    }

    #[test]
    fn test_query_defaults() {
        let q: AuditQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.limit, DEFAULT_AUDIT_LIMIT);
        assert_eq!(q.offset, 0);
        assert!(q.action.is_none());
    }
}
