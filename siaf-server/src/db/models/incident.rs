//! Incident Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;
use crate::utils::time::DateInput;

pub type IncidentId = RecordId;

string_enum! {
    pub enum IncidentPriority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
    default = Medium
}

string_enum! {
    pub enum IncidentStatus {
        Open => "open",
        Assigned => "assigned",
        InProgress => "in_progress",
        Resolved => "resolved",
        Closed => "closed",
    }
    default = Open
}

impl IncidentStatus {
    /// Resolved or closed
    pub fn is_finished(&self) -> bool {
        matches!(self, IncidentStatus::Resolved | IncidentStatus::Closed)
    }

    /// Statuses counted as "open" by the statistics
    pub const ACTIVE: &'static [IncidentStatus] = &[
        IncidentStatus::Open,
        IncidentStatus::Assigned,
        IncidentStatus::InProgress,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<IncidentId>,
    pub incident_code: String,
    pub title: String,
    pub description: String,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub asset_id: Option<RecordId>,
    #[serde(default)]
    pub priority: IncidentPriority,
    #[serde(default)]
    pub status: IncidentStatus,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub reported_by: Option<RecordId>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub assigned_to: Option<RecordId>,
    #[serde(default)]
    pub reported_date: i64,
    #[serde(default)]
    pub resolved_date: Option<i64>,
    #[serde(default)]
    pub solution: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,

    // Populated references
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_by_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_name: Option<String>,
}

impl Incident {
    /// Hours between report and resolution
    pub fn resolution_hours(&self) -> Option<f64> {
        self.resolved_date
            .map(|resolved| (resolved - self.reported_date) as f64 / 3_600_000.0)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IncidentCreate {
    #[validate(length(min = 1, message = "Título es requerido"))]
    pub title: String,
    #[validate(length(min = 1, message = "Descripción es requerida"))]
    pub description: String,
    pub asset_id: Option<String>,
    pub priority: Option<IncidentPriority>,
    pub assigned_to: Option<String>,
    pub reported_date: Option<DateInput>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct IncidentUpdate {
    #[validate(length(min = 1, message = "Título es requerido"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Descripción es requerida"))]
    pub description: Option<String>,
    pub asset_id: Option<String>,
    pub priority: Option<IncidentPriority>,
    pub status: Option<IncidentStatus>,
    pub assigned_to: Option<String>,
    pub solution: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncidentAssign {
    pub assigned_to: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncidentResolve {
    #[serde(default)]
    pub solution: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncidentFilter {
    pub status: Option<IncidentStatus>,
    pub priority: Option<IncidentPriority>,
    pub asset_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Validated incident fields ready for the repository
#[derive(Debug, Clone, Default)]
pub struct IncidentFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub asset_id: Option<RecordId>,
    pub priority: Option<IncidentPriority>,
    pub status: Option<IncidentStatus>,
    pub assigned_to: Option<RecordId>,
    pub solution: Option<String>,
    pub reported_date: Option<i64>,
}
