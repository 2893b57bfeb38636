//! Maintenance Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;
use crate::utils::time::DateInput;

pub type MaintenanceId = RecordId;

string_enum! {
    pub enum MaintenanceType {
        Preventive => "preventive",
        Corrective => "corrective",
        Predictive => "predictive",
    }
    default = Preventive
}

string_enum! {
    pub enum MaintenanceStatus {
        Scheduled => "scheduled",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
    default = Scheduled
}

impl MaintenanceStatus {
    pub fn can_start(&self) -> bool {
        matches!(self, MaintenanceStatus::Scheduled)
    }

    pub fn can_complete(&self) -> bool {
        matches!(
            self,
            MaintenanceStatus::Scheduled | MaintenanceStatus::InProgress
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Maintenance {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<MaintenanceId>,
    pub maintenance_code: String,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub asset_id: Option<RecordId>,
    #[serde(default, rename(serialize = "type"))]
    pub maintenance_type: MaintenanceType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub scheduled_date: i64,
    #[serde(default)]
    pub completed_date: Option<i64>,
    #[serde(default)]
    pub status: MaintenanceStatus,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub technician_id: Option<RecordId>,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub notes: String,
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
    pub technician_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MaintenanceCreate {
    pub asset_id: Option<String>,
    #[serde(rename = "type")]
    pub maintenance_type: Option<MaintenanceType>,
    #[validate(length(min = 1, message = "Título es requerido"))]
    pub title: String,
    pub description: Option<String>,
    pub scheduled_date: DateInput,
    pub technician_id: Option<String>,
    #[validate(range(min = 0.0, message = "El costo no puede ser negativo"))]
    pub cost: Option<f64>,
    pub supplier: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MaintenanceUpdate {
    pub asset_id: Option<String>,
    #[serde(rename = "type")]
    pub maintenance_type: Option<MaintenanceType>,
    #[validate(length(min = 1, message = "Título es requerido"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub scheduled_date: Option<DateInput>,
    pub status: Option<MaintenanceStatus>,
    pub technician_id: Option<String>,
    #[validate(range(min = 0.0, message = "El costo no puede ser negativo"))]
    pub cost: Option<f64>,
    pub supplier: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MaintenanceComplete {
    pub notes: Option<String>,
    #[validate(range(min = 0.0, message = "El costo no puede ser negativo"))]
    pub cost: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaintenanceFilter {
    pub status: Option<MaintenanceStatus>,
    #[serde(rename = "type")]
    pub maintenance_type: Option<MaintenanceType>,
    pub asset_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// `GET /upcoming/list` query
#[derive(Debug, Clone, Deserialize)]
pub struct UpcomingQuery {
    #[serde(default = "default_upcoming_days")]
    pub days: u32,
}

fn default_upcoming_days() -> u32 {
    30
}

/// Validated maintenance fields ready for the repository
#[derive(Debug, Clone, Default)]
pub struct MaintenanceFields {
    pub asset_id: Option<RecordId>,
    pub maintenance_type: Option<MaintenanceType>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub scheduled_date: Option<i64>,
    pub status: Option<MaintenanceStatus>,
    pub technician_id: Option<RecordId>,
    pub cost: Option<f64>,
    pub supplier: Option<String>,
    pub notes: Option<String>,
}
