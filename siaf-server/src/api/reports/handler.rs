//! Reports API Handlers
//!
//! Query strings carry ids as `"table:key"` and dates as `YYYY-MM-DD`.
//! `date_to` includes the whole day.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use shared::util::now_millis;

use crate::api::extract::optional_record;
use crate::core::ServerState;
use crate::db::models::{
    Asset, AssetStatus, FormStatus, IncidentPriority, IncidentStatus, Maintenance,
    MaintenanceStatus, MaintenanceType, RequestType, Requisition, RequisitionStatus,
    ResponsiveForm,
};
use crate::db::repository::ReportRepository;
use crate::db::repository::report::{
    Dashboard, DateRange, FormReportFilter, FormSummary, IncidentReportFilter, IncidentReportRow,
    IncidentSummary, InventoryReportFilter, InventorySummary, MaintenanceReportFilter,
    MaintenanceSummary, RequisitionReportFilter, RequisitionSummary, UserActivity, form_summary,
    incident_rows, incident_summary, inventory_summary, maintenance_summary,
    requisition_summary,
};
use crate::utils::time::date_range_millis;
use crate::utils::{AppError, AppResult};

/// Report rows plus their summary
#[derive(Debug, Serialize)]
pub struct Report<T, S> {
    pub data: Vec<T>,
    pub summary: S,
    pub generated_at: i64,
}

impl<T, S> Report<T, S> {
    fn new(data: Vec<T>, summary: S) -> Self {
        Self {
            data,
            summary,
            generated_at: now_millis(),
        }
    }
}

fn range(date_from: Option<&str>, date_to: Option<&str>) -> AppResult<DateRange> {
    let (from, to) = date_range_millis(date_from, date_to)?;
    Ok(DateRange { from, to })
}

/// GET /api/reports/dashboard
pub async fn dashboard(State(state): State<ServerState>) -> AppResult<Json<Dashboard>> {
    let dashboard = ReportRepository::new(state.get_db())
        .dashboard(now_millis())
        .await?;
    Ok(Json(dashboard))
}

#[derive(Debug, Default, Deserialize)]
pub struct InventoryReportQuery {
    pub category: Option<String>,
    pub status: Option<AssetStatus>,
    pub responsible: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// GET /api/reports/inventory
pub async fn inventory(
    State(state): State<ServerState>,
    Query(query): Query<InventoryReportQuery>,
) -> AppResult<Json<Report<Asset, InventorySummary>>> {
    let filter = InventoryReportFilter {
        category: optional_record("asset_category", query.category.as_deref())?,
        status: query.status,
        responsible: optional_record("user", query.responsible.as_deref())?,
        range: range(query.date_from.as_deref(), query.date_to.as_deref())?,
    };
    let assets = ReportRepository::new(state.get_db())
        .inventory(&filter)
        .await?;
    let summary = inventory_summary(&assets);
    Ok(Json(Report::new(assets, summary)))
}

#[derive(Debug, Default, Deserialize)]
pub struct IncidentReportQuery {
    pub status: Option<IncidentStatus>,
    pub priority: Option<IncidentPriority>,
    pub asset_id: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// GET /api/reports/incidents
pub async fn incidents(
    State(state): State<ServerState>,
    Query(query): Query<IncidentReportQuery>,
) -> AppResult<Json<Report<IncidentReportRow, IncidentSummary>>> {
    let filter = IncidentReportFilter {
        status: query.status,
        priority: query.priority,
        asset: optional_record("asset", query.asset_id.as_deref())?,
        range: range(query.date_from.as_deref(), query.date_to.as_deref())?,
    };
    let incidents = ReportRepository::new(state.get_db())
        .incidents(&filter)
        .await?;
    let rows = incident_rows(incidents);
    let summary = incident_summary(&rows);
    Ok(Json(Report::new(rows, summary)))
}

#[derive(Debug, Default, Deserialize)]
pub struct MaintenanceReportQuery {
    #[serde(rename = "type")]
    pub maintenance_type: Option<MaintenanceType>,
    pub status: Option<MaintenanceStatus>,
    pub asset_id: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// GET /api/reports/maintenance
pub async fn maintenance(
    State(state): State<ServerState>,
    Query(query): Query<MaintenanceReportQuery>,
) -> AppResult<Json<Report<Maintenance, MaintenanceSummary>>> {
    let filter = MaintenanceReportFilter {
        maintenance_type: query.maintenance_type,
        status: query.status,
        asset: optional_record("asset", query.asset_id.as_deref())?,
        range: range(query.date_from.as_deref(), query.date_to.as_deref())?,
    };
    let items = ReportRepository::new(state.get_db())
        .maintenance(&filter)
        .await?;
    let summary = maintenance_summary(&items);
    Ok(Json(Report::new(items, summary)))
}

#[derive(Debug, Default, Deserialize)]
pub struct FormReportQuery {
    pub status: Option<FormStatus>,
    pub asset_id: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// GET /api/reports/responsive-forms
pub async fn responsive_forms(
    State(state): State<ServerState>,
    Query(query): Query<FormReportQuery>,
) -> AppResult<Json<Report<ResponsiveForm, FormSummary>>> {
    let filter = FormReportFilter {
        status: query.status,
        asset: optional_record("asset", query.asset_id.as_deref())?,
        range: range(query.date_from.as_deref(), query.date_to.as_deref())?,
    };
    let forms = ReportRepository::new(state.get_db())
        .responsive_forms(&filter)
        .await?;
    let summary = form_summary(&forms);
    Ok(Json(Report::new(forms, summary)))
}

#[derive(Debug, Default, Deserialize)]
pub struct RequisitionReportQuery {
    pub status: Option<RequisitionStatus>,
    pub request_type: Option<RequestType>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// GET /api/reports/requisitions
pub async fn requisitions(
    State(state): State<ServerState>,
    Query(query): Query<RequisitionReportQuery>,
) -> AppResult<Json<Report<Requisition, RequisitionSummary>>> {
    let filter = RequisitionReportFilter {
        status: query.status,
        request_type: query.request_type,
        range: range(query.date_from.as_deref(), query.date_to.as_deref())?,
    };
    let items = ReportRepository::new(state.get_db())
        .requisitions(&filter)
        .await?;
    let summary = requisition_summary(&items);
    Ok(Json(Report::new(items, summary)))
}

#[derive(Debug, Default, Deserialize)]
pub struct UserActivityQuery {
    pub user_id: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserActivityReport {
    pub user_id: String,
    pub activity: UserActivity,
    pub generated_at: i64,
}

/// GET /api/reports/user-activity?user_id=user:xyz
pub async fn user_activity(
    State(state): State<ServerState>,
    Query(query): Query<UserActivityQuery>,
) -> AppResult<Json<UserActivityReport>> {
    let user_id = query
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::validation("user_id es requerido"))?;
    let user = optional_record("user", Some(user_id.as_str()))?
        .ok_or_else(|| AppError::validation("user_id es requerido"))?;
    let range = range(query.date_from.as_deref(), query.date_to.as_deref())?;

    let activity = ReportRepository::new(state.get_db())
        .user_activity(user, range)
        .await?;
    Ok(Json(UserActivityReport {
        user_id,
        activity,
        generated_at: now_millis(),
    }))
}
