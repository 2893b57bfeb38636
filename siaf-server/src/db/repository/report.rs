//! Report Repository
//!
//! Filtered listings for the printable reports, their summaries, the
//! dashboard counters and per-user activity.

use std::collections::BTreeMap;

use serde::Serialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::maintenance::DAY_MS;
use super::{
    BaseRepository, CountRow, GroupCount, RepoResult, UNASSIGNED, count_of, to_breakdown,
    where_clause,
};
use crate::db::models::{
    Asset, AssetStatus, FormStatus, Incident, IncidentPriority, IncidentStatus, Maintenance,
    MaintenanceStatus, MaintenanceType, RequestType, Requisition, RequisitionStatus,
    ResponsiveForm,
};
use shared::util::sum_money;

/// `[from, to)` in Unix millis; either side may be open
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct InventoryReportFilter {
    pub category: Option<RecordId>,
    pub status: Option<AssetStatus>,
    pub responsible: Option<RecordId>,
    /// Matched against `created_at`
    pub range: DateRange,
}

#[derive(Debug, Clone, Default)]
pub struct IncidentReportFilter {
    pub status: Option<IncidentStatus>,
    pub priority: Option<IncidentPriority>,
    pub asset: Option<RecordId>,
    /// Matched against `reported_date`
    pub range: DateRange,
}

#[derive(Debug, Clone, Default)]
pub struct MaintenanceReportFilter {
    pub maintenance_type: Option<MaintenanceType>,
    pub status: Option<MaintenanceStatus>,
    pub asset: Option<RecordId>,
    /// Matched against `scheduled_date`
    pub range: DateRange,
}

#[derive(Debug, Clone, Default)]
pub struct FormReportFilter {
    pub status: Option<FormStatus>,
    pub asset: Option<RecordId>,
    /// Matched against `transfer_date`
    pub range: DateRange,
}

#[derive(Debug, Clone, Default)]
pub struct RequisitionReportFilter {
    pub status: Option<RequisitionStatus>,
    pub request_type: Option<RequestType>,
    /// Matched against `request_date`
    pub range: DateRange,
}

// ========== Summaries ==========

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total: u64,
    pub by_category: BTreeMap<String, u64>,
    pub by_status: BTreeMap<String, u64>,
    pub total_value: f64,
}

pub fn inventory_summary(assets: &[Asset]) -> InventorySummary {
    let mut summary = InventorySummary {
        total: assets.len() as u64,
        ..Default::default()
    };
    for asset in assets {
        let category = asset
            .category_name
            .clone()
            .unwrap_or_else(|| "Sin categoría".to_string());
        *summary.by_category.entry(category).or_insert(0) += 1;
        *summary
            .by_status
            .entry(asset.status.to_string())
            .or_insert(0) += 1;
    }
    summary.total_value = sum_money(assets.iter().map(|a| a.purchase_price));
    summary
}

/// Incident row with its resolution time
#[derive(Debug, Clone, Serialize)]
pub struct IncidentReportRow {
    #[serde(flatten)]
    pub incident: Incident,
    pub resolution_hours: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IncidentSummary {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
    pub by_priority: BTreeMap<String, u64>,
    /// Hours, 2 decimals
    pub average_resolution_time: f64,
    pub resolved_count: u64,
}

pub fn incident_rows(incidents: Vec<Incident>) -> Vec<IncidentReportRow> {
    incidents
        .into_iter()
        .map(|incident| IncidentReportRow {
            resolution_hours: incident
                .resolution_hours()
                .map(|h| (h * 100.0).round() / 100.0),
            incident,
        })
        .collect()
}

pub fn incident_summary(rows: &[IncidentReportRow]) -> IncidentSummary {
    let mut summary = IncidentSummary {
        total: rows.len() as u64,
        ..Default::default()
    };
    let mut hours = Vec::new();
    for row in rows {
        *summary
            .by_status
            .entry(row.incident.status.to_string())
            .or_insert(0) += 1;
        *summary
            .by_priority
            .entry(row.incident.priority.to_string())
            .or_insert(0) += 1;
        if let Some(h) = row.resolution_hours {
            hours.push(h);
        }
    }
    summary.resolved_count = hours.len() as u64;
    if !hours.is_empty() {
        let avg = hours.iter().sum::<f64>() / hours.len() as f64;
        summary.average_resolution_time = (avg * 100.0).round() / 100.0;
    }
    summary
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceSummary {
    pub total: u64,
    pub by_type: BTreeMap<String, u64>,
    pub by_status: BTreeMap<String, u64>,
    pub total_cost: f64,
    pub completed_count: u64,
}

pub fn maintenance_summary(items: &[Maintenance]) -> MaintenanceSummary {
    let mut summary = MaintenanceSummary {
        total: items.len() as u64,
        ..Default::default()
    };
    for item in items {
        *summary
            .by_type
            .entry(item.maintenance_type.to_string())
            .or_insert(0) += 1;
        *summary
            .by_status
            .entry(item.status.to_string())
            .or_insert(0) += 1;
        if item.status == MaintenanceStatus::Completed {
            summary.completed_count += 1;
        }
    }
    summary.total_cost = sum_money(items.iter().map(|m| m.cost));
    summary
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormSummary {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
    pub approved_count: u64,
    pub pending_count: u64,
}

pub fn form_summary(forms: &[ResponsiveForm]) -> FormSummary {
    let mut summary = FormSummary {
        total: forms.len() as u64,
        ..Default::default()
    };
    for form in forms {
        *summary
            .by_status
            .entry(form.status.to_string())
            .or_insert(0) += 1;
        match form.status {
            FormStatus::Approved => summary.approved_count += 1,
            FormStatus::Pending => summary.pending_count += 1,
            FormStatus::Rejected => {}
        }
    }
    summary
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequisitionSummary {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
    pub by_type: BTreeMap<String, u64>,
    pub total_amount: f64,
    /// Approved and completed amounts
    pub approved_value: f64,
}

pub fn requisition_summary(items: &[Requisition]) -> RequisitionSummary {
    let mut summary = RequisitionSummary {
        total: items.len() as u64,
        ..Default::default()
    };
    for item in items {
        *summary
            .by_status
            .entry(item.status.to_string())
            .or_insert(0) += 1;
        *summary
            .by_type
            .entry(item.request_type.to_string())
            .or_insert(0) += 1;
    }
    summary.total_amount = sum_money(items.iter().map(|r| r.amount));
    summary.approved_value = sum_money(
        items
            .iter()
            .filter(|r| {
                matches!(
                    r.status,
                    RequisitionStatus::Approved | RequisitionStatus::Completed
                )
            })
            .map(|r| r.amount),
    );
    summary
}

// ========== Dashboard & activity ==========

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total_assets: u64,
    pub assets_by_category: BTreeMap<String, u64>,
    pub assets_without_responsible: u64,
    pub expired_warranties: u64,
    pub total_incidents: u64,
    pub open_incidents: u64,
    pub incidents_by_priority: BTreeMap<String, u64>,
    pub total_maintenances: u64,
    pub upcoming_maintenances: u64,
    pub overdue_maintenances: u64,
    pub pending_forms: u64,
    pub pending_requisitions: u64,
    pub approved_requisitions_value: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserActivity {
    pub incidents_reported: u64,
    pub incidents_assigned: u64,
    pub maintenances_assigned: u64,
    pub requisitions_made: u64,
    pub forms_approved: u64,
}

#[derive(Clone)]
pub struct ReportRepository {
    base: BaseRepository,
}

impl ReportRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn inventory(&self, filter: &InventoryReportFilter) -> RepoResult<Vec<Asset>> {
        let mut conditions = Vec::new();
        if filter.category.is_some() {
            conditions.push("category_id = $category");
        }
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if filter.responsible.is_some() {
            conditions.push("responsible_user_id = $responsible");
        }
        push_range(&mut conditions, filter.range, "created_at >= $from", "created_at < $to");

        let sql = format!(
            "SELECT *, category_id.name AS category_name, \
             responsible_user_id.full_name AS responsible_name \
             FROM asset {} ORDER BY created_at DESC",
            where_clause(&conditions)
        );
        let assets: Vec<Asset> = self
            .base
            .db()
            .query(sql)
            .bind(("category", filter.category.clone()))
            .bind(("status", filter.status))
            .bind(("responsible", filter.responsible.clone()))
            .bind(("from", filter.range.from))
            .bind(("to", filter.range.to))
            .await?
            .take(0)?;
        Ok(assets)
    }

    pub async fn incidents(&self, filter: &IncidentReportFilter) -> RepoResult<Vec<Incident>> {
        let mut conditions = Vec::new();
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if filter.priority.is_some() {
            conditions.push("priority = $priority");
        }
        if filter.asset.is_some() {
            conditions.push("asset_id = $asset");
        }
        push_range(
            &mut conditions,
            filter.range,
            "reported_date >= $from",
            "reported_date < $to",
        );

        let sql = format!(
            "SELECT *, asset_id.name AS asset_name, asset_id.asset_code AS asset_code, \
             reported_by.full_name AS reported_by_name, assigned_to.full_name AS assigned_to_name \
             FROM incident {} ORDER BY reported_date DESC",
            where_clause(&conditions)
        );
        let incidents: Vec<Incident> = self
            .base
            .db()
            .query(sql)
            .bind(("status", filter.status))
            .bind(("priority", filter.priority))
            .bind(("asset", filter.asset.clone()))
            .bind(("from", filter.range.from))
            .bind(("to", filter.range.to))
            .await?
            .take(0)?;
        Ok(incidents)
    }

    pub async fn maintenance(
        &self,
        filter: &MaintenanceReportFilter,
    ) -> RepoResult<Vec<Maintenance>> {
        let mut conditions = Vec::new();
        if filter.maintenance_type.is_some() {
            conditions.push("maintenance_type = $maintenance_type");
        }
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if filter.asset.is_some() {
            conditions.push("asset_id = $asset");
        }
        push_range(
            &mut conditions,
            filter.range,
            "scheduled_date >= $from",
            "scheduled_date < $to",
        );

        let sql = format!(
            "SELECT *, asset_id.name AS asset_name, asset_id.asset_code AS asset_code, \
             technician_id.full_name AS technician_name \
             FROM maintenance {} ORDER BY scheduled_date DESC",
            where_clause(&conditions)
        );
        let items: Vec<Maintenance> = self
            .base
            .db()
            .query(sql)
            .bind(("maintenance_type", filter.maintenance_type))
            .bind(("status", filter.status))
            .bind(("asset", filter.asset.clone()))
            .bind(("from", filter.range.from))
            .bind(("to", filter.range.to))
            .await?
            .take(0)?;
        Ok(items)
    }

    pub async fn responsive_forms(
        &self,
        filter: &FormReportFilter,
    ) -> RepoResult<Vec<ResponsiveForm>> {
        let mut conditions = Vec::new();
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if filter.asset.is_some() {
            conditions.push("asset_id = $asset");
        }
        push_range(
            &mut conditions,
            filter.range,
            "transfer_date >= $from",
            "transfer_date < $to",
        );

        let sql = format!(
            "SELECT *, asset_id.name AS asset_name, asset_id.asset_code AS asset_code, \
             previous_responsible_id.full_name AS previous_responsible_name, \
             new_responsible_id.full_name AS new_responsible_name, \
             approved_by.full_name AS approved_by_name \
             FROM responsive_form {} ORDER BY transfer_date DESC",
            where_clause(&conditions)
        );
        let forms: Vec<ResponsiveForm> = self
            .base
            .db()
            .query(sql)
            .bind(("status", filter.status))
            .bind(("asset", filter.asset.clone()))
            .bind(("from", filter.range.from))
            .bind(("to", filter.range.to))
            .await?
            .take(0)?;
        Ok(forms)
    }

    pub async fn requisitions(
        &self,
        filter: &RequisitionReportFilter,
    ) -> RepoResult<Vec<Requisition>> {
        let mut conditions = Vec::new();
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if filter.request_type.is_some() {
            conditions.push("request_type = $request_type");
        }
        push_range(
            &mut conditions,
            filter.range,
            "request_date >= $from",
            "request_date < $to",
        );

        let sql = format!(
            "SELECT *, requested_by.full_name AS requested_by_name, \
             approved_by.full_name AS approved_by_name \
             FROM requisition {} ORDER BY request_date DESC",
            where_clause(&conditions)
        );
        let items: Vec<Requisition> = self
            .base
            .db()
            .query(sql)
            .bind(("status", filter.status))
            .bind(("request_type", filter.request_type))
            .bind(("from", filter.range.from))
            .bind(("to", filter.range.to))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Dashboard counters at `now`
    pub async fn dashboard(&self, now: i64) -> RepoResult<Dashboard> {
        let mut result = self
            .base
            .db()
            .query(
                r#"
                SELECT count() AS total FROM asset WHERE status != 'inactive' GROUP ALL;
                SELECT category_id.name AS name, count() AS count FROM asset
                    WHERE status != 'inactive' GROUP BY name;
                SELECT count() AS total FROM asset
                    WHERE status = 'active' AND responsible_user_id = NONE GROUP ALL;
                SELECT count() AS total FROM asset WHERE status = 'active'
                    AND warranty_expiry != NONE AND warranty_expiry < $now GROUP ALL;
                SELECT count() AS total FROM incident GROUP ALL;
                SELECT count() AS total FROM incident
                    WHERE status IN ['open', 'assigned', 'in_progress'] GROUP ALL;
                SELECT priority AS name, count() AS count FROM incident GROUP BY name;
                SELECT count() AS total FROM maintenance GROUP ALL;
                SELECT count() AS total FROM maintenance WHERE status = 'scheduled'
                    AND scheduled_date >= $now AND scheduled_date <= $until GROUP ALL;
                SELECT count() AS total FROM maintenance WHERE status = 'scheduled'
                    AND scheduled_date < $now GROUP ALL;
                SELECT count() AS total FROM responsive_form WHERE status = 'pending' GROUP ALL;
                SELECT count() AS total FROM requisition WHERE status = 'pending' GROUP ALL;
                SELECT VALUE amount FROM requisition WHERE status = 'approved';
                "#,
            )
            .bind(("now", now))
            .bind(("until", now + 30 * DAY_MS))
            .await?;

        let mut by_category = to_breakdown(result.take::<Vec<GroupCount>>(1)?);
        if let Some(count) = by_category.remove(UNASSIGNED) {
            by_category.insert("Sin categoría".to_string(), count);
        }

        Ok(Dashboard {
            total_assets: count_of(result.take::<Vec<CountRow>>(0)?),
            assets_by_category: by_category,
            assets_without_responsible: count_of(result.take::<Vec<CountRow>>(2)?),
            expired_warranties: count_of(result.take::<Vec<CountRow>>(3)?),
            total_incidents: count_of(result.take::<Vec<CountRow>>(4)?),
            open_incidents: count_of(result.take::<Vec<CountRow>>(5)?),
            incidents_by_priority: to_breakdown(result.take::<Vec<GroupCount>>(6)?),
            total_maintenances: count_of(result.take::<Vec<CountRow>>(7)?),
            upcoming_maintenances: count_of(result.take::<Vec<CountRow>>(8)?),
            overdue_maintenances: count_of(result.take::<Vec<CountRow>>(9)?),
            pending_forms: count_of(result.take::<Vec<CountRow>>(10)?),
            pending_requisitions: count_of(result.take::<Vec<CountRow>>(11)?),
            approved_requisitions_value: sum_money(result.take::<Vec<f64>>(12)?),
        })
    }

    /// What a user reported, was assigned, requested and approved
    pub async fn user_activity(&self, user: RecordId, range: DateRange) -> RepoResult<UserActivity> {
        let sql = format!(
            "SELECT count() AS total FROM incident {} GROUP ALL; \
             SELECT count() AS total FROM incident {} GROUP ALL; \
             SELECT count() AS total FROM maintenance {} GROUP ALL; \
             SELECT count() AS total FROM requisition {} GROUP ALL; \
             SELECT count() AS total FROM responsive_form {} GROUP ALL;",
            user_range_clause("reported_by", "reported_date", range),
            user_range_clause("assigned_to", "reported_date", range),
            user_range_clause("technician_id", "scheduled_date", range),
            user_range_clause("requested_by", "request_date", range),
            user_range_clause("approved_by", "approval_date", range),
        );

        let mut result = self
            .base
            .db()
            .query(sql)
            .bind(("user", user))
            .bind(("from", range.from))
            .bind(("to", range.to))
            .await?;

        Ok(UserActivity {
            incidents_reported: count_of(result.take::<Vec<CountRow>>(0)?),
            incidents_assigned: count_of(result.take::<Vec<CountRow>>(1)?),
            maintenances_assigned: count_of(result.take::<Vec<CountRow>>(2)?),
            requisitions_made: count_of(result.take::<Vec<CountRow>>(3)?),
            forms_approved: count_of(result.take::<Vec<CountRow>>(4)?),
        })
    }
}

fn push_range(
    conditions: &mut Vec<&'static str>,
    range: DateRange,
    from_sql: &'static str,
    to_sql: &'static str,
) {
    if range.from.is_some() {
        conditions.push(from_sql);
    }
    if range.to.is_some() {
        conditions.push(to_sql);
    }
}

fn user_range_clause(user_field: &str, date_field: &str, range: DateRange) -> String {
    let mut clause = format!("WHERE {user_field} = $user");
    if range.from.is_some() {
        clause.push_str(&format!(" AND {date_field} >= $from"));
    }
    if range.to.is_some() {
        clause.push_str(&format!(" AND {date_field} < $to"));
    }
    clause
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Currency;

    fn requisition(amount: f64, status: RequisitionStatus, kind: RequestType) -> Requisition {
        Requisition {
            id: None,
            requisition_code: "REQ-250314-001".into(),
            request_type: kind,
            amount,
            currency: Currency::Mxn,
            amount_in_words: String::new(),
            payable_to: "Proveedor".into(),
            concept: "Compra".into(),
            request_date: 0,
            department: "SISTEMAS".into(),
            requested_by: None,
            status,
            approved_by: None,
            approval_date: None,
            notes: String::new(),
            created_at: 0,
            updated_at: 0,
            requested_by_name: None,
            approved_by_name: None,
        }
    }

    #[test]
    fn test_requisition_summary_counts_approved_value() {
        let items = vec![
            requisition(1000.10, RequisitionStatus::Approved, RequestType::Efectivo),
            requisition(500.20, RequisitionStatus::Completed, RequestType::Transferencia),
            requisition(99.99, RequisitionStatus::Pending, RequestType::Efectivo),
        ];
        let summary = requisition_summary(&items);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.total_amount, 1600.29);
        assert_eq!(summary.approved_value, 1500.3);
        assert_eq!(summary.by_type["efectivo"], 2);
        assert_eq!(summary.by_status["pending"], 1);
    }

    #[test]
    fn test_user_range_clause() {
        let open = DateRange::default();
        assert_eq!(
            user_range_clause("reported_by", "reported_date", open),
            "WHERE reported_by = $user"
        );
        let bounded = DateRange {
            from: Some(1),
            to: Some(2),
        };
        assert_eq!(
            user_range_clause("approved_by", "approval_date", bounded),
            "WHERE approved_by = $user AND approval_date >= $from AND approval_date < $to"
        );
    }

    #[test]
    fn test_empty_summaries() {
        assert_eq!(inventory_summary(&[]).total, 0);
        assert_eq!(incident_summary(&[]).average_resolution_time, 0.0);
        assert_eq!(maintenance_summary(&[]).total_cost, 0.0);
        assert_eq!(form_summary(&[]).pending_count, 0);
        assert_eq!(requisition_summary(&[]), RequisitionSummary::default());
    }

    #[test]
    fn test_rejected_requisitions_add_to_total_only() {
        let items = vec![
            requisition(250.0, RequisitionStatus::Rejected, RequestType::PagoTarjeta),
            requisition(0.1, RequisitionStatus::Approved, RequestType::PagoTarjeta),
            requisition(0.2, RequisitionStatus::Approved, RequestType::PagoTarjeta),
        ];
        let summary = requisition_summary(&items);
        assert_eq!(summary.total_amount, 250.3);
        assert_eq!(summary.approved_value, 0.3);
        assert_eq!(summary.by_status["rejected"], 1);
        assert_eq!(summary.by_status["approved"], 2);
        assert!(!summary.by_status.contains_key("completed"));
    }
}
