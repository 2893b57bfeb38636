//! Maintenance Repository

use std::collections::BTreeMap;

use serde::Serialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{
    BaseRepository, CountRow, GroupCount, RepoError, RepoResult, count_of, parse_optional_id,
    parse_record_id, set_clause, to_breakdown, where_clause,
};
use crate::db::models::{
    Maintenance, MaintenanceFields, MaintenanceFilter, MaintenanceStatus, PageParams,
};
use shared::PageQuery;
use shared::util::{now_millis, prefix, sum_money};

const TABLE: &str = "maintenance";

const SELECT_POPULATED: &str = "SELECT *, asset_id.name AS asset_name, \
     asset_id.asset_code AS asset_code, technician_id.full_name AS technician_name";

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// `GET /api/maintenance/stats/overview`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceStats {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
    pub by_type: BTreeMap<String, u64>,
    pub upcoming: u64,
    pub overdue: u64,
    /// Cost of maintenances completed in the last 12 months
    pub total_cost: f64,
}

#[derive(Clone)]
pub struct MaintenanceRepository {
    base: BaseRepository,
}

impl MaintenanceRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Filtered page, latest scheduled date first
    pub async fn find_page(
        &self,
        filter: &MaintenanceFilter,
    ) -> RepoResult<(Vec<Maintenance>, u64, PageQuery)> {
        let page = filter.page_query();
        let asset = parse_optional_id("asset", filter.asset_id.as_deref())?;

        let mut conditions = Vec::new();
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if filter.maintenance_type.is_some() {
            conditions.push("maintenance_type = $maintenance_type");
        }
        if asset.is_some() {
            conditions.push("asset_id = $asset");
        }
        let where_sql = where_clause(&conditions);

        let sql = format!(
            "SELECT count() AS total FROM maintenance {where_sql} GROUP ALL; \
             {SELECT_POPULATED} FROM maintenance {where_sql} \
             ORDER BY scheduled_date DESC, created_at DESC LIMIT {} START {};",
            page.limit,
            page.offset()
        );

        let mut result = self
            .base
            .db()
            .query(sql)
            .bind(("status", filter.status))
            .bind(("maintenance_type", filter.maintenance_type))
            .bind(("asset", asset))
            .await?;

        let total: Vec<CountRow> = result.take(0)?;
        let items: Vec<Maintenance> = result.take(1)?;
        Ok((items, count_of(total), page))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Maintenance>> {
        let thing = parse_record_id(TABLE, id)?;
        self.find_by_record(thing).await
    }

    async fn find_by_record(&self, thing: RecordId) -> RepoResult<Option<Maintenance>> {
        let items: Vec<Maintenance> = self
            .base
            .db()
            .query(format!("{SELECT_POPULATED} FROM $thing"))
            .bind(("thing", thing))
            .await?
            .take(0)?;
        Ok(items.into_iter().next())
    }

    async fn require(&self, id: &str) -> RepoResult<(RecordId, Maintenance)> {
        let thing = parse_record_id(TABLE, id)?;
        let item = self
            .find_by_record(thing.clone())
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Maintenance {} not found", id)))?;
        Ok((thing, item))
    }

    pub async fn create(&self, data: MaintenanceFields) -> RepoResult<Maintenance> {
        let title = data
            .title
            .ok_or_else(|| RepoError::Validation("title is required".to_string()))?;
        let scheduled_date = data
            .scheduled_date
            .ok_or_else(|| RepoError::Validation("scheduled_date is required".to_string()))?;

        let code = self
            .base
            .unique_code(TABLE, "maintenance_code", prefix::MAINTENANCE)
            .await?;
        let now = now_millis();

        let created: Option<Maintenance> = self
            .base
            .db()
            .query(
                r#"CREATE maintenance SET
                    maintenance_code = $code,
                    asset_id = $asset_id,
                    maintenance_type = $maintenance_type,
                    title = $title,
                    description = $description,
                    scheduled_date = $scheduled_date,
                    completed_date = NONE,
                    status = $status,
                    technician_id = $technician_id,
                    cost = $cost,
                    supplier = $supplier,
                    notes = $notes,
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("code", code))
            .bind(("asset_id", data.asset_id))
            .bind(("maintenance_type", data.maintenance_type.unwrap_or_default()))
            .bind(("title", title))
            .bind(("description", data.description.unwrap_or_default()))
            .bind(("scheduled_date", scheduled_date))
            .bind(("status", MaintenanceStatus::Scheduled))
            .bind(("technician_id", data.technician_id))
            .bind(("cost", data.cost.unwrap_or(0.0)))
            .bind(("supplier", data.supplier.unwrap_or_default()))
            .bind(("notes", data.notes.unwrap_or_default()))
            .bind(("now", now))
            .await?
            .take(0)?;

        let created = created
            .ok_or_else(|| RepoError::Database("Failed to create maintenance".to_string()))?;
        match created.id.clone() {
            Some(thing) => Ok(self.find_by_record(thing).await?.unwrap_or(created)),
            None => Ok(created),
        }
    }

    pub async fn update(&self, id: &str, data: MaintenanceFields) -> RepoResult<Maintenance> {
        let (thing, existing) = self.require(id).await?;

        let completed_date = match data.status {
            Some(MaintenanceStatus::Completed) if existing.completed_date.is_none() => {
                Some(now_millis())
            }
            _ => None,
        };

        let sets = set_clause(&[
            ("asset_id", data.asset_id.is_some()),
            ("maintenance_type", data.maintenance_type.is_some()),
            ("title", data.title.is_some()),
            ("description", data.description.is_some()),
            ("scheduled_date", data.scheduled_date.is_some()),
            ("status", data.status.is_some()),
            ("technician_id", data.technician_id.is_some()),
            ("cost", data.cost.is_some()),
            ("supplier", data.supplier.is_some()),
            ("notes", data.notes.is_some()),
            ("completed_date", completed_date.is_some()),
            ("updated_at", true),
        ]);

        self.base
            .db()
            .query(format!("UPDATE $thing SET {sets}"))
            .bind(("thing", thing.clone()))
            .bind(("asset_id", data.asset_id))
            .bind(("maintenance_type", data.maintenance_type))
            .bind(("title", data.title))
            .bind(("description", data.description))
            .bind(("scheduled_date", data.scheduled_date))
            .bind(("status", data.status))
            .bind(("technician_id", data.technician_id))
            .bind(("cost", data.cost))
            .bind(("supplier", data.supplier))
            .bind(("notes", data.notes))
            .bind(("completed_date", completed_date))
            .bind(("updated_at", now_millis()))
            .await?
            .check()?;

        self.find_by_record(thing)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Maintenance {} not found", id)))
    }

    /// scheduled -> in_progress
    ///
    /// Returns `Validation` when the current status does not allow it.
    pub async fn start(&self, id: &str) -> RepoResult<Maintenance> {
        let (_, existing) = self.require(id).await?;
        if !existing.status.can_start() {
            return Err(RepoError::Validation(format!(
                "Cannot start a maintenance in status '{}'",
                existing.status
            )));
        }
        self.update(
            id,
            MaintenanceFields {
                status: Some(MaintenanceStatus::InProgress),
                ..Default::default()
            },
        )
        .await
    }

    /// scheduled | in_progress -> completed, stamps `completed_date`
    pub async fn complete(
        &self,
        id: &str,
        notes: Option<String>,
        cost: Option<f64>,
    ) -> RepoResult<Maintenance> {
        let (_, existing) = self.require(id).await?;
        if !existing.status.can_complete() {
            return Err(RepoError::Validation(format!(
                "Cannot complete a maintenance in status '{}'",
                existing.status
            )));
        }
        self.update(
            id,
            MaintenanceFields {
                status: Some(MaintenanceStatus::Completed),
                notes,
                cost,
                ..Default::default()
            },
        )
        .await
    }

    /// Scheduled within `[now, now + days]`, soonest first
    pub async fn upcoming(&self, now: i64, days: u32) -> RepoResult<Vec<Maintenance>> {
        let items: Vec<Maintenance> = self
            .base
            .db()
            .query(format!(
                "{SELECT_POPULATED} FROM maintenance WHERE status = 'scheduled' \
                 AND scheduled_date >= $now AND scheduled_date <= $until ORDER BY scheduled_date ASC"
            ))
            .bind(("now", now))
            .bind(("until", now + i64::from(days) * DAY_MS))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Still scheduled but dated before `now`, oldest first
    pub async fn overdue(&self, now: i64) -> RepoResult<Vec<Maintenance>> {
        let items: Vec<Maintenance> = self
            .base
            .db()
            .query(format!(
                "{SELECT_POPULATED} FROM maintenance WHERE status = 'scheduled' \
                 AND scheduled_date < $now ORDER BY scheduled_date ASC"
            ))
            .bind(("now", now))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// `cost_since`: completions from this instant on are summed into `total_cost`
    pub async fn stats(&self, now: i64, cost_since: i64) -> RepoResult<MaintenanceStats> {
        let mut result = self
            .base
            .db()
            .query(
                r#"
                SELECT count() AS total FROM maintenance GROUP ALL;
                SELECT status AS name, count() AS count FROM maintenance GROUP BY name;
                SELECT maintenance_type AS name, count() AS count FROM maintenance GROUP BY name;
                SELECT count() AS total FROM maintenance WHERE status = 'scheduled'
                    AND scheduled_date >= $now AND scheduled_date <= $until GROUP ALL;
                SELECT count() AS total FROM maintenance WHERE status = 'scheduled'
                    AND scheduled_date < $now GROUP ALL;
                SELECT VALUE cost FROM maintenance WHERE completed_date != NONE
                    AND completed_date >= $since AND cost != NONE;
                "#,
            )
            .bind(("now", now))
            .bind(("until", now + 30 * DAY_MS))
            .bind(("since", cost_since))
            .await?;

        let total: Vec<CountRow> = result.take(0)?;
        let by_status: Vec<GroupCount> = result.take(1)?;
        let by_type: Vec<GroupCount> = result.take(2)?;
        let upcoming: Vec<CountRow> = result.take(3)?;
        let overdue: Vec<CountRow> = result.take(4)?;
        let costs: Vec<f64> = result.take(5)?;

        Ok(MaintenanceStats {
            total: count_of(total),
            by_status: to_breakdown(by_status),
            by_type: to_breakdown(by_type),
            upcoming: count_of(upcoming),
            overdue: count_of(overdue),
            total_cost: sum_money(costs),
        })
    }
}
