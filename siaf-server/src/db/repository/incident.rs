//! Incident Repository

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{
    BaseRepository, CountRow, GroupCount, RepoError, RepoResult, count_of, parse_optional_id,
    parse_record_id, set_clause, to_breakdown, where_clause,
};
use crate::db::models::{
    Incident, IncidentFields, IncidentFilter, IncidentStatus, PageParams,
};
use shared::PageQuery;
use shared::util::{now_millis, prefix};

const TABLE: &str = "incident";

const SELECT_POPULATED: &str = "SELECT *, asset_id.name AS asset_name, \
     asset_id.asset_code AS asset_code, reported_by.full_name AS reported_by_name, \
     assigned_to.full_name AS assigned_to_name";

/// `GET /api/incidents/stats/overview`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentStats {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
    pub by_priority: BTreeMap<String, u64>,
    pub open: u64,
    pub resolved: u64,
    /// Mean hours from report to resolution, 2 decimals
    pub average_resolution_hours: f64,
}

#[derive(Debug, Deserialize)]
struct ResolutionRow {
    reported_date: i64,
    resolved_date: i64,
}

/// Mean resolution time in hours, rounded to 2 decimals
pub fn average_hours(spans_ms: &[i64]) -> f64 {
    if spans_ms.is_empty() {
        return 0.0;
    }
    let total: i64 = spans_ms.iter().sum();
    let hours = total as f64 / spans_ms.len() as f64 / 3_600_000.0;
    (hours * 100.0).round() / 100.0
}

#[derive(Clone)]
pub struct IncidentRepository {
    base: BaseRepository,
}

impl IncidentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Filtered page, newest first
    pub async fn find_page(
        &self,
        filter: &IncidentFilter,
    ) -> RepoResult<(Vec<Incident>, u64, PageQuery)> {
        let page = filter.page_query();
        let asset = parse_optional_id("asset", filter.asset_id.as_deref())?;

        let mut conditions = Vec::new();
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if filter.priority.is_some() {
            conditions.push("priority = $priority");
        }
        if asset.is_some() {
            conditions.push("asset_id = $asset");
        }
        let where_sql = where_clause(&conditions);

        let sql = format!(
            "SELECT count() AS total FROM incident {where_sql} GROUP ALL; \
             {SELECT_POPULATED} FROM incident {where_sql} ORDER BY created_at DESC LIMIT {} START {};",
            page.limit,
            page.offset()
        );

        let mut result = self
            .base
            .db()
            .query(sql)
            .bind(("status", filter.status))
            .bind(("priority", filter.priority))
            .bind(("asset", asset))
            .await?;

        let total: Vec<CountRow> = result.take(0)?;
        let incidents: Vec<Incident> = result.take(1)?;
        Ok((incidents, count_of(total), page))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Incident>> {
        let thing = parse_record_id(TABLE, id)?;
        self.find_by_record(thing).await
    }

    async fn find_by_record(&self, thing: RecordId) -> RepoResult<Option<Incident>> {
        let incidents: Vec<Incident> = self
            .base
            .db()
            .query(format!("{SELECT_POPULATED} FROM $thing"))
            .bind(("thing", thing))
            .await?
            .take(0)?;
        Ok(incidents.into_iter().next())
    }

    async fn require(&self, id: &str) -> RepoResult<(RecordId, Incident)> {
        let thing = parse_record_id(TABLE, id)?;
        let incident = self
            .find_by_record(thing.clone())
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Incident {} not found", id)))?;
        Ok((thing, incident))
    }

    /// Report a new incident
    pub async fn create(&self, data: IncidentFields, reported_by: RecordId) -> RepoResult<Incident> {
        let title = data
            .title
            .ok_or_else(|| RepoError::Validation("title is required".to_string()))?;
        let description = data
            .description
            .ok_or_else(|| RepoError::Validation("description is required".to_string()))?;

        let code = self
            .base
            .unique_code(TABLE, "incident_code", prefix::INCIDENT)
            .await?;
        let now = now_millis();
        let status = if data.assigned_to.is_some() {
            IncidentStatus::Assigned
        } else {
            IncidentStatus::Open
        };

        let created: Option<Incident> = self
            .base
            .db()
            .query(
                r#"CREATE incident SET
                    incident_code = $code,
                    title = $title,
                    description = $description,
                    asset_id = $asset_id,
                    priority = $priority,
                    status = $status,
                    reported_by = $reported_by,
                    assigned_to = $assigned_to,
                    reported_date = $reported_date,
                    resolved_date = NONE,
                    solution = '',
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("code", code))
            .bind(("title", title))
            .bind(("description", description))
            .bind(("asset_id", data.asset_id))
            .bind(("priority", data.priority.unwrap_or_default()))
            .bind(("status", status))
            .bind(("reported_by", reported_by))
            .bind(("assigned_to", data.assigned_to))
            .bind(("reported_date", data.reported_date.unwrap_or(now)))
            .bind(("now", now))
            .await?
            .take(0)?;

        let created =
            created.ok_or_else(|| RepoError::Database("Failed to create incident".to_string()))?;
        match created.id.clone() {
            Some(thing) => Ok(self.find_by_record(thing).await?.unwrap_or(created)),
            None => Ok(created),
        }
    }

    /// Update fields; reaching resolved or closed stamps `resolved_date` once
    pub async fn update(&self, id: &str, data: IncidentFields) -> RepoResult<Incident> {
        let (thing, existing) = self.require(id).await?;

        let resolved_date = match data.status {
            Some(status) if status.is_finished() && existing.resolved_date.is_none() => {
                Some(now_millis())
            }
            _ => None,
        };

        let sets = set_clause(&[
            ("title", data.title.is_some()),
            ("description", data.description.is_some()),
            ("asset_id", data.asset_id.is_some()),
            ("priority", data.priority.is_some()),
            ("status", data.status.is_some()),
            ("assigned_to", data.assigned_to.is_some()),
            ("solution", data.solution.is_some()),
            ("resolved_date", resolved_date.is_some()),
            ("updated_at", true),
        ]);

        self.base
            .db()
            .query(format!("UPDATE $thing SET {sets}"))
            .bind(("thing", thing.clone()))
            .bind(("title", data.title))
            .bind(("description", data.description))
            .bind(("asset_id", data.asset_id))
            .bind(("priority", data.priority))
            .bind(("status", data.status))
            .bind(("assigned_to", data.assigned_to))
            .bind(("solution", data.solution))
            .bind(("resolved_date", resolved_date))
            .bind(("updated_at", now_millis()))
            .await?
            .check()?;

        self.find_by_record(thing)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Incident {} not found", id)))
    }

    /// Assign a technician; status becomes `assigned`
    pub async fn assign(&self, id: &str, assigned_to: RecordId) -> RepoResult<Incident> {
        self.update(
            id,
            IncidentFields {
                assigned_to: Some(assigned_to),
                status: Some(IncidentStatus::Assigned),
                ..Default::default()
            },
        )
        .await
    }

    /// Record the solution and mark the incident resolved
    pub async fn resolve(&self, id: &str, solution: String) -> RepoResult<Incident> {
        let (thing, _) = self.require(id).await?;
        let now = now_millis();
        self.base
            .db()
            .query(
                "UPDATE $thing SET status = $status, solution = $solution, \
                 resolved_date = $now, updated_at = $now",
            )
            .bind(("thing", thing.clone()))
            .bind(("status", IncidentStatus::Resolved))
            .bind(("solution", solution))
            .bind(("now", now))
            .await?
            .check()?;

        self.find_by_record(thing)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Incident {} not found", id)))
    }

    pub async fn stats(&self) -> RepoResult<IncidentStats> {
        let mut result = self
            .base
            .db()
            .query(
                r#"
                SELECT count() AS total FROM incident GROUP ALL;
                SELECT status AS name, count() AS count FROM incident GROUP BY name;
                SELECT priority AS name, count() AS count FROM incident GROUP BY name;
                SELECT reported_date, resolved_date FROM incident
                    WHERE resolved_date != NONE AND status IN ['resolved', 'closed'];
                "#,
            )
            .await?;

        let total: Vec<CountRow> = result.take(0)?;
        let by_status = to_breakdown(result.take::<Vec<GroupCount>>(1)?);
        let by_priority = to_breakdown(result.take::<Vec<GroupCount>>(2)?);
        let resolutions: Vec<ResolutionRow> = result.take(3)?;

        let open = IncidentStatus::ACTIVE
            .iter()
            .map(|s| by_status.get(s.as_str()).copied().unwrap_or(0))
            .sum();
        let resolved = by_status
            .get(IncidentStatus::Resolved.as_str())
            .copied()
            .unwrap_or(0);
        let spans: Vec<i64> = resolutions
            .iter()
            .map(|r| r.resolved_date - r.reported_date)
            .collect();

        Ok(IncidentStats {
            total: count_of(total),
            by_status,
            by_priority,
            open,
            resolved,
            average_resolution_hours: average_hours(&spans),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_hours() {
        assert_eq!(average_hours(&[]), 0.0);
        assert_eq!(average_hours(&[3_600_000, 7_200_000]), 1.5);
        // 20 minutes
        assert_eq!(average_hours(&[1_200_000]), 0.33);
    }
}
