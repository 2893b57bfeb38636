//! Responsive Form Repository

use std::collections::BTreeMap;

use serde::Serialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{
    BaseRepository, CountRow, GroupCount, RepoError, RepoResult, count_of, parse_optional_id,
    parse_record_id, to_breakdown, where_clause,
};
use crate::db::models::{FormStatus, PageParams, ResponsiveForm, ResponsiveFormFilter};
use shared::PageQuery;
use shared::util::{now_millis, prefix};

const TABLE: &str = "responsive_form";

const SELECT_POPULATED: &str = "SELECT *, asset_id.name AS asset_name, \
     asset_id.asset_code AS asset_code, \
     previous_responsible_id.full_name AS previous_responsible_name, \
     new_responsible_id.full_name AS new_responsible_name, \
     approved_by.full_name AS approved_by_name";

/// `GET /api/responsive-forms/stats/overview`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsiveFormStats {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub this_month: u64,
}

/// New custody transfer
#[derive(Debug, Clone)]
pub struct NewResponsiveForm {
    pub asset_id: RecordId,
    pub previous_responsible_id: Option<RecordId>,
    pub new_responsible_id: RecordId,
    pub transfer_date: i64,
    pub reason: String,
    pub conditions: String,
    pub observations: String,
}

#[derive(Clone)]
pub struct ResponsiveFormRepository {
    base: BaseRepository,
}

impl ResponsiveFormRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_page(
        &self,
        filter: &ResponsiveFormFilter,
    ) -> RepoResult<(Vec<ResponsiveForm>, u64, PageQuery)> {
        let page = filter.page_query();
        let asset = parse_optional_id("asset", filter.asset_id.as_deref())?;
        let new_responsible = parse_optional_id("user", filter.new_responsible_id.as_deref())?;

        let mut conditions = Vec::new();
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if asset.is_some() {
            conditions.push("asset_id = $asset");
        }
        if new_responsible.is_some() {
            conditions.push("new_responsible_id = $new_responsible");
        }
        let where_sql = where_clause(&conditions);

        let sql = format!(
            "SELECT count() AS total FROM responsive_form {where_sql} GROUP ALL; \
             {SELECT_POPULATED} FROM responsive_form {where_sql} \
             ORDER BY created_at DESC LIMIT {} START {};",
            page.limit,
            page.offset()
        );

        let mut result = self
            .base
            .db()
            .query(sql)
            .bind(("status", filter.status))
            .bind(("asset", asset))
            .bind(("new_responsible", new_responsible))
            .await?;

        let total: Vec<CountRow> = result.take(0)?;
        let forms: Vec<ResponsiveForm> = result.take(1)?;
        Ok((forms, count_of(total), page))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<ResponsiveForm>> {
        let thing = parse_record_id(TABLE, id)?;
        self.find_by_record(thing).await
    }

    async fn find_by_record(&self, thing: RecordId) -> RepoResult<Option<ResponsiveForm>> {
        let forms: Vec<ResponsiveForm> = self
            .base
            .db()
            .query(format!("{SELECT_POPULATED} FROM $thing"))
            .bind(("thing", thing))
            .await?
            .take(0)?;
        Ok(forms.into_iter().next())
    }

    pub async fn create(&self, data: NewResponsiveForm) -> RepoResult<ResponsiveForm> {
        let code = self
            .base
            .unique_code(TABLE, "form_code", prefix::RESPONSIVE_FORM)
            .await?;
        let now = now_millis();

        let created: Option<ResponsiveForm> = self
            .base
            .db()
            .query(
                r#"CREATE responsive_form SET
                    form_code = $code,
                    asset_id = $asset_id,
                    previous_responsible_id = $previous_responsible_id,
                    new_responsible_id = $new_responsible_id,
                    transfer_date = $transfer_date,
                    reason = $reason,
                    conditions = $conditions,
                    observations = $observations,
                    status = $status,
                    approved_by = NONE,
                    approval_date = NONE,
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("code", code))
            .bind(("asset_id", data.asset_id))
            .bind(("previous_responsible_id", data.previous_responsible_id))
            .bind(("new_responsible_id", data.new_responsible_id))
            .bind(("transfer_date", data.transfer_date))
            .bind(("reason", data.reason))
            .bind(("conditions", data.conditions))
            .bind(("observations", data.observations))
            .bind(("status", FormStatus::Pending))
            .bind(("now", now))
            .await?
            .take(0)?;

        let created = created
            .ok_or_else(|| RepoError::Database("Failed to create responsive form".to_string()))?;
        match created.id.clone() {
            Some(thing) => Ok(self.find_by_record(thing).await?.unwrap_or(created)),
            None => Ok(created),
        }
    }

    /// Approve or reject a pending form
    ///
    /// Approval hands the asset to the new responsible.
    /// `None` when the form does not exist or was already processed.
    pub async fn approve(
        &self,
        id: &str,
        approved: bool,
        approver: RecordId,
    ) -> RepoResult<Option<ResponsiveForm>> {
        let thing = parse_record_id(TABLE, id)?;
        let status = if approved {
            FormStatus::Approved
        } else {
            FormStatus::Rejected
        };
        let now = now_millis();

        let processed: Option<ResponsiveForm> = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    status = $status,
                    approved_by = $approver,
                    approval_date = $now,
                    updated_at = $now
                WHERE status = 'pending'
                RETURN AFTER"#,
            )
            .bind(("thing", thing.clone()))
            .bind(("status", status))
            .bind(("approver", approver))
            .bind(("now", now))
            .await?
            .take(0)?;

        let Some(form) = processed else {
            return Ok(None);
        };

        if approved
            && let (Some(asset), Some(new_responsible)) =
                (form.asset_id.clone(), form.new_responsible_id.clone())
        {
            self.base
                .db()
                .query("UPDATE $asset SET responsible_user_id = $user, updated_at = $now")
                .bind(("asset", asset))
                .bind(("user", new_responsible))
                .bind(("now", now))
                .await?
                .check()?;
        }

        self.find_by_record(thing).await
    }

    /// Approved transfers of an asset, latest transfer first
    pub async fn history(&self, asset_id: RecordId) -> RepoResult<Vec<ResponsiveForm>> {
        let forms: Vec<ResponsiveForm> = self
            .base
            .db()
            .query(format!(
                "{SELECT_POPULATED} FROM responsive_form WHERE asset_id = $asset \
                 AND status = 'approved' ORDER BY transfer_date DESC"
            ))
            .bind(("asset", asset_id))
            .await?
            .take(0)?;
        Ok(forms)
    }

    /// Forms waiting for approval, oldest first
    pub async fn pending(&self) -> RepoResult<Vec<ResponsiveForm>> {
        let forms: Vec<ResponsiveForm> = self
            .base
            .db()
            .query(format!(
                "{SELECT_POPULATED} FROM responsive_form WHERE status = 'pending' \
                 ORDER BY created_at ASC"
            ))
            .await?
            .take(0)?;
        Ok(forms)
    }

    pub async fn stats(&self, month_start: i64) -> RepoResult<ResponsiveFormStats> {
        let mut result = self
            .base
            .db()
            .query(
                r#"
                SELECT count() AS total FROM responsive_form GROUP ALL;
                SELECT status AS name, count() AS count FROM responsive_form GROUP BY name;
                SELECT count() AS total FROM responsive_form
                    WHERE created_at >= $month_start GROUP ALL;
                "#,
            )
            .bind(("month_start", month_start))
            .await?;

        let total: Vec<CountRow> = result.take(0)?;
        let by_status = to_breakdown(result.take::<Vec<GroupCount>>(1)?);
        let this_month: Vec<CountRow> = result.take(2)?;
        let status_count = |s: FormStatus| by_status.get(s.as_str()).copied().unwrap_or(0);

        Ok(ResponsiveFormStats {
            total: count_of(total),
            pending: status_count(FormStatus::Pending),
            approved: status_count(FormStatus::Approved),
            rejected: status_count(FormStatus::Rejected),
            this_month: count_of(this_month),
            by_status,
        })
    }
}
