//! Requisition Repository
//!
//! Status changes are guarded in the `WHERE` clause, so a requisition that
//! moved on concurrently is reported as not found instead of overwritten.

use std::collections::BTreeMap;

use serde::Serialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{
    BaseRepository, CountRow, GroupCount, RepoError, RepoResult, count_of, parse_record_id,
    set_clause, to_breakdown, where_clause,
};
use crate::db::models::{
    PageParams, Requisition, RequisitionFields, RequisitionFilter, RequisitionStatus,
};
use shared::PageQuery;
use shared::util::{now_millis, prefix, sum_money};

const TABLE: &str = "requisition";

const SELECT_POPULATED: &str = "SELECT *, requested_by.full_name AS requested_by_name, \
     approved_by.full_name AS approved_by_name";

/// `GET /api/requisitions/stats/overview`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequisitionStats {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
    pub by_type: BTreeMap<String, u64>,
    pub pending: u64,
    pub approved: u64,
    pub this_month: u64,
    /// Sum of approved and completed amounts
    pub total_amount: f64,
}

#[derive(Clone)]
pub struct RequisitionRepository {
    base: BaseRepository,
}

impl RequisitionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_page(
        &self,
        filter: &RequisitionFilter,
    ) -> RepoResult<(Vec<Requisition>, u64, PageQuery)> {
        let page = filter.page_query();
        let mut conditions = Vec::new();
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        let where_sql = where_clause(&conditions);

        let sql = format!(
            "SELECT count() AS total FROM requisition {where_sql} GROUP ALL; \
             {SELECT_POPULATED} FROM requisition {where_sql} \
             ORDER BY created_at DESC LIMIT {} START {};",
            page.limit,
            page.offset()
        );

        let mut result = self
            .base
            .db()
            .query(sql)
            .bind(("status", filter.status))
            .await?;

        let total: Vec<CountRow> = result.take(0)?;
        let items: Vec<Requisition> = result.take(1)?;
        Ok((items, count_of(total), page))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Requisition>> {
        let thing = parse_record_id(TABLE, id)?;
        self.find_by_record(thing).await
    }

    async fn find_by_record(&self, thing: RecordId) -> RepoResult<Option<Requisition>> {
        let items: Vec<Requisition> = self
            .base
            .db()
            .query(format!("{SELECT_POPULATED} FROM $thing"))
            .bind(("thing", thing))
            .await?
            .take(0)?;
        Ok(items.into_iter().next())
    }

    async fn populated(&self, item: Requisition) -> RepoResult<Requisition> {
        match item.id.clone() {
            Some(thing) => Ok(self.find_by_record(thing).await?.unwrap_or(item)),
            None => Ok(item),
        }
    }

    /// Create a pending requisition
    ///
    /// `data.amount` carries the amount together with its words.
    pub async fn create(
        &self,
        data: RequisitionFields,
        requested_by: RecordId,
    ) -> RepoResult<Requisition> {
        let request_type = data
            .request_type
            .ok_or_else(|| RepoError::Validation("request_type is required".to_string()))?;
        let (amount, amount_in_words) = data
            .amount
            .ok_or_else(|| RepoError::Validation("amount is required".to_string()))?;
        let payable_to = data
            .payable_to
            .ok_or_else(|| RepoError::Validation("payable_to is required".to_string()))?;
        let concept = data
            .concept
            .ok_or_else(|| RepoError::Validation("concept is required".to_string()))?;

        let code = self
            .base
            .unique_code(TABLE, "requisition_code", prefix::REQUISITION)
            .await?;
        let now = now_millis();

        let created: Option<Requisition> = self
            .base
            .db()
            .query(
                r#"CREATE requisition SET
                    requisition_code = $code,
                    request_type = $request_type,
                    amount = $amount,
                    currency = $currency,
                    amount_in_words = $amount_in_words,
                    payable_to = $payable_to,
                    concept = $concept,
                    request_date = $request_date,
                    department = $department,
                    requested_by = $requested_by,
                    status = $status,
                    approved_by = NONE,
                    approval_date = NONE,
                    notes = $notes,
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("code", code))
            .bind(("request_type", request_type))
            .bind(("amount", amount))
            .bind(("currency", data.currency.unwrap_or_default()))
            .bind(("amount_in_words", amount_in_words))
            .bind(("payable_to", payable_to))
            .bind(("concept", concept))
            .bind(("request_date", data.request_date.unwrap_or(now)))
            .bind(("department", data.department.unwrap_or_default()))
            .bind(("requested_by", requested_by))
            .bind(("status", RequisitionStatus::Pending))
            .bind(("notes", data.notes.unwrap_or_default()))
            .bind(("now", now))
            .await?
            .take(0)?;

        let created = created
            .ok_or_else(|| RepoError::Database("Failed to create requisition".to_string()))?;
        self.populated(created).await
    }

    /// Update a pending requisition; `None` if missing or no longer pending
    pub async fn update_pending(
        &self,
        id: &str,
        data: RequisitionFields,
    ) -> RepoResult<Option<Requisition>> {
        let thing = parse_record_id(TABLE, id)?;
        let (amount, amount_in_words) = data.amount.unzip();

        let sets = set_clause(&[
            ("request_type", data.request_type.is_some()),
            ("amount", amount.is_some()),
            ("amount_in_words", amount_in_words.is_some()),
            ("currency", data.currency.is_some()),
            ("payable_to", data.payable_to.is_some()),
            ("concept", data.concept.is_some()),
            ("request_date", data.request_date.is_some()),
            ("department", data.department.is_some()),
            ("notes", data.notes.is_some()),
            ("updated_at", true),
        ]);

        let updated: Option<Requisition> = self
            .base
            .db()
            .query(format!(
                "UPDATE $thing SET {sets} WHERE status = 'pending' RETURN AFTER"
            ))
            .bind(("thing", thing))
            .bind(("request_type", data.request_type))
            .bind(("amount", amount))
            .bind(("amount_in_words", amount_in_words))
            .bind(("currency", data.currency))
            .bind(("payable_to", data.payable_to))
            .bind(("concept", data.concept))
            .bind(("request_date", data.request_date))
            .bind(("department", data.department))
            .bind(("notes", data.notes))
            .bind(("updated_at", now_millis()))
            .await?
            .take(0)?;

        match updated {
            Some(item) => self.populated(item).await.map(Some),
            None => Ok(None),
        }
    }

    /// pending -> approved | rejected; `None` if missing or already processed
    pub async fn approve(
        &self,
        id: &str,
        approved: bool,
        approver: RecordId,
        notes: Option<String>,
    ) -> RepoResult<Option<Requisition>> {
        let thing = parse_record_id(TABLE, id)?;
        let status = if approved {
            RequisitionStatus::Approved
        } else {
            RequisitionStatus::Rejected
        };
        let sets = set_clause(&[
            ("status", true),
            ("approved_by", true),
            ("approval_date", true),
            ("notes", notes.is_some()),
            ("updated_at", true),
        ]);
        let now = now_millis();

        let updated: Option<Requisition> = self
            .base
            .db()
            .query(format!(
                "UPDATE $thing SET {sets} WHERE status = 'pending' RETURN AFTER"
            ))
            .bind(("thing", thing))
            .bind(("status", status))
            .bind(("approved_by", approver))
            .bind(("approval_date", now))
            .bind(("notes", notes))
            .bind(("updated_at", now))
            .await?
            .take(0)?;

        match updated {
            Some(item) => self.populated(item).await.map(Some),
            None => Ok(None),
        }
    }

    /// approved -> completed; `None` if missing or not approved
    pub async fn complete(&self, id: &str) -> RepoResult<Option<Requisition>> {
        let thing = parse_record_id(TABLE, id)?;
        let updated: Option<Requisition> = self
            .base
            .db()
            .query(
                "UPDATE $thing SET status = $status, updated_at = $now \
                 WHERE status = 'approved' RETURN AFTER",
            )
            .bind(("thing", thing))
            .bind(("status", RequisitionStatus::Completed))
            .bind(("now", now_millis()))
            .await?
            .take(0)?;

        match updated {
            Some(item) => self.populated(item).await.map(Some),
            None => Ok(None),
        }
    }

    /// Delete a pending or rejected requisition; `None` if missing or not deletable
    pub async fn delete(&self, id: &str) -> RepoResult<Option<Requisition>> {
        let thing = parse_record_id(TABLE, id)?;
        let deleted: Option<Requisition> = self
            .base
            .db()
            .query("DELETE $thing WHERE status IN ['pending', 'rejected'] RETURN BEFORE")
            .bind(("thing", thing))
            .await?
            .take(0)?;
        Ok(deleted)
    }

    pub async fn stats(&self, month_start: i64) -> RepoResult<RequisitionStats> {
        let mut result = self
            .base
            .db()
            .query(
                r#"
                SELECT count() AS total FROM requisition GROUP ALL;
                SELECT status AS name, count() AS count FROM requisition GROUP BY name;
                SELECT request_type AS name, count() AS count FROM requisition GROUP BY name;
                SELECT count() AS total FROM requisition
                    WHERE created_at >= $month_start GROUP ALL;
                SELECT VALUE amount FROM requisition WHERE status IN ['approved', 'completed'];
                "#,
            )
            .bind(("month_start", month_start))
            .await?;

        let total: Vec<CountRow> = result.take(0)?;
        let by_status = to_breakdown(result.take::<Vec<GroupCount>>(1)?);
        let by_type = to_breakdown(result.take::<Vec<GroupCount>>(2)?);
        let this_month: Vec<CountRow> = result.take(3)?;
        let amounts: Vec<f64> = result.take(4)?;
        let status_count = |s: RequisitionStatus| by_status.get(s.as_str()).copied().unwrap_or(0);

        Ok(RequisitionStats {
            total: count_of(total),
            pending: status_count(RequisitionStatus::Pending),
            approved: status_count(RequisitionStatus::Approved),
            this_month: count_of(this_month),
            total_amount: sum_money(amounts),
            by_type,
            by_status,
        })
    }
}
