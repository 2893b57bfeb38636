//! Asset Repository

use std::collections::BTreeMap;

use serde::Serialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::maintenance::DAY_MS;
use super::{
    BaseRepository, CountRow, GroupCount, RepoError, RepoResult, count_of, parse_optional_id,
    parse_record_id, set_clause, to_breakdown, where_clause,
};
use crate::db::models::{Asset, AssetFields, AssetFilter, AssetStatus, PageParams};
use shared::PageQuery;
use shared::util::now_millis;

const TABLE: &str = "asset";

/// Asset columns plus populated category and responsible names
const SELECT_POPULATED: &str = "SELECT *, category_id.name AS category_name, \
     responsible_user_id.full_name AS responsible_name";

/// `GET /api/inventory/stats`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetStats {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
    pub by_category: BTreeMap<String, u64>,
    pub expired_warranties: u64,
    pub expiring_warranties: u64,
}

#[derive(Clone)]
pub struct AssetRepository {
    base: BaseRepository,
}

impl AssetRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Filtered page, newest first, with the total match count
    pub async fn find_page(&self, filter: &AssetFilter) -> RepoResult<(Vec<Asset>, u64, PageQuery)> {
        let page = filter.page_query();
        let category = parse_optional_id("asset_category", filter.category.as_deref())?;
        let search = filter
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut conditions = Vec::new();
        if category.is_some() {
            conditions.push("category_id = $category");
        }
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if search.is_some() {
            conditions.push(
                "(string::lowercase(name) CONTAINS $search \
                 OR string::lowercase(asset_code) CONTAINS $search \
                 OR string::lowercase(brand) CONTAINS $search)",
            );
        }
        let where_sql = where_clause(&conditions);

        let sql = format!(
            "SELECT count() AS total FROM asset {where_sql} GROUP ALL; \
             {SELECT_POPULATED} FROM asset {where_sql} ORDER BY created_at DESC LIMIT {} START {};",
            page.limit,
            page.offset()
        );

        let mut result = self
            .base
            .db()
            .query(sql)
            .bind(("category", category))
            .bind(("status", filter.status))
            .bind(("search", search))
            .await?;

        let total: Vec<CountRow> = result.take(0)?;
        let assets: Vec<Asset> = result.take(1)?;
        Ok((assets, count_of(total), page))
    }

    /// Asset with populated references
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Asset>> {
        let thing = parse_record_id(TABLE, id)?;
        self.find_by_record(thing).await
    }

    async fn find_by_record(&self, thing: RecordId) -> RepoResult<Option<Asset>> {
        let assets: Vec<Asset> = self
            .base
            .db()
            .query(format!("{SELECT_POPULATED} FROM $thing"))
            .bind(("thing", thing))
            .await?
            .take(0)?;
        Ok(assets.into_iter().next())
    }

    pub async fn find_by_code(&self, asset_code: &str) -> RepoResult<Option<Asset>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM asset WHERE asset_code = $code LIMIT 1")
            .bind(("code", asset_code.to_string()))
            .await?;
        let assets: Vec<Asset> = result.take(0)?;
        Ok(assets.into_iter().next())
    }

    pub async fn exists(&self, thing: &RecordId) -> RepoResult<bool> {
        self.base.exists(thing).await
    }

    pub async fn create(&self, data: AssetFields) -> RepoResult<Asset> {
        let asset_code = data
            .asset_code
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| RepoError::Validation("asset_code is required".to_string()))?;
        let name = data
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| RepoError::Validation("name is required".to_string()))?;

        if self.find_by_code(&asset_code).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Asset code '{}' already exists",
                asset_code
            )));
        }

        let now = now_millis();
        let created: Option<Asset> = self
            .base
            .db()
            .query(
                r#"CREATE asset SET
                    asset_code = $asset_code,
                    name = $name,
                    description = $description,
                    asset_type = $asset_type,
                    category_id = $category_id,
                    brand = $brand,
                    model = $model,
                    serial_number = $serial_number,
                    purchase_date = $purchase_date,
                    purchase_price = $purchase_price,
                    supplier = $supplier,
                    location = $location,
                    status = $status,
                    responsible_user_id = $responsible_user_id,
                    warranty_expiry = $warranty_expiry,
                    notes = $notes,
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("asset_code", asset_code))
            .bind(("name", name))
            .bind(("description", data.description.unwrap_or_default()))
            .bind(("asset_type", data.asset_type.unwrap_or_default()))
            .bind(("category_id", data.category_id))
            .bind(("brand", data.brand.unwrap_or_default()))
            .bind(("model", data.model.unwrap_or_default()))
            .bind(("serial_number", data.serial_number.unwrap_or_default()))
            .bind(("purchase_date", data.purchase_date))
            .bind(("purchase_price", data.purchase_price.unwrap_or(0.0)))
            .bind(("supplier", data.supplier.unwrap_or_default()))
            .bind(("location", data.location.unwrap_or_default()))
            .bind(("status", data.status.unwrap_or_default()))
            .bind(("responsible_user_id", data.responsible_user_id))
            .bind(("warranty_expiry", data.warranty_expiry))
            .bind(("notes", data.notes.unwrap_or_default()))
            .bind(("now", now))
            .await?
            .take(0)?;

        let created =
            created.ok_or_else(|| RepoError::Database("Failed to create asset".to_string()))?;
        match created.id.clone() {
            Some(thing) => Ok(self.find_by_record(thing).await?.unwrap_or(created)),
            None => Ok(created),
        }
    }

    pub async fn update(&self, id: &str, data: AssetFields) -> RepoResult<Asset> {
        let thing = parse_record_id(TABLE, id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Asset {} not found", id)))?;

        let asset_code = data.asset_code.map(|c| c.trim().to_string());
        if let Some(ref new_code) = asset_code
            && new_code != &existing.asset_code
            && self.find_by_code(new_code).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Asset code '{}' already exists",
                new_code
            )));
        }

        let sets = set_clause(&[
            ("asset_code", asset_code.is_some()),
            ("name", data.name.is_some()),
            ("description", data.description.is_some()),
            ("asset_type", data.asset_type.is_some()),
            ("category_id", data.category_id.is_some()),
            ("brand", data.brand.is_some()),
            ("model", data.model.is_some()),
            ("serial_number", data.serial_number.is_some()),
            ("purchase_date", data.purchase_date.is_some()),
            ("purchase_price", data.purchase_price.is_some()),
            ("supplier", data.supplier.is_some()),
            ("location", data.location.is_some()),
            ("status", data.status.is_some()),
            ("responsible_user_id", data.responsible_user_id.is_some()),
            ("warranty_expiry", data.warranty_expiry.is_some()),
            ("notes", data.notes.is_some()),
            ("updated_at", true),
        ]);

        self.base
            .db()
            .query(format!("UPDATE $thing SET {sets}"))
            .bind(("thing", thing.clone()))
            .bind(("asset_code", asset_code))
            .bind(("name", data.name))
            .bind(("description", data.description))
            .bind(("asset_type", data.asset_type))
            .bind(("category_id", data.category_id))
            .bind(("brand", data.brand))
            .bind(("model", data.model))
            .bind(("serial_number", data.serial_number))
            .bind(("purchase_date", data.purchase_date))
            .bind(("purchase_price", data.purchase_price))
            .bind(("supplier", data.supplier))
            .bind(("location", data.location))
            .bind(("status", data.status))
            .bind(("responsible_user_id", data.responsible_user_id))
            .bind(("warranty_expiry", data.warranty_expiry))
            .bind(("notes", data.notes))
            .bind(("updated_at", now_millis()))
            .await?
            .check()?;

        self.find_by_record(thing)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Asset {} not found", id)))
    }

    /// Soft delete: the asset stays, marked `inactive`
    pub async fn deactivate(&self, id: &str) -> RepoResult<Asset> {
        let thing = parse_record_id(TABLE, id)?;
        let updated: Option<Asset> = self
            .base
            .db()
            .query("UPDATE $thing SET status = $status, updated_at = $now RETURN AFTER")
            .bind(("thing", thing))
            .bind(("status", AssetStatus::Inactive))
            .bind(("now", now_millis()))
            .await?
            .take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Asset {} not found", id)))
    }

    /// Inventory statistics; `inactive` assets are left out of every count
    pub async fn stats(&self, now: i64) -> RepoResult<AssetStats> {
        let mut result = self
            .base
            .db()
            .query(
                r#"
                SELECT count() AS total FROM asset WHERE status != 'inactive' GROUP ALL;
                SELECT status AS name, count() AS count FROM asset
                    WHERE status != 'inactive' GROUP BY name;
                SELECT category_id.name AS name, count() AS count FROM asset
                    WHERE status != 'inactive' GROUP BY name;
                SELECT count() AS total FROM asset
                    WHERE status != 'inactive' AND warranty_expiry != NONE
                    AND warranty_expiry < $now GROUP ALL;
                SELECT count() AS total FROM asset
                    WHERE status != 'inactive' AND warranty_expiry != NONE
                    AND warranty_expiry >= $now AND warranty_expiry <= $soon GROUP ALL;
                "#,
            )
            .bind(("now", now))
            .bind(("soon", now + 30 * DAY_MS))
            .await?;

        let total: Vec<CountRow> = result.take(0)?;
        let by_status: Vec<GroupCount> = result.take(1)?;
        let by_category: Vec<GroupCount> = result.take(2)?;
        let expired: Vec<CountRow> = result.take(3)?;
        let expiring: Vec<CountRow> = result.take(4)?;

        Ok(AssetStats {
            total: count_of(total),
            by_status: to_breakdown(by_status),
            by_category: to_breakdown(by_category),
            expired_warranties: count_of(expired),
            expiring_warranties: count_of(expiring),
        })
    }
}
