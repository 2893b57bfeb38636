//! Asset Category Repository

use super::{BaseRepository, CountRow, RepoError, RepoResult, count_of, parse_record_id};
use crate::db::models::{AssetCategory, AssetCategoryCreate};
use shared::util::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "asset_category";

#[derive(Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All categories sorted by name
    pub async fn find_all(&self) -> RepoResult<Vec<AssetCategory>> {
        let categories: Vec<AssetCategory> = self
            .base
            .db()
            .query("SELECT * FROM asset_category ORDER BY name")
            .await?
            .take(0)?;
        Ok(categories)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<AssetCategory>> {
        let thing = parse_record_id(TABLE, id)?;
        let category: Option<AssetCategory> = self.base.db().select(thing).await?;
        Ok(category)
    }

    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<AssetCategory>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM asset_category WHERE name = $name LIMIT 1")
            .bind(("name", name.to_string()))
            .await?;
        let categories: Vec<AssetCategory> = result.take(0)?;
        Ok(categories.into_iter().next())
    }

    pub async fn count(&self) -> RepoResult<u64> {
        let rows: Vec<CountRow> = self
            .base
            .db()
            .query("SELECT count() AS total FROM asset_category GROUP ALL")
            .await?
            .take(0)?;
        Ok(count_of(rows))
    }

    pub async fn create(&self, data: AssetCategoryCreate) -> RepoResult<AssetCategory> {
        let name = data.name.trim().to_string();
        if self.find_by_name(&name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Category '{}' already exists",
                name
            )));
        }

        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE asset_category SET
                    name = $name,
                    description = $description,
                    active = true,
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("name", name))
            .bind(("description", data.description.unwrap_or_default()))
            .bind(("now", now))
            .await?;

        let created: Option<AssetCategory> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create category".to_string()))
    }
}
