//! Client Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Client, ClientCreate};
use shared::util::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "client";

#[derive(Clone)]
pub struct ClientRepository {
    base: BaseRepository,
}

impl ClientRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Active clients sorted by name
    pub async fn find_active(&self) -> RepoResult<Vec<Client>> {
        let clients: Vec<Client> = self
            .base
            .db()
            .query("SELECT * FROM client WHERE active = true ORDER BY name")
            .await?
            .take(0)?;
        Ok(clients)
    }

    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Client>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM client WHERE name = $name LIMIT 1")
            .bind(("name", name.to_string()))
            .await?;
        let clients: Vec<Client> = result.take(0)?;
        Ok(clients.into_iter().next())
    }

    pub async fn create(&self, data: ClientCreate) -> RepoResult<Client> {
        let name = data.name.trim().to_string();
        if self.find_by_name(&name).await?.is_some() {
            return Err(RepoError::Duplicate(format!("Client '{}' already exists", name)));
        }

        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE client SET
                    name = $name,
                    rfc = $rfc,
                    email = $email,
                    phone = $phone,
                    address = $address,
                    active = true,
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("name", name))
            .bind(("rfc", data.rfc.unwrap_or_default().trim().to_uppercase()))
            .bind(("email", data.email.unwrap_or_default()))
            .bind(("phone", data.phone.unwrap_or_default()))
            .bind(("address", data.address.unwrap_or_default()))
            .bind(("now", now))
            .await?;

        let created: Option<Client> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create client".to_string()))
    }

    /// Hard delete
    pub async fn delete(&self, id: &str) -> RepoResult<Client> {
        let thing = parse_record_id(TABLE, id)?;
        let deleted: Option<Client> = self.base.db().delete(thing).await?;
        deleted.ok_or_else(|| RepoError::NotFound(format!("Client {} not found", id)))
    }
}
