//! Database Module
//!
//! Embedded SurrealDB (RocksDB engine), schema definitions and first-run seeding.

pub mod models;
pub mod repository;
pub mod seed;

use std::path::Path;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use crate::utils::{AppError, AppResult};

pub const NAMESPACE: &str = "siaf";
pub const DATABASE: &str = "siaf";

/// Tables and unique indexes, applied on every start
///
/// Uniqueness of the optional `user.email` is enforced by the repository.
const SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
DEFINE INDEX IF NOT EXISTS user_username ON user FIELDS username UNIQUE;

DEFINE TABLE IF NOT EXISTS asset_category SCHEMALESS;
DEFINE INDEX IF NOT EXISTS asset_category_name ON asset_category FIELDS name UNIQUE;

DEFINE TABLE IF NOT EXISTS asset SCHEMALESS;
DEFINE INDEX IF NOT EXISTS asset_code ON asset FIELDS asset_code UNIQUE;
DEFINE INDEX IF NOT EXISTS asset_status ON asset FIELDS status;

DEFINE TABLE IF NOT EXISTS incident SCHEMALESS;
DEFINE INDEX IF NOT EXISTS incident_code ON incident FIELDS incident_code UNIQUE;

DEFINE TABLE IF NOT EXISTS maintenance SCHEMALESS;
DEFINE INDEX IF NOT EXISTS maintenance_code ON maintenance FIELDS maintenance_code UNIQUE;
DEFINE INDEX IF NOT EXISTS maintenance_scheduled ON maintenance FIELDS scheduled_date;

DEFINE TABLE IF NOT EXISTS responsive_form SCHEMALESS;
DEFINE INDEX IF NOT EXISTS responsive_form_code ON responsive_form FIELDS form_code UNIQUE;

DEFINE TABLE IF NOT EXISTS requisition SCHEMALESS;
DEFINE INDEX IF NOT EXISTS requisition_code ON requisition FIELDS requisition_code UNIQUE;

DEFINE TABLE IF NOT EXISTS client SCHEMALESS;
DEFINE INDEX IF NOT EXISTS client_name ON client FIELDS name UNIQUE;

DEFINE TABLE IF NOT EXISTS audit_log SCHEMALESS PERMISSIONS FOR update, delete NONE;
DEFINE INDEX IF NOT EXISTS audit_log_sequence ON audit_log FIELDS sequence UNIQUE;
"#;

/// Database service - owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the database at `path` and apply the schema
    pub async fn open(path: &Path) -> AppResult<Self> {
        let db = Surreal::new::<RocksDb>(path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select database: {e}")))?;

        tracing::info!(path = %path.display(), "Database connection established (SurrealDB RocksDB)");

        apply_schema(&db).await?;
        Ok(Self { db })
    }
}

/// Define tables and indexes (idempotent)
pub async fn apply_schema(db: &Surreal<Db>) -> AppResult<()> {
    db.query(SCHEMA)
        .await
        .and_then(|response| response.check())
        .map_err(|e| AppError::database(format!("Failed to apply schema: {e}")))?;
    tracing::info!("Database schema applied");
    Ok(())
}
