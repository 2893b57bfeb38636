//! Repository Module
//!
//! CRUD and aggregate queries over the SurrealDB tables.

// Auth
pub mod user;

// Inventory
pub mod asset;
pub mod category;
pub mod client;

// Operations
pub mod incident;
pub mod maintenance;
pub mod responsive_form;

// Requisitions
pub mod requisition;

// Reports
pub mod report;

// Re-exports
pub use asset::AssetRepository;
pub use category::CategoryRepository;
pub use client::ClientRepository;
pub use incident::IncidentRepository;
pub use maintenance::MaintenanceRepository;
pub use report::ReportRepository;
pub use requisition::RequisitionRepository;
pub use responsive_form::ResponsiveFormRepository;
pub use user::UserRepository;

use std::collections::BTreeMap;

use serde::Deserialize;
use shared::{AppError, ErrorCode};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID convention: every id crosses the API as a "table:key" string
// =============================================================================
//
//   - parse:  parse_record_id("asset", "asset:abc")?
//   - bind:   .bind(("thing", record_id)) and `UPDATE $thing ...`
//   - output: serde_helpers::option_record_id renders it back to "table:key"

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }

    /// Whether a record exists
    pub async fn exists(&self, thing: &RecordId) -> RepoResult<bool> {
        let ids: Vec<RecordId> = self
            .db
            .query("SELECT VALUE id FROM $thing")
            .bind(("thing", thing.clone()))
            .await?
            .take(0)?;
        Ok(!ids.is_empty())
    }

    /// Generate a document code that is not used yet in `table.field`
    ///
    /// The unique index on the field still guards against a concurrent insert.
    pub async fn unique_code(
        &self,
        table: &'static str,
        field: &'static str,
        prefix: &str,
    ) -> RepoResult<String> {
        const MAX_ATTEMPTS: usize = 5;
        let sql = format!("SELECT VALUE id FROM {table} WHERE {field} = $code LIMIT 1");
        for _ in 0..MAX_ATTEMPTS {
            let code = shared::util::document_code(prefix);
            let taken: Vec<RecordId> = self
                .db
                .query(sql.clone())
                .bind(("code", code.clone()))
                .await?
                .take(0)?;
            if taken.is_empty() {
                return Ok(code);
            }
        }
        Err(RepoError::Database(format!(
            "Could not generate a unique {prefix} code"
        )))
    }
}

/// Parse a `"table:key"` id and check that it belongs to `table`
pub fn parse_record_id(table: &str, id: &str) -> RepoResult<RecordId> {
    let thing: RecordId = id
        .parse()
        .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
    if thing.table() != table {
        return Err(RepoError::Validation(format!(
            "Invalid ID: {} is not a {} id",
            id, table
        )));
    }
    Ok(thing)
}

/// Optional id from a request, empty strings count as absent
pub fn parse_optional_id(table: &str, id: Option<&str>) -> RepoResult<Option<RecordId>> {
    match id.map(str::trim) {
        Some(id) if !id.is_empty() => parse_record_id(table, id).map(Some),
        _ => Ok(None),
    }
}

/// `SELECT count() AS total ... GROUP ALL` row
#[derive(Debug, Deserialize)]
pub struct CountRow {
    pub total: u64,
}

/// Total of a count query; an empty table yields no row
pub fn count_of(rows: Vec<CountRow>) -> u64 {
    rows.first().map(|r| r.total).unwrap_or(0)
}

/// `SELECT x AS name, count() AS count ... GROUP BY name` row
#[derive(Debug, Deserialize)]
pub struct GroupCount {
    #[serde(default)]
    pub name: Option<String>,
    pub count: u64,
}

/// Label used when the grouped field is empty
pub const UNASSIGNED: &str = "Sin asignar";

/// Group rows to an ordered `name -> count` map
pub fn to_breakdown(rows: Vec<GroupCount>) -> BTreeMap<String, u64> {
    let mut map = BTreeMap::new();
    for row in rows {
        let key = row.name.unwrap_or_else(|| UNASSIGNED.to_string());
        *map.entry(key).or_insert(0) += row.count;
    }
    map
}

/// `WHERE a AND b` from the collected conditions, or nothing
pub fn where_clause(conditions: &[&str]) -> String {
    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}

/// `a = $a, b = $b` for the fields present in an update
///
/// Every field is bound anyway; only the present ones are assigned.
pub fn set_clause(fields: &[(&str, bool)]) -> String {
    fields
        .iter()
        .filter(|(_, present)| *present)
        .map(|(name, _)| format!("{name} = ${name}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_id_checks_table() {
        assert!(parse_record_id("asset", "asset:abc").is_ok());
        assert!(matches!(
            parse_record_id("asset", "user:abc"),
            Err(RepoError::Validation(_))
        ));
        assert!(matches!(
            parse_record_id("asset", "not an id"),
            Err(RepoError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_optional_id_treats_blank_as_none() {
        assert!(parse_optional_id("user", None).unwrap().is_none());
        assert!(parse_optional_id("user", Some("  ")).unwrap().is_none());
        assert!(parse_optional_id("user", Some("user:x")).unwrap().is_some());
    }

    #[test]
    fn test_breakdown_merges_missing_names() {
        let rows = vec![
            GroupCount { name: Some("active".into()), count: 3 },
            GroupCount { name: None, count: 2 },
            GroupCount { name: Some("inactive".into()), count: 1 },
        ];
        let map = to_breakdown(rows);
        assert_eq!(map["active"], 3);
        assert_eq!(map[UNASSIGNED], 2);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_clauses() {
        assert_eq!(where_clause(&[]), "");
        assert_eq!(
            where_clause(&["status = $status", "asset_id = $asset"]),
            "WHERE status = $status AND asset_id = $asset"
        );
        assert_eq!(
            set_clause(&[("name", true), ("brand", false), ("updated_at", true)]),
            "name = $name, updated_at = $updated_at"
        );
    }

    #[test]
    fn test_repo_error_maps_to_http() {
        use http::StatusCode;
        let not_found: AppError = RepoError::NotFound("x".into()).into();
        assert_eq!(not_found.http_status(), StatusCode::NOT_FOUND);
        let dup: AppError = RepoError::Duplicate("x".into()).into();
        assert_eq!(dup.http_status(), StatusCode::CONFLICT);
        let invalid: AppError = RepoError::Validation("x".into()).into();
        assert_eq!(invalid.http_status(), StatusCode::BAD_REQUEST);
        let db: AppError = RepoError::Database("x".into()).into();
        assert_eq!(db.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
