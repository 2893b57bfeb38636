//! Database backup service
//!
//! Exports the embedded database as a SurrealQL script into the backups
//! directory of the work dir.

use std::path::PathBuf;

use chrono::Local;
use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::utils::{AppError, AppResult, ErrorCode};

/// A finished backup
#[derive(Debug, Clone, Serialize)]
pub struct BackupInfo {
    pub path: String,
    pub file_name: String,
    pub size_bytes: u64,
    pub created_at: i64,
}

#[derive(Clone)]
pub struct BackupService {
    db: Surreal<Db>,
    /// `{work_dir}/backups`
    backups_dir: PathBuf,
}

impl BackupService {
    pub fn new(db: Surreal<Db>, backups_dir: PathBuf) -> Self {
        Self { db, backups_dir }
    }

    /// `backup_YYYY-MM-DD_HHMMSS.surql`
    pub fn file_name_at(now: chrono::DateTime<Local>) -> String {
        format!("backup_{}.surql", now.format("%Y-%m-%d_%H%M%S"))
    }

    /// Export the whole database
    pub async fn create_backup(&self) -> AppResult<BackupInfo> {
        tokio::fs::create_dir_all(&self.backups_dir)
            .await
            .map_err(|e| backup_failed(format!("Failed to create backups directory: {e}")))?;

        let now = Local::now();
        let file_name = Self::file_name_at(now);
        let path = self.backups_dir.join(&file_name);

        self.db
            .export(&path)
            .await
            .map_err(|e| backup_failed(format!("Database export failed: {e}")))?;

        let size_bytes = tokio::fs::metadata(&path)
            .await
            .map(|m| m.len())
            .map_err(|e| backup_failed(format!("Backup file unreadable: {e}")))?;

        tracing::info!(path = %path.display(), size_bytes, "Database backup created");

        Ok(BackupInfo {
            path: path.display().to_string(),
            file_name,
            size_bytes,
            created_at: now.timestamp_millis(),
        })
    }
}

fn backup_failed(message: String) -> AppError {
    AppError::with_message(ErrorCode::BackupFailed, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_file_name_format() {
        let at = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(
            BackupService::file_name_at(at),
            "backup_2024-03-07_090502.surql"
        );
    }
}
