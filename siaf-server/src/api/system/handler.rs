//! System API Handlers

use axum::{Extension, Json, extract::State};
use serde_json::json;

use crate::api::ClientMeta;
use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::{BackupInfo, BackupService};
use crate::utils::AppResult;

/// POST /api/system/backup
pub async fn backup(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
) -> AppResult<Json<BackupInfo>> {
    let service = BackupService::new(state.get_db(), state.config.backups_dir());

    let info = match service.create_backup().await {
        Ok(info) => info,
        Err(e) => {
            state
                .audit_service
                .log(
                    client
                        .audit(&user, AuditAction::BackupCreated, "Respaldo fallido")
                        .failed()
                        .details(json!({ "error": e.message })),
                )
                .await;
            return Err(e);
        }
    };

    tracing::info!(path = %info.path, size_bytes = info.size_bytes, "Database backup created");
    state
        .audit_service
        .log(
            client
                .audit(&user, AuditAction::BackupCreated, "Respaldo de base de datos")
                .details(json!({ "path": &info.path, "size_bytes": info.size_bytes })),
        )
        .await;

    Ok(Json(info))
}
