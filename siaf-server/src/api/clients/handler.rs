//! Client Directory API Handlers

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;

use crate::api::{ClientMeta, Json};
use crate::api::extract::id_text;
use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Client, ClientCreate};
use crate::db::repository::{ClientRepository, RepoError};
use crate::utils::{AppError, AppResult, ErrorCode, validate_payload};

/// GET /api/clients
///
/// Active clients sorted by name.
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Client>>> {
    let clients = ClientRepository::new(state.get_db()).find_active().await?;
    Ok(Json(clients))
}

/// POST /api/clients
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
    Json(payload): Json<ClientCreate>,
) -> AppResult<(StatusCode, Json<Client>)> {
    validate_payload(&payload)?;

    let created = ClientRepository::new(state.get_db())
        .create(payload)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => AppError::new(ErrorCode::ClientNameExists),
            other => other.into(),
        })?;

    state
        .audit_service
        .log(
            client
                .audit(&user, AuditAction::ClientCreated, "Cliente creado")
                .details(json!({ "client_id": id_text(&created.id), "name": &created.name })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/clients/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let deleted = ClientRepository::new(state.get_db())
        .delete(&id)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => AppError::new(ErrorCode::ClientNotFound),
            other => other.into(),
        })?;

    state
        .audit_service
        .log(
            client
                .audit(&user, AuditAction::ClientDeleted, "Cliente eliminado")
                .details(json!({ "client_id": &id, "name": &deleted.name })),
        )
        .await;

    Ok(Json(json!({ "message": "Cliente eliminado exitosamente" })))
}
