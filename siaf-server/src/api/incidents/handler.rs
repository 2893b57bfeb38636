//! Incident API Handlers

use axum::{
    Extension,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use shared::PaginatedResponse;

use crate::api::{ClientMeta, Json};
use crate::api::extract::{ensure_exists, ensure_optional, id_text, optional_record, user_record};
use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    Incident, IncidentAssign, IncidentCreate, IncidentFields, IncidentFilter, IncidentResolve,
    IncidentUpdate,
};
use crate::db::repository::IncidentRepository;
use crate::db::repository::incident::IncidentStats;
use crate::utils::time::opt_millis;
use crate::utils::{AppError, AppResult, ErrorCode, validate_payload};

async fn require(repo: &IncidentRepository, id: &str) -> AppResult<Incident> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::IncidentNotFound))
}

/// GET /api/incidents
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<IncidentFilter>,
) -> AppResult<Json<PaginatedResponse<Incident>>> {
    let (incidents, total, page) = IncidentRepository::new(state.get_db())
        .find_page(&filter)
        .await?;
    Ok(Json(PaginatedResponse::new(incidents, total, page)))
}

/// GET /api/incidents/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Incident>> {
    let repo = IncidentRepository::new(state.get_db());
    Ok(Json(require(&repo, &id).await?))
}

/// POST /api/incidents
///
/// The current user is the reporter. A referenced asset must exist.
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
    Json(payload): Json<IncidentCreate>,
) -> AppResult<(StatusCode, Json<Incident>)> {
    validate_payload(&payload)?;

    let asset_id = optional_record("asset", payload.asset_id.as_deref())?;
    let assigned_to = optional_record("user", payload.assigned_to.as_deref())?;
    ensure_optional(&state, asset_id.as_ref(), ErrorCode::AssetNotFound).await?;
    ensure_optional(&state, assigned_to.as_ref(), ErrorCode::UserNotFound).await?;

    let fields = IncidentFields {
        title: Some(payload.title),
        description: Some(payload.description),
        asset_id,
        priority: payload.priority,
        assigned_to,
        reported_date: opt_millis(payload.reported_date.as_ref())?,
        ..Default::default()
    };

    let incident = IncidentRepository::new(state.get_db())
        .create(fields, user_record(&user)?)
        .await?;

    state
        .audit_service
        .log(
            client
                .audit(&user, AuditAction::IncidentCreated, "Incidencia reportada")
                .details(json!({
                    "incident_id": id_text(&incident.id),
                    "incident_code": &incident.incident_code,
                    "priority": incident.priority,
                })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(incident)))
}

/// PUT /api/incidents/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
    Path(id): Path<String>,
    Json(payload): Json<IncidentUpdate>,
) -> AppResult<Json<Incident>> {
    validate_payload(&payload)?;

    let repo = IncidentRepository::new(state.get_db());
    require(&repo, &id).await?;

    let asset_id = optional_record("asset", payload.asset_id.as_deref())?;
    let assigned_to = optional_record("user", payload.assigned_to.as_deref())?;
    ensure_optional(&state, asset_id.as_ref(), ErrorCode::AssetNotFound).await?;
    ensure_optional(&state, assigned_to.as_ref(), ErrorCode::UserNotFound).await?;

    let fields = IncidentFields {
        title: payload.title,
        description: payload.description,
        asset_id,
        priority: payload.priority,
        status: payload.status,
        assigned_to,
        solution: payload.solution,
        reported_date: None,
    };
    let incident = repo.update(&id, fields).await?;

    state
        .audit_service
        .log(
            client
                .audit(&user, AuditAction::IncidentUpdated, "Incidencia actualizada")
                .details(json!({ "incident_id": &id, "status": incident.status })),
        )
        .await;

    Ok(Json(incident))
}

/// PUT /api/incidents/{id}/assign
pub async fn assign(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
    Path(id): Path<String>,
    Json(payload): Json<IncidentAssign>,
) -> AppResult<Json<Incident>> {
    let repo = IncidentRepository::new(state.get_db());
    let existing = require(&repo, &id).await?;
    if existing.status.is_finished() {
        return Err(AppError::new(ErrorCode::IncidentAlreadyClosed));
    }

    let assignee = optional_record("user", Some(payload.assigned_to.as_str()))?
        .ok_or_else(|| AppError::validation("assigned_to is required"))?;
    ensure_exists(&state, &assignee, ErrorCode::UserNotFound).await?;

    let incident = repo.assign(&id, assignee).await?;

    state
        .audit_service
        .log(
            client
                .audit(&user, AuditAction::IncidentAssigned, "Incidencia asignada")
                .details(json!({ "incident_id": &id, "assigned_to": payload.assigned_to })),
        )
        .await;

    Ok(Json(incident))
}

/// PUT /api/incidents/{id}/resolve
pub async fn resolve(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
    Path(id): Path<String>,
    Json(payload): Json<IncidentResolve>,
) -> AppResult<Json<Incident>> {
    let solution = payload.solution.trim().to_string();
    if solution.is_empty() {
        return Err(AppError::new(ErrorCode::SolutionRequired));
    }

    let repo = IncidentRepository::new(state.get_db());
    let existing = require(&repo, &id).await?;
    if existing.status.is_finished() {
        return Err(AppError::new(ErrorCode::IncidentAlreadyClosed));
    }

    let incident = repo.resolve(&id, solution).await?;

    state
        .audit_service
        .log(
            client
                .audit(&user, AuditAction::IncidentResolved, "Incidencia resuelta")
                .details(json!({
                    "incident_id": &id,
                    "resolution_hours": incident.resolution_hours(),
                })),
        )
        .await;

    Ok(Json(incident))
}

/// GET /api/incidents/stats/overview
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<IncidentStats>> {
    let stats = IncidentRepository::new(state.get_db()).stats().await?;
    Ok(Json(stats))
}
