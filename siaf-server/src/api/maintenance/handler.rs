//! Maintenance API Handlers

use axum::{
    Extension,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Local;
use serde_json::json;
use shared::PaginatedResponse;
use shared::util::now_millis;

use crate::api::{ClientMeta, Json};
use crate::api::extract::{ensure_optional, id_text, optional_record};
use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    Maintenance, MaintenanceComplete, MaintenanceCreate, MaintenanceFields, MaintenanceFilter,
    MaintenanceUpdate, UpcomingQuery,
};
use crate::db::repository::MaintenanceRepository;
use crate::db::repository::maintenance::MaintenanceStats;
use crate::utils::time::{months_ago_millis, opt_millis};
use crate::utils::{AppError, AppResult, ErrorCode, validate_payload};

/// Window of completed work summed into the cost statistic
const COST_WINDOW_MONTHS: u32 = 12;

async fn require(repo: &MaintenanceRepository, id: &str) -> AppResult<Maintenance> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::MaintenanceNotFound))
}

/// GET /api/maintenance
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<MaintenanceFilter>,
) -> AppResult<Json<PaginatedResponse<Maintenance>>> {
    let (items, total, page) = MaintenanceRepository::new(state.get_db())
        .find_page(&filter)
        .await?;
    Ok(Json(PaginatedResponse::new(items, total, page)))
}

/// GET /api/maintenance/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Maintenance>> {
    let repo = MaintenanceRepository::new(state.get_db());
    Ok(Json(require(&repo, &id).await?))
}

/// POST /api/maintenance
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
    Json(payload): Json<MaintenanceCreate>,
) -> AppResult<(StatusCode, Json<Maintenance>)> {
    validate_payload(&payload)?;

    let asset_id = optional_record("asset", payload.asset_id.as_deref())?;
    let technician_id = optional_record("user", payload.technician_id.as_deref())?;
    ensure_optional(&state, asset_id.as_ref(), ErrorCode::AssetNotFound).await?;
    ensure_optional(&state, technician_id.as_ref(), ErrorCode::UserNotFound).await?;

    let fields = MaintenanceFields {
        asset_id,
        maintenance_type: payload.maintenance_type,
        title: Some(payload.title),
        description: payload.description,
        scheduled_date: Some(payload.scheduled_date.to_millis()?),
        status: None,
        technician_id,
        cost: payload.cost,
        supplier: payload.supplier,
        notes: payload.notes,
    };
    let maintenance = MaintenanceRepository::new(state.get_db())
        .create(fields)
        .await?;

    state
        .audit_service
        .log(
            client
                .audit(&user, AuditAction::MaintenanceCreated, "Mantenimiento programado")
                .details(json!({
                    "maintenance_id": id_text(&maintenance.id),
                    "maintenance_code": &maintenance.maintenance_code,
                    "type": maintenance.maintenance_type,
                })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(maintenance)))
}

/// PUT /api/maintenance/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
    Path(id): Path<String>,
    Json(payload): Json<MaintenanceUpdate>,
) -> AppResult<Json<Maintenance>> {
    validate_payload(&payload)?;

    let repo = MaintenanceRepository::new(state.get_db());
    require(&repo, &id).await?;

    let asset_id = optional_record("asset", payload.asset_id.as_deref())?;
    let technician_id = optional_record("user", payload.technician_id.as_deref())?;
    ensure_optional(&state, asset_id.as_ref(), ErrorCode::AssetNotFound).await?;
    ensure_optional(&state, technician_id.as_ref(), ErrorCode::UserNotFound).await?;

    let fields = MaintenanceFields {
        asset_id,
        maintenance_type: payload.maintenance_type,
        title: payload.title,
        description: payload.description,
        scheduled_date: opt_millis(payload.scheduled_date.as_ref())?,
        status: payload.status,
        technician_id,
        cost: payload.cost,
        supplier: payload.supplier,
        notes: payload.notes,
    };
    let maintenance = repo.update(&id, fields).await?;

    state
        .audit_service
        .log(
            client
                .audit(&user, AuditAction::MaintenanceUpdated, "Mantenimiento actualizado")
                .details(json!({ "maintenance_id": &id, "status": maintenance.status })),
        )
        .await;

    Ok(Json(maintenance))
}

/// PUT /api/maintenance/{id}/start
pub async fn start(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
    Path(id): Path<String>,
) -> AppResult<Json<Maintenance>> {
    let repo = MaintenanceRepository::new(state.get_db());
    let existing = require(&repo, &id).await?;
    if !existing.status.can_start() {
        return Err(AppError::with_message(
            ErrorCode::MaintenanceInvalidTransition,
            format!("No se puede iniciar un mantenimiento en estado '{}'", existing.status),
        ));
    }

    let maintenance = repo.start(&id).await?;

    state
        .audit_service
        .log(
            client
                .audit(&user, AuditAction::MaintenanceStarted, "Mantenimiento iniciado")
                .details(json!({ "maintenance_id": &id })),
        )
        .await;

    Ok(Json(maintenance))
}

/// PUT /api/maintenance/{id}/complete
pub async fn complete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
    Path(id): Path<String>,
    payload: Option<Json<MaintenanceComplete>>,
) -> AppResult<Json<Maintenance>> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    validate_payload(&payload)?;

    let repo = MaintenanceRepository::new(state.get_db());
    let existing = require(&repo, &id).await?;
    if !existing.status.can_complete() {
        return Err(AppError::with_message(
            ErrorCode::MaintenanceInvalidTransition,
            format!("No se puede completar un mantenimiento en estado '{}'", existing.status),
        ));
    }

    let maintenance = repo.complete(&id, payload.notes, payload.cost).await?;

    state
        .audit_service
        .log(
            client
                .audit(&user, AuditAction::MaintenanceCompleted, "Mantenimiento completado")
                .details(json!({ "maintenance_id": &id, "cost": maintenance.cost })),
        )
        .await;

    Ok(Json(maintenance))
}

/// GET /api/maintenance/upcoming/list?days=30
pub async fn upcoming(
    State(state): State<ServerState>,
    Query(query): Query<UpcomingQuery>,
) -> AppResult<Json<Vec<Maintenance>>> {
    let items = MaintenanceRepository::new(state.get_db())
        .upcoming(now_millis(), query.days)
        .await?;
    Ok(Json(items))
}

/// GET /api/maintenance/overdue/list
pub async fn overdue(State(state): State<ServerState>) -> AppResult<Json<Vec<Maintenance>>> {
    let items = MaintenanceRepository::new(state.get_db())
        .overdue(now_millis())
        .await?;
    Ok(Json(items))
}

/// GET /api/maintenance/stats/overview
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<MaintenanceStats>> {
    let cost_since = months_ago_millis(Local::now(), COST_WINDOW_MONTHS);
    let stats = MaintenanceRepository::new(state.get_db())
        .stats(now_millis(), cost_since)
        .await?;
    Ok(Json(stats))
}
