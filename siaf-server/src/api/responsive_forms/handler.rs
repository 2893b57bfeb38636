//! Responsive Form API Handlers

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
use crate::api::extract::{ensure_exists, id_text, user_record};
use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    ApprovalRequest, PdfData, ResponsiveForm, ResponsiveFormCreate, ResponsiveFormFilter,
    ResponsiveFormPdf,
};
use crate::db::repository::responsive_form::{NewResponsiveForm, ResponsiveFormStats};
use crate::db::repository::{AssetRepository, ResponsiveFormRepository, parse_record_id};
use crate::utils::time::{month_start_millis, opt_millis, spanish_long_date};
use crate::utils::{AppError, AppResult, ErrorCode, validate_payload};

const PDF_TITLE: &str = "Formato de Responsiva de Equipo";

async fn require(repo: &ResponsiveFormRepository, id: &str) -> AppResult<ResponsiveForm> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ResponsiveFormNotFound))
}

/// GET /api/responsive-forms
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<ResponsiveFormFilter>,
) -> AppResult<Json<PaginatedResponse<ResponsiveForm>>> {
    let (forms, total, page) = ResponsiveFormRepository::new(state.get_db())
        .find_page(&filter)
        .await?;
    Ok(Json(PaginatedResponse::new(forms, total, page)))
}

/// GET /api/responsive-forms/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ResponsiveForm>> {
    let repo = ResponsiveFormRepository::new(state.get_db());
    Ok(Json(require(&repo, &id).await?))
}

/// POST /api/responsive-forms
///
/// The previous responsible is whoever holds the asset right now.
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
    Json(payload): Json<ResponsiveFormCreate>,
) -> AppResult<(StatusCode, Json<ResponsiveForm>)> {
    validate_payload(&payload)?;

    let asset = AssetRepository::new(state.get_db())
        .find_by_id(&payload.asset_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AssetNotFound))?;
    let asset_id = parse_record_id("asset", &payload.asset_id)?;

    let new_responsible_id = parse_record_id("user", &payload.new_responsible_id)?;
    ensure_exists(&state, &new_responsible_id, ErrorCode::UserNotFound).await?;

    let transfer_date = opt_millis(payload.transfer_date.as_ref())?.unwrap_or_else(now_millis);

    let form = ResponsiveFormRepository::new(state.get_db())
        .create(NewResponsiveForm {
            asset_id,
            previous_responsible_id: asset.responsible_user_id.clone(),
            new_responsible_id,
            transfer_date,
            reason: payload.reason.trim().to_string(),
            conditions: payload.conditions.unwrap_or_default(),
            observations: payload.observations.unwrap_or_default(),
        })
        .await?;

    state
        .audit_service
        .log(
            client
                .audit(&user, AuditAction::ResponsiveFormCreated, "Responsiva creada")
                .details(json!({
                    "form_id": id_text(&form.id),
                    "form_code": &form.form_code,
                    "asset_code": &asset.asset_code,
                    "new_responsible_id": payload.new_responsible_id,
                })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(form)))
}

/// PUT /api/responsive-forms/{id}/approve
///
/// Approval hands the asset over to the new responsible.
pub async fn approve(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
    Path(id): Path<String>,
    Json(payload): Json<ApprovalRequest>,
) -> AppResult<Json<ResponsiveForm>> {
    let form = ResponsiveFormRepository::new(state.get_db())
        .approve(&id, payload.approved, user_record(&user)?)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ResponsiveFormAlreadyProcessed))?;

    let (action, description) = if payload.approved {
        (AuditAction::ResponsiveFormApproved, "Responsiva aprobada")
    } else {
        (AuditAction::ResponsiveFormRejected, "Responsiva rechazada")
    };
    state
        .audit_service
        .log(client.audit(&user, action, description).details(json!({
            "form_id": &id,
            "asset_id": id_text(&form.asset_id),
            "notes": payload.notes,
        })))
        .await;

    Ok(Json(form))
}

/// GET /api/responsive-forms/asset/{asset_id}/history
pub async fn history(
    State(state): State<ServerState>,
    Path(asset_id): Path<String>,
) -> AppResult<Json<Vec<ResponsiveForm>>> {
    let asset = parse_record_id("asset", &asset_id)?;
    let forms = ResponsiveFormRepository::new(state.get_db())
        .history(asset)
        .await?;
    Ok(Json(forms))
}

/// GET /api/responsive-forms/pending/approval
pub async fn pending(State(state): State<ServerState>) -> AppResult<Json<Vec<ResponsiveForm>>> {
    let forms = ResponsiveFormRepository::new(state.get_db())
        .pending()
        .await?;
    Ok(Json(forms))
}

/// GET /api/responsive-forms/{id}/pdf
///
/// Data only; the client renders the document.
pub async fn pdf(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ResponsiveFormPdf>> {
    let repo = ResponsiveFormRepository::new(state.get_db());
    let form = require(&repo, &id).await?;
    let pdf_data = PdfData {
        title: PDF_TITLE.to_string(),
        hotel: state.config.company_name.clone(),
        date: spanish_long_date(form.transfer_date),
    };
    Ok(Json(ResponsiveFormPdf { form, pdf_data }))
}

/// GET /api/responsive-forms/stats/overview
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<ResponsiveFormStats>> {
    let stats = ResponsiveFormRepository::new(state.get_db())
        .stats(month_start_millis(Local::now()))
        .await?;
    Ok(Json(stats))
}
