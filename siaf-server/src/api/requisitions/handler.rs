//! Requisition API Handlers
//!
//! Every amount that reaches the database goes through [`priced`], so the
//! stored `amount_in_words` always matches the stored `amount`.

use axum::{
    Extension,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Local;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde_json::json;
use shared::util::round_money;
use shared::{PaginatedResponse, amount_to_words_f64};

use crate::api::{ClientMeta, Json};
use crate::api::extract::{id_text, user_record};
use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::{Config, ServerState};
use crate::db::models::{
    ApprovalRequest, PdfData, Requisition, RequisitionCreate, RequisitionFields,
    RequisitionFilter, RequisitionPdf, RequisitionUpdate,
};
use crate::db::repository::RequisitionRepository;
use crate::db::repository::requisition::RequisitionStats;
use crate::utils::time::{month_start_millis, opt_millis, spanish_long_date};
use crate::utils::{AppError, AppResult, ErrorCode, validate_payload};

/// Rounded amount and its words, checked against the configured ceiling
fn priced(config: &Config, amount: f64) -> AppResult<(f64, String)> {
    let words = amount_to_words_f64(amount)?;
    let rounded = round_money(amount);
    let value = Decimal::from_f64(rounded)
        .ok_or_else(|| AppError::new(ErrorCode::RequisitionAmountInvalid))?;
    if value > config.requisition_max_amount {
        return Err(AppError::with_message(
            ErrorCode::RequisitionAmountExceedsLimit,
            format!(
                "El monto excede el máximo permitido de {}",
                config.requisition_max_amount
            ),
        ));
    }
    Ok((rounded, words))
}

async fn require(repo: &RequisitionRepository, id: &str) -> AppResult<Requisition> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RequisitionNotFound))
}

/// GET /api/requisitions
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<RequisitionFilter>,
) -> AppResult<Json<PaginatedResponse<Requisition>>> {
    let (items, total, page) = RequisitionRepository::new(state.get_db())
        .find_page(&filter)
        .await?;
    Ok(Json(PaginatedResponse::new(items, total, page)))
}

/// GET /api/requisitions/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Requisition>> {
    let repo = RequisitionRepository::new(state.get_db());
    Ok(Json(require(&repo, &id).await?))
}

/// POST /api/requisitions
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
    Json(payload): Json<RequisitionCreate>,
) -> AppResult<(StatusCode, Json<Requisition>)> {
    let (amount, words) = priced(&state.config, payload.amount)?;
    validate_payload(&payload)?;

    let department = payload
        .department
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| state.config.requisition_department.clone());

    let fields = RequisitionFields {
        request_type: Some(payload.request_type),
        amount: Some((amount, words)),
        currency: payload.currency,
        payable_to: Some(payload.payable_to.trim().to_string()),
        concept: Some(payload.concept.trim().to_string()),
        request_date: opt_millis(payload.request_date.as_ref())?,
        department: Some(department),
        notes: payload.notes,
    };

    let requisition = RequisitionRepository::new(state.get_db())
        .create(fields, user_record(&user)?)
        .await?;

    tracing::info!(
        requisition_code = %requisition.requisition_code,
        amount = requisition.amount,
        "Requisition created"
    );
    state
        .audit_service
        .log(
            client
                .audit(&user, AuditAction::RequisitionCreated, "Requisición creada")
                .details(json!({
                    "requisition_id": id_text(&requisition.id),
                    "requisition_code": &requisition.requisition_code,
                    "amount": requisition.amount,
                    "currency": requisition.currency,
                })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(requisition)))
}

/// PUT /api/requisitions/{id}
///
/// Only pending requisitions can change. A new amount brings new words.
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
    Path(id): Path<String>,
    Json(payload): Json<RequisitionUpdate>,
) -> AppResult<Json<Requisition>> {
    let amount = payload
        .amount
        .map(|amount| priced(&state.config, amount))
        .transpose()?;
    validate_payload(&payload)?;

    let repo = RequisitionRepository::new(state.get_db());
    require(&repo, &id).await?;

    let fields = RequisitionFields {
        request_type: payload.request_type,
        amount,
        currency: payload.currency,
        payable_to: payload.payable_to.map(|s| s.trim().to_string()),
        concept: payload.concept.map(|s| s.trim().to_string()),
        request_date: opt_millis(payload.request_date.as_ref())?,
        department: payload.department,
        notes: payload.notes,
    };
    let requisition = repo
        .update_pending(&id, fields)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RequisitionNotPending))?;

    state
        .audit_service
        .log(
            client
                .audit(&user, AuditAction::RequisitionUpdated, "Requisición actualizada")
                .details(json!({ "requisition_id": &id, "amount": requisition.amount })),
        )
        .await;

    Ok(Json(requisition))
}

/// PUT /api/requisitions/{id}/approve
pub async fn approve(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
    Path(id): Path<String>,
    Json(payload): Json<ApprovalRequest>,
) -> AppResult<Json<Requisition>> {
    let requisition = RequisitionRepository::new(state.get_db())
        .approve(&id, payload.approved, user_record(&user)?, payload.notes)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RequisitionAlreadyProcessed))?;

    let (action, description) = if payload.approved {
        (AuditAction::RequisitionApproved, "Requisición aprobada")
    } else {
        (AuditAction::RequisitionRejected, "Requisición rechazada")
    };
    state
        .audit_service
        .log(client.audit(&user, action, description).details(json!({
            "requisition_id": &id,
            "requisition_code": &requisition.requisition_code,
            "amount": requisition.amount,
        })))
        .await;

    Ok(Json(requisition))
}

/// PUT /api/requisitions/{id}/complete
pub async fn complete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
    Path(id): Path<String>,
) -> AppResult<Json<Requisition>> {
    let repo = RequisitionRepository::new(state.get_db());
    require(&repo, &id).await?;

    let requisition = repo
        .complete(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RequisitionNotApproved))?;

    state
        .audit_service
        .log(
            client
                .audit(&user, AuditAction::RequisitionCompleted, "Requisición completada")
                .details(json!({ "requisition_id": &id })),
        )
        .await;

    Ok(Json(requisition))
}

/// DELETE /api/requisitions/{id}
///
/// Pending and rejected requisitions only.
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = RequisitionRepository::new(state.get_db());
    require(&repo, &id).await?;

    let deleted = repo.delete(&id).await?.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::RequisitionNotPending,
            "Solo se pueden eliminar requisiciones pendientes o rechazadas",
        )
    })?;

    state
        .audit_service
        .log(
            client
                .audit(&user, AuditAction::RequisitionDeleted, "Requisición eliminada")
                .details(json!({
                    "requisition_id": &id,
                    "requisition_code": &deleted.requisition_code,
                })),
        )
        .await;

    Ok(Json(json!({ "message": "Requisición eliminada exitosamente" })))
}

/// GET /api/requisitions/{id}/pdf
pub async fn pdf(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<RequisitionPdf>> {
    let repo = RequisitionRepository::new(state.get_db());
    let requisition = require(&repo, &id).await?;
    let pdf_data = PdfData {
        title: requisition.request_type.title(),
        hotel: state.config.company_name.clone(),
        date: spanish_long_date(requisition.request_date),
    };
    Ok(Json(RequisitionPdf {
        requisition,
        pdf_data,
    }))
}

/// GET /api/requisitions/stats/overview
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<RequisitionStats>> {
    let stats = RequisitionRepository::new(state.get_db())
        .stats(month_start_millis(Local::now()))
        .await?;
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::for_testing(std::env::temp_dir().to_string_lossy()).unwrap()
    }

    #[test]
    fn test_priced_rounds_and_spells() {
        let (amount, words) = priced(&config(), 1234.567).unwrap();
        assert_eq!(amount, 1234.57);
        assert_eq!(words, "MIL DOSCIENTOS TREINTA Y CUATRO 57/100 MN");
    }

    #[test]
    fn test_priced_rejects_negative_and_nan() {
        let err = priced(&config(), -5.0).unwrap_err();
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
        assert!(priced(&config(), f64::NAN).is_err());
    }

    #[test]
    fn test_priced_enforces_ceiling() {
        let mut config = config();
        config.requisition_max_amount = Decimal::new(1000, 0);
        assert!(priced(&config, 1000.0).is_ok());
        let err = priced(&config, 1000.01).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequisitionAmountExceedsLimit);
    }
}
