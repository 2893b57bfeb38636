//! Inventory API Handlers

use axum::{
    Extension,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use shared::PaginatedResponse;

use crate::api::{ClientMeta, Json};
use crate::api::extract::{ensure_optional, optional_record};
use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    Asset, AssetCategory, AssetCategoryCreate, AssetCreate, AssetFields, AssetFilter, AssetUpdate,
};
use crate::db::repository::asset::AssetStats;
use crate::db::repository::{AssetRepository, CategoryRepository, RepoError};
use crate::utils::time::opt_millis;
use crate::utils::{AppError, AppResult, ErrorCode, validate_payload};

/// GET /api/inventory
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<AssetFilter>,
) -> AppResult<Json<PaginatedResponse<Asset>>> {
    let (assets, total, page) = AssetRepository::new(state.get_db())
        .find_page(&filter)
        .await?;
    Ok(Json(PaginatedResponse::new(assets, total, page)))
}

/// GET /api/inventory/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Asset>> {
    let asset = AssetRepository::new(state.get_db())
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AssetNotFound))?;
    Ok(Json(asset))
}

/// Resolve ids and dates, checking that referenced records exist
async fn resolve_fields(state: &ServerState, payload: AssetUpdate) -> AppResult<AssetFields> {
    let category_id = optional_record("asset_category", payload.category_id.as_deref())?;
    let responsible_user_id = optional_record("user", payload.responsible_user_id.as_deref())?;
    ensure_optional(state, category_id.as_ref(), ErrorCode::CategoryNotFound).await?;
    ensure_optional(state, responsible_user_id.as_ref(), ErrorCode::UserNotFound).await?;

    Ok(AssetFields {
        asset_code: payload.asset_code,
        name: payload.name,
        description: payload.description,
        asset_type: payload.asset_type,
        category_id,
        brand: payload.brand,
        model: payload.model,
        serial_number: payload.serial_number,
        purchase_date: opt_millis(payload.purchase_date.as_ref())?,
        purchase_price: payload.purchase_price,
        supplier: payload.supplier,
        location: payload.location,
        status: payload.status,
        responsible_user_id,
        warranty_expiry: opt_millis(payload.warranty_expiry.as_ref())?,
        notes: payload.notes,
    })
}

impl From<AssetCreate> for AssetUpdate {
    fn from(c: AssetCreate) -> Self {
        Self {
            asset_code: Some(c.asset_code),
            name: Some(c.name),
            description: c.description,
            asset_type: c.asset_type,
            category_id: c.category_id,
            brand: c.brand,
            model: c.model,
            serial_number: c.serial_number,
            purchase_date: c.purchase_date,
            purchase_price: c.purchase_price,
            supplier: c.supplier,
            location: c.location,
            status: c.status,
            responsible_user_id: c.responsible_user_id,
            warranty_expiry: c.warranty_expiry,
            notes: c.notes,
        }
    }
}

/// POST /api/inventory
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
    Json(payload): Json<AssetCreate>,
) -> AppResult<(StatusCode, Json<Asset>)> {
    validate_payload(&payload)?;

    let repo = AssetRepository::new(state.get_db());
    if repo.find_by_code(payload.asset_code.trim()).await?.is_some() {
        return Err(AppError::new(ErrorCode::AssetCodeExists));
    }

    let fields = resolve_fields(&state, payload.into()).await?;
    let asset = repo.create(fields).await?;

    state
        .audit_service
        .log(
            client
                .audit(&user, AuditAction::AssetCreated, "Activo creado")
                .details(json!({ "asset_id": asset.id_string(), "asset_code": &asset.asset_code })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(asset)))
}

/// PUT /api/inventory/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
    Path(id): Path<String>,
    Json(payload): Json<AssetUpdate>,
) -> AppResult<Json<Asset>> {
    validate_payload(&payload)?;

    let repo = AssetRepository::new(state.get_db());
    if repo.find_by_id(&id).await?.is_none() {
        return Err(AppError::new(ErrorCode::AssetNotFound));
    }

    let fields = resolve_fields(&state, payload).await?;
    let asset = repo.update(&id, fields).await.map_err(|e| match e {
        RepoError::Duplicate(_) => AppError::new(ErrorCode::AssetCodeExists),
        other => other.into(),
    })?;

    state
        .audit_service
        .log(
            client
                .audit(&user, AuditAction::AssetUpdated, "Activo actualizado")
                .details(json!({ "asset_id": &id })),
        )
        .await;

    Ok(Json(asset))
}

/// DELETE /api/inventory/{id}
///
/// Soft delete: the asset is marked `inactive`.
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let asset = AssetRepository::new(state.get_db())
        .deactivate(&id)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => AppError::new(ErrorCode::AssetNotFound),
            other => other.into(),
        })?;

    state
        .audit_service
        .log(
            client
                .audit(&user, AuditAction::AssetDeactivated, "Activo dado de baja")
                .details(json!({ "asset_id": &id, "asset_code": &asset.asset_code })),
        )
        .await;

    Ok(Json(json!({ "message": "Activo dado de baja exitosamente", "asset": asset })))
}

/// GET /api/inventory/categories
pub async fn list_categories(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<AssetCategory>>> {
    let categories = CategoryRepository::new(state.get_db()).find_all().await?;
    Ok(Json(categories))
}

/// POST /api/inventory/categories (admin)
pub async fn create_category(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
    Json(payload): Json<AssetCategoryCreate>,
) -> AppResult<(StatusCode, Json<AssetCategory>)> {
    validate_payload(&payload)?;

    let repo = CategoryRepository::new(state.get_db());
    if repo.find_by_name(payload.name.trim()).await?.is_some() {
        return Err(AppError::new(ErrorCode::CategoryNameExists));
    }
    let category = repo.create(payload).await?;

    state
        .audit_service
        .log(
            client
                .audit(&user, AuditAction::CategoryCreated, "Categoría creada")
                .details(json!({ "name": &category.name })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/inventory/stats
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<AssetStats>> {
    let stats = AssetRepository::new(state.get_db())
        .stats(shared::util::now_millis())
        .await?;
    Ok(Json(stats))
}
