//! Audit Log API Handlers

use axum::{
    Json,
    extract::{Query, State},
};

use crate::audit::types::MAX_AUDIT_LIMIT;
use crate::audit::{AuditChainVerification, AuditListResponse, AuditQuery};
use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/audit-log
///
/// `from` / `to` are Unix millis. `limit` is capped at [`MAX_AUDIT_LIMIT`].
pub async fn list(
    State(state): State<ServerState>,
    Query(mut query): Query<AuditQuery>,
) -> AppResult<Json<AuditListResponse>> {
    query.limit = query.limit.clamp(1, MAX_AUDIT_LIMIT);

    let (items, total) = state.audit_service.query(&query).await?;
    Ok(Json(AuditListResponse {
        items,
        total,
        offset: query.offset,
        limit: query.limit,
    }))
}

/// GET /api/audit-log/verify
pub async fn verify_chain(
    State(state): State<ServerState>,
) -> AppResult<Json<AuditChainVerification>> {
    let verification = state.audit_service.verify_chain().await?;
    if !verification.chain_intact {
        tracing::error!(
            breaks = verification.breaks.len(),
            "Audit chain verification found breaks"
        );
    }
    Ok(Json(verification))
}
