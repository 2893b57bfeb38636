//! Handler helpers: JSON bodies, client metadata and the acting user

use std::convert::Infallible;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, OptionalFromRequest, Request};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use http::request::Parts;
use surrealdb::RecordId;

use crate::audit::{AuditAction, AuditLogRequest};
use crate::auth::CurrentUser;
use crate::auth::rate_limit::client_ip;
use crate::core::ServerState;
use crate::db::repository::{BaseRepository, parse_optional_id, parse_record_id};
use crate::utils::{AppError, AppResult, ErrorCode};

/// JSON body and response
///
/// Same as [`axum::Json`], but a body that fails to parse is answered with a
/// 400 `ApiResponse` instead of axum's plain-text rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

fn body_rejection(rejection: JsonRejection) -> AppError {
    let reason = rejection.body_text();
    tracing::debug!(reason = %reason, "rejected request body");
    let message = match rejection {
        JsonRejection::MissingJsonContentType(_) => "Se esperaba un cuerpo JSON",
        JsonRejection::JsonSyntaxError(_) => "JSON mal formado",
        _ => "Cuerpo de la petición inválido",
    };
    AppError::validation(message).with_detail("body", reason)
}

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = <axum::Json<T> as FromRequest<S>>::from_request(req, state)
            .await
            .map_err(body_rejection)?;
        Ok(Self(value))
    }
}

impl<T, S> OptionalFromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let value = <axum::Json<T> as OptionalFromRequest<S>>::from_request(req, state)
            .await
            .map_err(body_rejection)?;
        Ok(value.map(|axum::Json(v)| Self(v)))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Client address and user agent, recorded with audit entries
#[derive(Debug, Clone, Default)]
pub struct ClientMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl FromRequestParts<ServerState> for ClientMeta {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let ip_address = client_ip(&parts.headers, &parts.extensions, state.config.trusted_proxy)
            .map(|ip| ip.to_string());

        let user_agent = parts
            .headers
            .get(http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        Ok(Self {
            ip_address,
            user_agent,
        })
    }
}

impl ClientMeta {
    /// Audit entry attributed to `user` from this client
    pub fn audit(
        &self,
        user: &CurrentUser,
        action: AuditAction,
        description: impl Into<String>,
    ) -> AuditLogRequest {
        AuditLogRequest::new(action, description)
            .by(user)
            .client(self.ip_address.clone(), self.user_agent.clone())
    }
}

/// Record id of the authenticated user
pub fn user_record(user: &CurrentUser) -> AppResult<RecordId> {
    Ok(parse_record_id("user", &user.id)?)
}

/// Optional `"table:key"` from a payload into a record id
pub fn optional_record(table: &str, id: Option<&str>) -> AppResult<Option<RecordId>> {
    Ok(parse_optional_id(table, id)?)
}

/// Fail with `code` unless the referenced record exists
pub async fn ensure_exists(state: &ServerState, thing: &RecordId, code: ErrorCode) -> AppResult<()> {
    if BaseRepository::new(state.get_db()).exists(thing).await? {
        Ok(())
    } else {
        Err(AppError::new(code))
    }
}

/// [`ensure_exists`] for an optional reference
pub async fn ensure_optional(
    state: &ServerState,
    thing: Option<&RecordId>,
    code: ErrorCode,
) -> AppResult<()> {
    match thing {
        Some(thing) => ensure_exists(state, thing, code).await,
        None => Ok(()),
    }
}

/// `"table:key"` of a stored record, empty when unset
pub fn id_text(id: &Option<RecordId>) -> String {
    id.as_ref().map(ToString::to_string).unwrap_or_default()
}
