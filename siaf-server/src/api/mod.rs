//! HTTP API
//!
//! - [`health`] - liveness, public
//! - [`auth`] - login, users, profile
//! - [`inventory`] - assets and categories
//! - [`incidents`] - incident tickets
//! - [`maintenance`] - scheduled and corrective maintenance
//! - [`responsive_forms`] - custody transfer forms
//! - [`requisitions`] - cash requisitions
//! - [`reports`] - dashboard and printable reports
//! - [`clients`] - client directory
//! - [`audit_log`] - audit trail query and verification
//! - [`system`] - database backup

use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::{api_rate_limit, login_rate_limit, require_auth};
use crate::core::ServerState;

pub mod extract;
pub mod logging;

pub mod audit_log;
pub mod auth;
pub mod clients;
pub mod health;
pub mod incidents;
pub mod inventory;
pub mod maintenance;
pub mod reports;
pub mod requisitions;
pub mod responsive_forms;
pub mod system;

pub use extract::{ClientMeta, Json};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// UUID v4 request ids
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Every route, no middleware
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(inventory::router())
        .merge(incidents::router())
        .merge(maintenance::router())
        .merge(responsive_forms::router())
        .merge(requisitions::router())
        .merge(reports::router())
        .merge(clients::router())
        .merge(audit_log::router())
        .merge(system::router())
}

/// Routes plus the full middleware stack
///
/// Used by the HTTP server and by the router-level tests. Request flow,
/// outermost first: CORS, request id, trace, access log, compression,
/// timeout, login rate limit, API rate limit, authentication.
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    build_router()
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            api_rate_limit,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            login_rate_limit,
        ))
        .layer(TimeoutLayer::new(Duration::from_millis(
            state.config.request_timeout_ms,
        )))
        .layer(CompressionLayer::new())
        .layer(axum_middleware::from_fn(logging::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, XRequestId))
        .layer(CorsLayer::permissive())
}
