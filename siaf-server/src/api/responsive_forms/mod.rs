//! Responsive Form API Module (custody transfers)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/responsive-forms", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/pending/approval", get(handler::pending))
        .route("/stats/overview", get(handler::stats))
        .route("/asset/{asset_id}/history", get(handler::history))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/pdf", get(handler::pdf))
        .route_layer(middleware::from_fn(require_permission(
            "responsive_forms:read",
        )));

    let write_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}/approve", put(handler::approve))
        .route_layer(middleware::from_fn(require_permission(
            "responsive_forms:write",
        )));

    read_routes.merge(write_routes)
}
