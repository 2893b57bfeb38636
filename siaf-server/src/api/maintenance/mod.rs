//! Maintenance API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/maintenance", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/upcoming/list", get(handler::upcoming))
        .route("/overdue/list", get(handler::overdue))
        .route("/stats/overview", get(handler::stats))
        .route("/{id}", get(handler::get_by_id))
        .route_layer(middleware::from_fn(require_permission("maintenance:read")));

    let write_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update))
        .route("/{id}/start", put(handler::start))
        .route("/{id}/complete", put(handler::complete))
        .route_layer(middleware::from_fn(require_permission("maintenance:write")));

    read_routes.merge(write_routes)
}
