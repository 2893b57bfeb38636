//! Incident API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/incidents", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/stats/overview", get(handler::stats))
        .route("/{id}", get(handler::get_by_id))
        .route_layer(middleware::from_fn(require_permission("incidents:read")));

    let write_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update))
        .route("/{id}/assign", put(handler::assign))
        .route("/{id}/resolve", put(handler::resolve))
        .route_layer(middleware::from_fn(require_permission("incidents:write")));

    read_routes.merge(write_routes)
}
