//! Requisition API Module (cash requisitions)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/requisitions", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/stats/overview", get(handler::stats))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/pdf", get(handler::pdf))
        .route_layer(middleware::from_fn(require_permission("requisitions:read")));

    let write_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/approve", put(handler::approve))
        .route("/{id}/complete", put(handler::complete))
        .route_layer(middleware::from_fn(require_permission("requisitions:write")));

    read_routes.merge(write_routes)
}
