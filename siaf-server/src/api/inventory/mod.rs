//! Inventory API Module (assets and categories)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/inventory", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/stats", get(handler::stats))
        .route("/categories", get(handler::list_categories))
        .route("/{id}", get(handler::get_by_id))
        .route_layer(middleware::from_fn(require_permission("inventory:read")));

    let write_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update))
        .route_layer(middleware::from_fn(require_permission("inventory:write")));

    let delete_routes = Router::new()
        .route("/{id}", axum::routing::delete(handler::delete))
        .route_layer(middleware::from_fn(require_permission("inventory:delete")));

    let category_routes = Router::new()
        .route("/categories", post(handler::create_category))
        .route_layer(middleware::from_fn(require_permission("categories:manage")));

    read_routes
        .merge(write_routes)
        .merge(delete_routes)
        .merge(category_routes)
}
