//! System API Module

mod handler;

use axum::{Router, middleware, routing::post};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/system", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/backup", post(handler::backup))
        .route_layer(middleware::from_fn(require_permission("system:backup")))
}
