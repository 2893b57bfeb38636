//! Reports API Module

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reports", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/dashboard", get(handler::dashboard))
        .route("/inventory", get(handler::inventory))
        .route("/incidents", get(handler::incidents))
        .route("/maintenance", get(handler::maintenance))
        .route("/responsive-forms", get(handler::responsive_forms))
        .route("/requisitions", get(handler::requisitions))
        .route("/user-activity", get(handler::user_activity))
        .route_layer(middleware::from_fn(require_permission("reports:view")))
}
