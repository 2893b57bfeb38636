//! Authentication and user management routes
//!
//! | Path | Method | Access |
//! |------|--------|--------|
//! | /api/auth/login | POST | public, login rate limit |
//! | /api/auth/register | POST | users:manage |
//! | /api/auth/users | GET | users:manage |
//! | /api/auth/users/{id} | PUT | users:manage |
//! | /api/auth/profile | GET | authenticated |
//! | /api/auth/change-password | PUT | authenticated |
//! | /api/auth/me | GET | authenticated |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    // Public; rate limited by `login_rate_limit` in `build_app`
    let login = Router::new().route("/login", post(handler::login));

    let self_service = Router::new()
        .route("/profile", get(handler::profile))
        .route("/change-password", put(handler::change_password))
        .route("/me", get(handler::me));

    let manage = Router::new()
        .route("/register", post(handler::register))
        .route("/users", get(handler::list_users))
        .route("/users/{id}", put(handler::update_user))
        .route_layer(middleware::from_fn(require_permission("users:manage")));

    login.merge(self_service).merge(manage)
}
