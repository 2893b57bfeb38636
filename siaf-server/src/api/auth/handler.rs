//! Authentication Handlers

use std::time::Duration;

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;

use crate::api::{ClientMeta, Json};
use crate::audit::{AuditAction, AuditLogRequest};
use crate::auth::permissions::{get_default_permissions, is_valid_role};
use crate::auth::{CurrentUser, validate_password, verify_password};
use crate::core::ServerState;
use crate::db::models::{
    ChangePasswordRequest, LoginRequest, LoginResponse, User, UserCreate, UserInfo, UserUpdate,
};
use crate::db::repository::UserRepository;
use crate::security_log;
use crate::utils::{AppError, AppResult, ErrorCode, validate_payload};

/// Every login answer waits this long, found or not
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// POST /api/auth/login
///
/// Accepts a username or an email. Unknown users, wrong passwords and
/// disabled accounts all get the same answer.
pub async fn login(
    State(state): State<ServerState>,
    client: ClientMeta,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    validate_payload(&req)?;
    let login = req.username.trim().to_string();

    let repo = UserRepository::new(state.get_db());
    let user = repo.find_for_login(&login).await?;

    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let user = match user {
        Some(u) if verify_password(&req.password, &u.password_hash) => u,
        found => {
            let reason = if found.is_some() {
                "invalid_password"
            } else {
                "user_not_found"
            };
            state
                .audit_service
                .log(
                    AuditLogRequest::new(AuditAction::LoginFailed, "Intento de login fallido")
                        .username(login.clone())
                        .client(client.ip_address.clone(), client.user_agent.clone())
                        .failed()
                        .details(json!({ "reason": reason })),
                )
                .await;
            security_log!(
                "WARN",
                "login_failed",
                username = login.clone(),
                reason = reason
            );
            return Err(AppError::invalid_credentials());
        }
    };

    let user_id = user.id_string();
    repo.touch_last_login(&user_id).await?;

    let current = current_user(&user);
    let token = state
        .jwt_service
        .generate_token(&current)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    state
        .audit_service
        .log(
            client
                .audit(&current, AuditAction::LoginSuccess, "Inicio de sesión")
                .details(json!({ "role": &user.role })),
        )
        .await;
    security_log!(
        "INFO",
        "login_success",
        user_id = user_id.clone(),
        username = user.username.clone()
    );

    Ok(Json(LoginResponse {
        message: "Login exitoso".to_string(),
        token,
        user: UserInfo::from(&user),
    }))
}

/// Token identity for a stored user
fn current_user(user: &User) -> CurrentUser {
    CurrentUser {
        id: user.id_string(),
        username: user.username.clone(),
        full_name: user.full_name.clone(),
        role: user.role.clone(),
        department: user.department.clone(),
        permissions: get_default_permissions(&user.role),
    }
}

fn check_role(role: Option<&str>) -> AppResult<()> {
    match role {
        Some(role) if !is_valid_role(role) => {
            Err(AppError::validation(format!("Invalid role: {}", role)))
        }
        _ => Ok(()),
    }
}

/// POST /api/auth/register (admin)
pub async fn register(
    State(state): State<ServerState>,
    Extension(admin): Extension<CurrentUser>,
    client: ClientMeta,
    Json(payload): Json<UserCreate>,
) -> AppResult<(StatusCode, Json<User>)> {
    validate_payload(&payload)?;
    validate_password(&payload.password)?;
    check_role(payload.role.as_deref())?;

    let repo = UserRepository::new(state.get_db());
    if repo.find_by_username(&payload.username).await?.is_some() {
        return Err(AppError::new(ErrorCode::UsernameExists));
    }
    if let Some(email) = payload.email.as_deref()
        && repo.find_by_email(email).await?.is_some()
    {
        return Err(AppError::new(ErrorCode::EmailExists));
    }

    let user = repo.create(payload).await?;

    state
        .audit_service
        .log(
            client
                .audit(&admin, AuditAction::UserCreated, "Usuario registrado")
                .details(json!({ "user_id": user.id_string(), "username": &user.username })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/auth/users (admin)
pub async fn list_users(State(state): State<ServerState>) -> AppResult<Json<Vec<User>>> {
    let users = UserRepository::new(state.get_db()).find_all().await?;
    Ok(Json(users))
}

/// PUT /api/auth/users/{id} (admin)
pub async fn update_user(
    State(state): State<ServerState>,
    Extension(admin): Extension<CurrentUser>,
    client: ClientMeta,
    Path(id): Path<String>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<User>> {
    validate_payload(&payload)?;
    check_role(payload.role.as_deref())?;

    let changes = json!({
        "role": payload.role,
        "active": payload.active,
        "department": payload.department,
    });
    let user = UserRepository::new(state.get_db())
        .update(&id, payload)
        .await
        .map_err(|e| match e {
            crate::db::repository::RepoError::NotFound(_) => AppError::new(ErrorCode::UserNotFound),
            other => other.into(),
        })?;

    state
        .audit_service
        .log(
            client
                .audit(&admin, AuditAction::UserUpdated, "Usuario actualizado")
                .details(json!({ "user_id": id, "changes": changes })),
        )
        .await;

    Ok(Json(user))
}

/// GET /api/auth/profile
pub async fn profile(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<User>> {
    let profile = UserRepository::new(state.get_db())
        .find_by_id(&user.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    Ok(Json(profile))
}

/// PUT /api/auth/change-password
pub async fn change_password(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientMeta,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<serde_json::Value>> {
    validate_payload(&payload)?;

    let repo = UserRepository::new(state.get_db());
    let stored = repo
        .find_by_id(&user.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    if !verify_password(&payload.current_password, &stored.password_hash) {
        return Err(AppError::new(ErrorCode::CurrentPasswordIncorrect));
    }
    validate_password(&payload.new_password)?;

    repo.update_password(&user.id, &payload.new_password).await?;

    state
        .audit_service
        .log(client.audit(&user, AuditAction::PasswordChanged, "Contraseña actualizada"))
        .await;

    Ok(Json(json!({ "message": "Contraseña actualizada exitosamente" })))
}

/// GET /api/auth/me
pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<CurrentUser> {
    Json(user)
}
