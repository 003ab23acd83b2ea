//! Authentication Handlers
//!
//! Handles registration, login and token introspection

use std::time::Duration;

use axum::{Json, extract::State};

use crate::auth::{CurrentUser, password};
use crate::core::ServerState;
use crate::db::repository::account;
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_PASSWORD_LEN, validate_required_text,
};
use crate::utils::{AppError, AppResponse, AppResult, ok};
use shared::client::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Minimum password length accepted at registration
const MIN_PASSWORD_LEN: usize = 8;

/// POST /api/auth/register - 注册账号并签发令牌
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<AppResponse<LoginResponse>>> {
    validate_required_text(&req.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&req.email, "email", MAX_EMAIL_LEN)?;
    if !req.email.contains('@') {
        return Err(AppError::validation("email is not a valid address"));
    }
    if req.password.len() < MIN_PASSWORD_LEN || req.password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"
        )));
    }

    let password_hash = password::hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;

    let created = account::create(&state.pool, &req.name, &req.email, &password_hash).await?;

    let token = state
        .jwt_service()
        .generate_token(created.id, &created.name, &created.email)
        .map_err(|e| AppError::internal(format!("Token generation failed: {}", e)))?;

    tracing::info!(account_id = created.id, "Account registered");

    Ok(ok(LoginResponse {
        token,
        user: UserInfo {
            id: created.id,
            name: created.name,
            email: created.email,
        },
    }))
}

/// POST /api/auth/login - 登录并签发令牌
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AppResponse<LoginResponse>>> {
    let found = account::find_by_email(&state.pool, &req.email).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent email enumeration
    let Some(found) = found else {
        tracing::warn!(email = %req.email, "Login failed - account not found");
        return Err(AppError::invalid_credentials());
    };

    let password_valid = password::verify_password(&req.password, &found.password_hash)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;
    if !password_valid {
        tracing::warn!(email = %req.email, "Login failed - invalid credentials");
        return Err(AppError::invalid_credentials());
    }

    let token = state
        .jwt_service()
        .generate_token(found.id, &found.name, &found.email)
        .map_err(|e| AppError::internal(format!("Token generation failed: {}", e)))?;

    Ok(ok(LoginResponse {
        token,
        user: UserInfo {
            id: found.id,
            name: found.name,
            email: found.email,
        },
    }))
}

/// GET /api/auth/me - 当前登录账号
pub async fn me(user: CurrentUser) -> AppResult<Json<AppResponse<UserInfo>>> {
    Ok(ok(UserInfo {
        id: user.id,
        name: user.name,
        email: user.email,
    }))
}
