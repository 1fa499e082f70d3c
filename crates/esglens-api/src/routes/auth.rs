//! # Registration & Login Endpoints
//!
//! Issues HMAC-signed bearer tokens on login. Analysis and compliance
//! routes are not gated behind them — route protection lives client-side
//! in this deployment.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{hash_password, verify_password};
use crate::db;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Public view of a user account — never includes the password hash.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserResponse,
    pub token: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

/// POST /api/auth/register — create a user account.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Missing fields", body = crate::error::ErrorBody),
        (status = 409, description = "Username or email already registered", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let (Some(username), Some(email), Some(password)) = (
        request.username.filter(|v| !v.trim().is_empty()),
        request.email.filter(|v| !v.trim().is_empty()),
        request.password.filter(|v| !v.is_empty()),
    ) else {
        return Err(AppError::Validation("所有字段都是必填项".to_string()));
    };

    if db::users::exists(&state.pool, &username, &email).await? {
        return Err(AppError::Conflict("用户名或电子邮件已被注册".to_string()));
    }

    let password_hash =
        hash_password(&password).map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;

    let user = db::users::create(&state.pool, &username, &email, &password_hash).await?;
    tracing::info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "用户注册成功".to_string(),
            user: UserResponse {
                id: user.id,
                username: user.username,
                email: user.email,
            },
        }),
    ))
}

/// POST /api/auth/login — verify credentials and issue a token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = LoginResponse),
        (status = 400, description = "Missing fields", body = crate::error::ErrorBody),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (Some(username), Some(password)) = (
        request.username.filter(|v| !v.trim().is_empty()),
        request.password.filter(|v| !v.is_empty()),
    ) else {
        return Err(AppError::Validation("用户名和密码是必填项".to_string()));
    };

    let Some(user) = db::users::find_by_username(&state.pool, &username).await? else {
        return Err(AppError::Unauthorized("无效的用户名或密码".to_string()));
    };
    if !verify_password(&password, &user.password_hash) {
        return Err(AppError::Unauthorized("无效的用户名或密码".to_string()));
    }

    let token = state.tokens.issue(user.id, &user.username);
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(LoginResponse {
        message: "登录成功".to_string(),
        user: UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
        },
        token,
    }))
}
