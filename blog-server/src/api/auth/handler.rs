//! Authentication Handlers
//!
//! Handles registration, login, and current-user lookup.
//! 登录成功后签发的 JWT 是后续所有资源操作的唯一凭证。

use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::User;
use crate::db::repository::{RepoError, UserRepository};
use crate::security_log;
use crate::utils::validation::{
    MAX_PASSWORD_LEN, MAX_USERNAME_LEN, MIN_PASSWORD_LEN, MIN_USERNAME_LEN, validate_text_range,
};
use shared::{ApiResponse, AppError, AppResult};

// Re-use shared DTOs for API consistency
use shared::client::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

fn user_info(user: &User) -> UserInfo {
    UserInfo {
        id: user.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
        username: user.username.clone(),
    }
}

/// Register handler
///
/// 创建用户并返回公开信息 (不含密码哈希)。重名返回 409。
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserInfo>>)> {
    validate_text_range(&req.username, "username", MIN_USERNAME_LEN, MAX_USERNAME_LEN)?;
    validate_text_range(&req.password, "password", MIN_PASSWORD_LEN, MAX_PASSWORD_LEN)?;

    let repo = UserRepository::new(state.get_db());

    let hashed = User::hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;

    let user = repo.create(&req.username, &hashed).await.map_err(|e| {
        if matches!(e, RepoError::Duplicate(_)) {
            AppError::username_exists(&req.username)
        } else {
            e.into()
        }
    })?;

    tracing::info!(username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            "User registered",
            user_info(&user),
        )),
    ))
}

/// Login handler
///
/// Authenticates user credentials and returns a JWT token.
///
/// 未知用户和密码错误返回同一错误，并带固定最小延迟，
/// 防止通过响应内容或耗时枚举用户名。
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let repo = UserRepository::new(state.get_db());
    let username = req.username.clone();

    let user = repo.find_by_username(&username).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let user = match user {
        Some(u) => {
            let password_valid = u.verify_password(&req.password).map_err(|e| {
                AppError::internal(format!("Password verification failed: {}", e))
            })?;

            if !password_valid {
                security_log!("WARN", "login_failed", username = username.as_str());
                tracing::warn!(username = %username, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }

            u
        }
        None => {
            security_log!("WARN", "login_failed", username = username.as_str());
            tracing::warn!(username = %username, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    // Generate JWT token
    let jwt_service = state.get_jwt_service();
    let user_id = user.id.as_ref().map(|t| t.to_string()).unwrap_or_default();

    let token = jwt_service
        .generate_token(&user_id, &user.username)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(
        user_id = %user_id,
        username = %user.username,
        "User logged in successfully"
    );

    let response = LoginResponse {
        token,
        user: user_info(&user),
    };

    Ok(Json(ApiResponse::success_with_message(
        "Login successful",
        response,
    )))
}

/// Get current user info
pub async fn me(user: CurrentUser) -> AppResult<Json<ApiResponse<UserInfo>>> {
    Ok(Json(ApiResponse::success(UserInfo {
        id: user.id,
        username: user.username,
    })))
}
