//! 认证相关的 HTTP 处理器
//!
//! 提供登录和获取当前用户的 API

use axum::{Extension, Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::FromRow;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{Claims, verify_password};
use crate::dto::{AdminUserDto, ApiResponse, CurrentUserResponse, LoginResponse};
use crate::error::{AdminError, Result};
use crate::state::AppState;

/// 登录请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64, message = "用户名长度必须在 1-64 之间"))]
    pub username: String,
    #[validate(length(min = 1, max = 100, message = "密码长度必须在 1-100 之间"))]
    pub password: String,
}

/// 数据库用户记录
#[derive(Debug, FromRow)]
struct AdminUserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    display_name: Option<String>,
    is_admin: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
}

/// 管理员登录
///
/// 校验用户名密码，仅 is_admin 用户可登录管理后台。
/// 用户不存在和密码错误返回同一错误，避免泄露账号是否存在。
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>> {
    request.validate()?;

    let user = sqlx::query_as::<_, AdminUserRow>(
        r#"
        SELECT id, username, email, password_hash, display_name,
               is_admin, is_active, created_at
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(&request.username)
    .fetch_optional(&state.pool)
    .await?;

    let user = match user {
        Some(user) if user.is_admin => user,
        _ => {
            warn!(username = %request.username, "登录失败：用户不存在或无管理权限");
            return Err(AdminError::InvalidCredentials);
        }
    };

    if !user.is_active {
        return Err(AdminError::UserDisabled);
    }

    if !verify_password(&request.password, &user.password_hash)? {
        warn!(username = %request.username, "登录失败：密码错误");
        return Err(AdminError::InvalidCredentials);
    }

    let (token, expires_at) =
        state
            .jwt_manager
            .generate_token(user.id, &user.username, user.display_name.as_deref())?;

    info!(admin_id = %user.id, username = %user.username, "管理员登录成功");

    Ok(Json(ApiResponse::success(LoginResponse {
        token,
        user: AdminUserDto {
            id: user.id,
            username: user.username,
            email: user.email,
            display_name: user.display_name,
            created_at: user.created_at,
        },
        expires_at,
    })))
}

/// 获取当前登录用户信息
pub async fn get_current_user(
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<CurrentUserResponse>>> {
    Ok(Json(ApiResponse::success(CurrentUserResponse {
        id: claims.sub,
        username: claims.username,
        display_name: claims.display_name,
    })))
}
