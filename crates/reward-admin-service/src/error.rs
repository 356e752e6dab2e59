//! B端管理后台错误类型定义
//!
//! 包含所有 admin service 特有的错误类型

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

/// B端管理后台错误类型
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    // 认证错误
    #[error("未授权: {0}")]
    Unauthorized(String),
    #[error("用户名或密码错误")]
    InvalidCredentials,
    #[error("用户已被禁用")]
    UserDisabled,

    // 验证错误
    #[error("参数验证失败: {0}")]
    Validation(String),
    #[error("无效的请求参数: {0}")]
    InvalidInput(String),

    // 资源不存在
    #[error("奖励不存在或已处理: {0}")]
    RewardNotFoundOrProcessed(Uuid),
    #[error("奖励不存在: {0}")]
    RewardNotFound(Uuid),

    // 业务冲突
    #[error("没有可用的许可证: {0}")]
    NoLicenseAvailable(String),
    #[error("许可证密钥已存在: {0}")]
    DuplicateLicenseKey(String),

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl AdminError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::UserDisabled => StatusCode::FORBIDDEN,

            Self::Validation(_) | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,

            Self::RewardNotFoundOrProcessed(_) | Self::RewardNotFound(_) => StatusCode::NOT_FOUND,

            Self::NoLicenseAvailable(_) | Self::DuplicateLicenseKey(_) => StatusCode::CONFLICT,

            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::UserDisabled => "USER_DISABLED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::RewardNotFoundOrProcessed(_) => "REWARD_NOT_FOUND_OR_PROCESSED",
            Self::RewardNotFound(_) => "REWARD_NOT_FOUND",
            Self::NoLicenseAvailable(_) => "NO_LICENSE_AVAILABLE",
            Self::DuplicateLicenseKey(_) => "DUPLICATE_LICENSE_KEY",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志，防止信息泄露
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for AdminError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 从 reward-service 的错误转换
impl From<reward_service::RewardError> for AdminError {
    fn from(err: reward_service::RewardError) -> Self {
        use reward_service::RewardError;
        match err {
            RewardError::RewardNotFoundOrProcessed(id) => Self::RewardNotFoundOrProcessed(id),
            RewardError::RewardNotFound(id) => Self::RewardNotFound(id),
            RewardError::InvalidInput(msg) => Self::InvalidInput(msg),
            RewardError::NoLicenseAvailable(product) => Self::NoLicenseAvailable(product),
            RewardError::DuplicateLicenseKey(key) => Self::DuplicateLicenseKey(key),
            RewardError::Database(e) => Self::Database(e),
        }
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, AdminError>;
