//! 奖励服务错误类型
//!
//! 定义服务层的业务错误和系统错误

use thiserror::Error;
use uuid::Uuid;

/// 奖励服务错误类型
#[derive(Debug, Error)]
pub enum RewardError {
    // === 奖励相关错误 ===
    #[error("奖励不存在或已处理: {0}")]
    RewardNotFoundOrProcessed(Uuid),

    #[error("奖励不存在: {0}")]
    RewardNotFound(Uuid),

    #[error("无效的奖励参数: {0}")]
    InvalidInput(String),

    // === 许可证相关错误 ===
    #[error("没有可用的许可证: product={0}")]
    NoLicenseAvailable(String),

    #[error("许可证密钥已存在: {0}")]
    DuplicateLicenseKey(String),

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
}

/// 奖励服务 Result 类型别名
pub type Result<T> = std::result::Result<T, RewardError>;

impl RewardError {
    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(self, Self::Database(_))
    }

    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::RewardNotFoundOrProcessed(_) => "REWARD_NOT_FOUND_OR_PROCESSED",
            Self::RewardNotFound(_) => "REWARD_NOT_FOUND",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::NoLicenseAvailable(_) => "NO_LICENSE_AVAILABLE",
            Self::DuplicateLicenseKey(_) => "DUPLICATE_LICENSE_KEY",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_business_error() {
        assert!(RewardError::RewardNotFoundOrProcessed(Uuid::nil()).is_business_error());
        assert!(RewardError::NoLicenseAvailable("Komplete".to_string()).is_business_error());
        assert!(RewardError::DuplicateLicenseKey("KEY-1".to_string()).is_business_error());
        assert!(!RewardError::Database(sqlx::Error::PoolClosed).is_business_error());
    }

    #[test]
    fn test_error_code() {
        assert_eq!(
            RewardError::RewardNotFoundOrProcessed(Uuid::nil()).error_code(),
            "REWARD_NOT_FOUND_OR_PROCESSED"
        );
        assert_eq!(
            RewardError::NoLicenseAvailable("Komplete".to_string()).error_code(),
            "NO_LICENSE_AVAILABLE"
        );
        assert_eq!(
            RewardError::InvalidInput("title 不能为空".to_string()).error_code(),
            "INVALID_INPUT"
        );
    }

    #[test]
    fn test_error_display() {
        let err = RewardError::NoLicenseAvailable("Maschine".to_string());
        assert!(err.to_string().contains("Maschine"));

        let err = RewardError::DuplicateLicenseKey("NI-ABC-123".to_string());
        assert!(err.to_string().contains("NI-ABC-123"));
    }
}
