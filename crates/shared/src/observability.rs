//! 日志初始化模块
//!
//! 基于 tracing-subscriber 初始化结构化日志，
//! 支持 RUST_LOG 环境变量覆盖配置中的日志级别。

use crate::config::ObservabilityConfig;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// 初始化全局日志订阅器
///
/// 日志级别优先取 RUST_LOG 环境变量，未设置时回退到配置项。
/// `log_format = "json"` 输出结构化 JSON（用于日志采集），
/// 其他值输出人类可读格式（本地开发）。
pub fn init(config: &ObservabilityConfig, service_name: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},sqlx=warn", config.log_level))
    });

    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_current_span(true))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init()?;
    }

    tracing::info!(service = service_name, "Tracing initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent_safe() {
        // 重复初始化返回错误而不是 panic，确保测试环境可多次调用
        let config = ObservabilityConfig::default();
        let first = init(&config, "test-service");
        let second = init(&config, "test-service");
        assert!(first.is_ok() || second.is_err());
    }
}
