//! 奖励平台共享基础设施
//!
//! 提供各服务共用的配置加载、数据库连接池和日志初始化。

pub mod config;
pub mod database;
pub mod observability;

pub use config::{AppConfig, DatabaseConfig, ObservabilityConfig, ServerConfig};
pub use database::Database;
