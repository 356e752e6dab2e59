//! 奖励管理后台服务（B端）
//!
//! 提供奖励审批、许可证池管理、审计统计等 REST API。

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{AdminError, Result};
pub use state::AppState;
