//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use std::sync::Arc;

use reward_service::RewardService;
use sqlx::PgPool;

use crate::auth::{JwtConfig, JwtManager};
use crate::middleware::RateLimiter;

/// Axum 应用共享状态
///
/// 通过 Clone 在 handler 间共享，重量级成员用 Arc 包裹
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL 连接池
    pub pool: PgPool,
    /// JWT 管理器
    pub jwt_manager: JwtManager,
    /// 奖励生命周期服务
    pub reward_service: Arc<RewardService>,
    /// 每 IP 限流器
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(pool: PgPool, jwt_config: JwtConfig) -> Self {
        Self {
            reward_service: Arc::new(RewardService::new(pool.clone())),
            jwt_manager: JwtManager::new(jwt_config),
            rate_limiter: Arc::new(RateLimiter::default()),
            pool,
        }
    }
}
