//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    Router,
    routing::{get, post},
};

use crate::{handlers, state::AppState};

/// 构建认证相关的路由
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::get_current_user))
}

/// 构建奖励审批相关的路由
pub fn reward_routes() -> Router<AppState> {
    Router::new()
        .route("/rewards", post(handlers::reward::create_reward))
        .route("/rewards", get(handlers::reward::list_rewards))
        .route(
            "/rewards/pending",
            get(handlers::reward::list_pending_rewards),
        )
        .route("/rewards/{id}", get(handlers::reward::get_reward))
        .route(
            "/rewards/{id}/approve",
            post(handlers::reward::approve_reward),
        )
        .route(
            "/rewards/{id}/reject",
            post(handlers::reward::reject_reward),
        )
        .route(
            "/users/{user_id}/rewards",
            get(handlers::reward::list_user_rewards),
        )
}

/// 构建许可证池相关的路由
pub fn license_routes() -> Router<AppState> {
    Router::new()
        .route("/licenses/import", post(handlers::license::import_licenses))
        .route(
            "/licenses/available",
            get(handlers::license::list_available_licenses),
        )
        .route(
            "/licenses/assigned",
            get(handlers::license::list_assigned_licenses),
        )
}

/// 构建统计相关的路由
pub fn stats_routes() -> Router<AppState> {
    Router::new().route("/stats/overview", get(handlers::stats::overview))
}

/// 组合所有管理后台 API 路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(reward_routes())
        .merge(license_routes())
        .merge(stats_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 路由构造不应 panic（重复路径等错误在构造时触发）
    #[test]
    fn test_api_routes_construct() {
        let _router = api_routes();
    }
}
