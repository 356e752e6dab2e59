//! 运营看板统计处理器

use axum::{Json, extract::State};

use crate::dto::{ApiResponse, StatsOverview};
use crate::error::Result;
use crate::state::AppState;

/// 看板总览：待审批奖励数、奖励总数、许可证库存
pub async fn overview(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StatsOverview>>> {
    let stats = state.reward_service.get_stats().await?;

    Ok(Json(ApiResponse::success(StatsOverview {
        pending_rewards: stats.pending_rewards,
        total_rewards: stats.total_rewards,
        available_licenses: stats.available_licenses,
        assigned_licenses: stats.assigned_licenses,
    })))
}
