//! 奖励审批相关的 HTTP 处理器

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use reward_service::models::Reward;
use reward_service::service::dto::{
    ApproveRewardRequest, CreateRewardRequest, RejectRewardRequest,
};
use uuid::Uuid;
use validator::Validate;

use super::actor_from;
use crate::auth::Claims;
use crate::dto::{
    ApiResponse, ApproveRewardBody, CreateRewardBody, PageResponse, PaginationParams,
    RejectRewardBody, RewardQueryFilter,
};
use crate::error::Result;
use crate::state::AppState;

/// 创建奖励
pub async fn create_reward(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    Json(body): Json<CreateRewardBody>,
) -> Result<Json<ApiResponse<Reward>>> {
    body.validate()?;
    let actor = actor_from(&claims, &headers)?;

    let reward = state
        .reward_service
        .create_reward(
            &actor,
            CreateRewardRequest {
                user_id: body.user_id,
                reward_type: body.reward_type,
                title: body.title,
                description: body.description,
                value: body.value,
                source_type: body.source_type,
                source_id: body.source_id,
                expires_at: body.expires_at,
                user_notes: body.user_notes,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(reward)))
}

/// 获取奖励详情
pub async fn get_reward(
    State(state): State<AppState>,
    Path(reward_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Reward>>> {
    let reward = state.reward_service.get_reward(reward_id).await?;
    Ok(Json(ApiResponse::success(reward)))
}

/// 分页获取全部奖励（可按状态过滤，新的在前）
pub async fn list_rewards(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<RewardQueryFilter>,
) -> Result<Json<ApiResponse<PageResponse<Reward>>>> {
    let (rewards, total) = state
        .reward_service
        .get_all_rewards(filter.status, pagination.offset(), pagination.limit())
        .await?;

    Ok(Json(ApiResponse::success(PageResponse::new(
        rewards,
        total,
        pagination.page,
        pagination.limit(),
    ))))
}

/// 分页获取待审批奖励（先到先审）
pub async fn list_pending_rewards(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<Reward>>>> {
    let (rewards, total) = state
        .reward_service
        .get_pending_rewards(pagination.offset(), pagination.limit())
        .await?;

    Ok(Json(ApiResponse::success(PageResponse::new(
        rewards,
        total,
        pagination.page,
        pagination.limit(),
    ))))
}

/// 分页获取某用户的奖励（可按状态过滤）
pub async fn list_user_rewards(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<RewardQueryFilter>,
) -> Result<Json<ApiResponse<PageResponse<Reward>>>> {
    let (rewards, total) = state
        .reward_service
        .get_user_rewards(
            user_id,
            filter.status,
            pagination.offset(),
            pagination.limit(),
        )
        .await?;

    Ok(Json(ApiResponse::success(PageResponse::new(
        rewards,
        total,
        pagination.page,
        pagination.limit(),
    ))))
}

/// 审批通过奖励
pub async fn approve_reward(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(reward_id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<ApproveRewardBody>,
) -> Result<Json<ApiResponse<Reward>>> {
    let actor = actor_from(&claims, &headers)?;

    let reward = state
        .reward_service
        .approve_reward(
            reward_id,
            &actor,
            ApproveRewardRequest {
                admin_notes: body.admin_notes,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success_with_message(reward, "审批通过")))
}

/// 审批拒绝奖励
pub async fn reject_reward(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(reward_id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<RejectRewardBody>,
) -> Result<Json<ApiResponse<Reward>>> {
    body.validate()?;
    let actor = actor_from(&claims, &headers)?;

    let reward = state
        .reward_service
        .reject_reward(
            reward_id,
            &actor,
            RejectRewardRequest {
                admin_notes: body.admin_notes,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success_with_message(reward, "已拒绝")))
}
