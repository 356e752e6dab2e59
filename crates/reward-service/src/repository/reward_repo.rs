//! 奖励仓储
//!
//! 提供奖励记录的数据访问

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Reward, RewardSourceType, RewardStatus, RewardType};

/// 新建奖励的插入参数
#[derive(Debug, Clone)]
pub struct NewReward {
    pub user_id: Uuid,
    pub reward_type: RewardType,
    pub title: String,
    pub description: Option<String>,
    pub value: Option<String>,
    pub source_type: RewardSourceType,
    pub source_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
    pub user_notes: Option<String>,
}

/// 奖励仓储
pub struct RewardRepository {
    pool: PgPool,
}

impl RewardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 事务内写操作 ====================

    /// 在事务中插入奖励记录
    pub async fn create_in_tx(tx: &mut PgConnection, new: &NewReward) -> Result<Reward> {
        let reward = sqlx::query_as::<_, Reward>(
            r#"
            INSERT INTO rewards (user_id, reward_type, status, title, description, value,
                                 source_type, source_id, expires_at, user_notes,
                                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW(), NOW())
            RETURNING id, user_id, reward_type, status, title, description, value,
                      source_type, source_id, approved_by, approved_at, delivered_at,
                      rejected_at, expires_at, admin_notes, user_notes,
                      created_at, updated_at
            "#,
        )
        .bind(new.user_id)
        .bind(new.reward_type)
        .bind(RewardStatus::Pending)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.value)
        .bind(new.source_type)
        .bind(new.source_id)
        .bind(new.expires_at)
        .bind(&new.user_notes)
        .fetch_one(tx)
        .await?;

        Ok(reward)
    }

    /// 在事务中批准待审批奖励
    ///
    /// 条件更新：仅当奖励仍处于 pending 状态时生效，
    /// 返回 None 表示奖励不存在或已被其他管理员处理。
    pub async fn approve_pending_in_tx(
        tx: &mut PgConnection,
        id: Uuid,
        admin_id: Uuid,
        admin_notes: Option<&str>,
    ) -> Result<Option<Reward>> {
        let reward = sqlx::query_as::<_, Reward>(
            r#"
            UPDATE rewards
            SET status = $3, approved_by = $2, approved_at = NOW(),
                admin_notes = COALESCE($4, admin_notes), updated_at = NOW()
            WHERE id = $1 AND status = $5
            RETURNING id, user_id, reward_type, status, title, description, value,
                      source_type, source_id, approved_by, approved_at, delivered_at,
                      rejected_at, expires_at, admin_notes, user_notes,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(admin_id)
        .bind(RewardStatus::Approved)
        .bind(admin_notes)
        .bind(RewardStatus::Pending)
        .fetch_optional(tx)
        .await?;

        Ok(reward)
    }

    /// 在事务中拒绝待审批奖励
    ///
    /// 条件更新，返回 None 表示奖励不存在或已被处理。
    /// approved_by 记录做出拒绝决定的管理员。
    pub async fn reject_pending_in_tx(
        tx: &mut PgConnection,
        id: Uuid,
        admin_id: Uuid,
        admin_notes: &str,
    ) -> Result<Option<Reward>> {
        let reward = sqlx::query_as::<_, Reward>(
            r#"
            UPDATE rewards
            SET status = $3, approved_by = $2, rejected_at = NOW(),
                admin_notes = $4, updated_at = NOW()
            WHERE id = $1 AND status = $5
            RETURNING id, user_id, reward_type, status, title, description, value,
                      source_type, source_id, approved_by, approved_at, delivered_at,
                      rejected_at, expires_at, admin_notes, user_notes,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(admin_id)
        .bind(RewardStatus::Rejected)
        .bind(admin_notes)
        .bind(RewardStatus::Pending)
        .fetch_optional(tx)
        .await?;

        Ok(reward)
    }

    /// 在事务中将奖励标记为已交付
    ///
    /// value 非空时覆盖原值（ni_license 类型写入分配到的许可证密钥）
    pub async fn mark_delivered_in_tx(
        tx: &mut PgConnection,
        id: Uuid,
        value: Option<&str>,
    ) -> Result<Reward> {
        let reward = sqlx::query_as::<_, Reward>(
            r#"
            UPDATE rewards
            SET status = $2, delivered_at = NOW(),
                value = COALESCE($3, value), updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, reward_type, status, title, description, value,
                      source_type, source_id, approved_by, approved_at, delivered_at,
                      rejected_at, expires_at, admin_notes, user_notes,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(RewardStatus::Delivered)
        .bind(value)
        .fetch_one(tx)
        .await?;

        Ok(reward)
    }

    // ==================== 查询 ====================

    /// 获取单个奖励
    pub async fn get(&self, id: Uuid) -> Result<Option<Reward>> {
        let reward = sqlx::query_as::<_, Reward>(
            r#"
            SELECT id, user_id, reward_type, status, title, description, value,
                   source_type, source_id, approved_by, approved_at, delivered_at,
                   rejected_at, expires_at, admin_notes, user_notes,
                   created_at, updated_at
            FROM rewards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reward)
    }

    /// 分页列出待审批奖励（按创建时间先到先审）
    pub async fn list_pending(&self, offset: i64, limit: i64) -> Result<Vec<Reward>> {
        let rewards = sqlx::query_as::<_, Reward>(
            r#"
            SELECT id, user_id, reward_type, status, title, description, value,
                   source_type, source_id, approved_by, approved_at, delivered_at,
                   rejected_at, expires_at, admin_notes, user_notes,
                   created_at, updated_at
            FROM rewards
            WHERE status = $1
            ORDER BY created_at ASC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(RewardStatus::Pending)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rewards)
    }

    /// 统计待审批奖励数量
    pub async fn count_pending(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM rewards WHERE status = $1
            "#,
        )
        .bind(RewardStatus::Pending)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// 分页列出全部奖励（可按状态过滤，新的在前）
    pub async fn list_all(
        &self,
        status: Option<RewardStatus>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Reward>> {
        let rewards = sqlx::query_as::<_, Reward>(
            r#"
            SELECT id, user_id, reward_type, status, title, description, value,
                   source_type, source_id, approved_by, approved_at, delivered_at,
                   rejected_at, expires_at, admin_notes, user_notes,
                   created_at, updated_at
            FROM rewards
            WHERE ($1::varchar IS NULL OR status = $1)
            ORDER BY created_at DESC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(status)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rewards)
    }

    /// 统计全部奖励数量（可按状态过滤）
    pub async fn count_all(&self, status: Option<RewardStatus>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM rewards
            WHERE ($1::varchar IS NULL OR status = $1)
            "#,
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// 分页列出某用户的奖励（可按状态过滤，新的在前）
    pub async fn list_by_user(
        &self,
        user_id: Uuid,
        status: Option<RewardStatus>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Reward>> {
        let rewards = sqlx::query_as::<_, Reward>(
            r#"
            SELECT id, user_id, reward_type, status, title, description, value,
                   source_type, source_id, approved_by, approved_at, delivered_at,
                   rejected_at, expires_at, admin_notes, user_notes,
                   created_at, updated_at
            FROM rewards
            WHERE user_id = $1
              AND ($2::varchar IS NULL OR status = $2)
            ORDER BY created_at DESC
            OFFSET $3 LIMIT $4
            "#,
        )
        .bind(user_id)
        .bind(status)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rewards)
    }

    /// 统计某用户的奖励数量（可按状态过滤）
    pub async fn count_by_user(&self, user_id: Uuid, status: Option<RewardStatus>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM rewards
            WHERE user_id = $1
              AND ($2::varchar IS NULL OR status = $2)
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
