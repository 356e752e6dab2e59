//! 奖励生命周期服务
//!
//! 处理奖励审批流的核心业务逻辑，包括：
//! - 奖励创建（进入 pending 状态）
//! - 审批通过与按类型交付（ni_license 从许可证池原子分配密钥）
//! - 审批拒绝（必须附拒绝原因）
//! - 许可证批量导入（密钥重复整批回滚）
//! - 分页查询（待审批、全量、按用户、许可证池）
//!
//! 所有写操作在单个事务内完成，并在同一事务中追加审计记录；
//! 并发审批通过条件更新裁决，落败方得到"不存在或已处理"错误。

use serde_json::json;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{Result, RewardError};
use crate::models::{AdminAction, NiLicense, Reward, RewardStatus, RewardType};
use crate::repository::{
    AuditRepository, LicenseRepository, NewAdminAction, NewLicense, NewReward, RewardRepository,
};
use crate::service::dto::{
    AdminActor, ApproveRewardRequest, CreateRewardRequest, ImportLicensesRequest,
    RejectRewardRequest,
};

/// 运营看板统计
#[derive(Debug, Clone)]
pub struct RewardStats {
    pub pending_rewards: i64,
    pub total_rewards: i64,
    pub available_licenses: i64,
    pub assigned_licenses: i64,
}

/// 奖励生命周期服务
pub struct RewardService {
    pool: PgPool,
    reward_repo: RewardRepository,
    license_repo: LicenseRepository,
    audit_repo: AuditRepository,
}

impl RewardService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            reward_repo: RewardRepository::new(pool.clone()),
            license_repo: LicenseRepository::new(pool.clone()),
            audit_repo: AuditRepository::new(pool.clone()),
            pool,
        }
    }

    // ==================== 写操作 ====================

    /// 创建奖励
    ///
    /// 新奖励进入 pending 状态等待审批。ni_license 类型的 value
    /// 字段存放产品名称，审批时按此从许可证池分配密钥。
    #[instrument(skip(self, request), fields(user_id = %request.user_id, admin_id = %actor.admin_id))]
    pub async fn create_reward(
        &self,
        actor: &AdminActor,
        request: CreateRewardRequest,
    ) -> Result<Reward> {
        validate_create(&request)?;

        let mut tx = self.pool.begin().await?;

        let reward = RewardRepository::create_in_tx(
            &mut tx,
            &NewReward {
                user_id: request.user_id,
                reward_type: request.reward_type,
                title: request.title,
                description: request.description,
                value: request.value,
                source_type: request.source_type,
                source_id: request.source_id,
                expires_at: request.expires_at,
                user_notes: request.user_notes,
            },
        )
        .await?;

        AuditRepository::insert_in_tx(
            &mut tx,
            &NewAdminAction {
                admin_id: actor.admin_id,
                action: "create_reward".to_string(),
                target_id: Some(reward.id),
                target_type: "reward".to_string(),
                details: Some(json!({
                    "rewardType": reward.reward_type,
                    "title": reward.title,
                    "userId": reward.user_id,
                })),
                ip_address: actor.ip_address.clone(),
                user_agent: actor.user_agent.clone(),
            },
        )
        .await?;

        tx.commit().await?;

        info!(reward_id = %reward.id, "Reward created");
        Ok(reward)
    }

    /// 审批通过奖励
    ///
    /// 条件更新保证同一奖励只能被批准一次，并发审批的落败方
    /// 得到 RewardNotFoundOrProcessed。通过后按类型交付：
    /// - ni_license：从许可证池取最早导入的可用密钥写入 value，
    ///   状态置为 delivered；无库存时整个事务回滚
    /// - badge / points：直接置为 delivered
    /// - custom：停留在 approved，等待线下履约
    #[instrument(skip(self, request), fields(admin_id = %actor.admin_id))]
    pub async fn approve_reward(
        &self,
        reward_id: Uuid,
        actor: &AdminActor,
        request: ApproveRewardRequest,
    ) -> Result<Reward> {
        let mut tx = self.pool.begin().await?;

        let reward = RewardRepository::approve_pending_in_tx(
            &mut tx,
            reward_id,
            actor.admin_id,
            request.admin_notes.as_deref(),
        )
        .await?
        .ok_or(RewardError::RewardNotFoundOrProcessed(reward_id))?;

        let mut assigned_license: Option<NiLicense> = None;

        let reward = match reward.reward_type {
            RewardType::NiLicense => {
                let product_name = reward
                    .value
                    .as_deref()
                    .filter(|v| !v.trim().is_empty())
                    .ok_or_else(|| {
                        RewardError::InvalidInput(format!(
                            "ni_license 奖励缺少产品名称: {}",
                            reward.id
                        ))
                    })?;

                let license = LicenseRepository::claim_available_in_tx(
                    &mut tx,
                    product_name,
                    reward.user_id,
                )
                .await?
                .ok_or_else(|| RewardError::NoLicenseAvailable(product_name.to_string()))?;

                let delivered = RewardRepository::mark_delivered_in_tx(
                    &mut tx,
                    reward.id,
                    Some(&license.license_key),
                )
                .await?;
                assigned_license = Some(license);
                delivered
            }
            RewardType::Badge | RewardType::Points => {
                RewardRepository::mark_delivered_in_tx(&mut tx, reward.id, None).await?
            }
            RewardType::Custom => reward,
        };

        AuditRepository::insert_in_tx(
            &mut tx,
            &NewAdminAction {
                admin_id: actor.admin_id,
                action: "approve_reward".to_string(),
                target_id: Some(reward.id),
                target_type: "reward".to_string(),
                details: Some(json!({
                    "rewardType": reward.reward_type,
                    "finalStatus": reward.status,
                    "licenseId": assigned_license.as_ref().map(|l| l.id),
                })),
                ip_address: actor.ip_address.clone(),
                user_agent: actor.user_agent.clone(),
            },
        )
        .await?;

        tx.commit().await?;

        info!(
            reward_id = %reward.id,
            status = ?reward.status,
            "Reward approved"
        );
        Ok(reward)
    }

    /// 审批拒绝奖励
    ///
    /// 拒绝必须附原因；条件更新保证只有 pending 状态可被拒绝。
    #[instrument(skip(self, request), fields(admin_id = %actor.admin_id))]
    pub async fn reject_reward(
        &self,
        reward_id: Uuid,
        actor: &AdminActor,
        request: RejectRewardRequest,
    ) -> Result<Reward> {
        if request.admin_notes.trim().is_empty() {
            return Err(RewardError::InvalidInput("拒绝原因不能为空".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        let reward = RewardRepository::reject_pending_in_tx(
            &mut tx,
            reward_id,
            actor.admin_id,
            &request.admin_notes,
        )
        .await?
        .ok_or(RewardError::RewardNotFoundOrProcessed(reward_id))?;

        AuditRepository::insert_in_tx(
            &mut tx,
            &NewAdminAction {
                admin_id: actor.admin_id,
                action: "reject_reward".to_string(),
                target_id: Some(reward.id),
                target_type: "reward".to_string(),
                details: Some(json!({ "reason": request.admin_notes })),
                ip_address: actor.ip_address.clone(),
                user_agent: actor.user_agent.clone(),
            },
        )
        .await?;

        tx.commit().await?;

        info!(reward_id = %reward.id, "Reward rejected");
        Ok(reward)
    }

    /// 批量导入许可证
    ///
    /// 同一批次共享 batch_id；任一密钥与库中已有密钥（或批内其他
    /// 密钥）重复时整批回滚。返回批次 ID 和导入数量。
    #[instrument(skip(self, request), fields(admin_id = %actor.admin_id, product = %request.product_name))]
    pub async fn import_licenses(
        &self,
        actor: &AdminActor,
        request: ImportLicensesRequest,
    ) -> Result<(Uuid, usize)> {
        validate_import(&request)?;

        let batch_id = request.batch_id.unwrap_or_else(Uuid::new_v4);
        let mut tx = self.pool.begin().await?;

        for key in &request.license_keys {
            let result = LicenseRepository::insert_in_tx(
                &mut tx,
                &NewLicense {
                    license_key: key.trim().to_string(),
                    product_name: request.product_name.clone(),
                    product_code: request.product_code.clone(),
                    batch_id,
                    imported_by: actor.admin_id,
                },
            )
            .await;

            match result {
                Ok(_) => {}
                Err(err) if is_unique_violation(&err) => {
                    return Err(RewardError::DuplicateLicenseKey(key.clone()));
                }
                Err(err) => return Err(err),
            }
        }

        let count = request.license_keys.len();

        AuditRepository::insert_in_tx(
            &mut tx,
            &NewAdminAction {
                admin_id: actor.admin_id,
                action: "import_licenses".to_string(),
                target_id: Some(batch_id),
                target_type: "license_batch".to_string(),
                details: Some(json!({
                    "productName": request.product_name,
                    "count": count,
                })),
                ip_address: actor.ip_address.clone(),
                user_agent: actor.user_agent.clone(),
            },
        )
        .await?;

        tx.commit().await?;

        info!(%batch_id, count, "Licenses imported");
        Ok((batch_id, count))
    }

    // ==================== 查询 ====================

    /// 获取单个奖励
    pub async fn get_reward(&self, reward_id: Uuid) -> Result<Reward> {
        self.reward_repo
            .get(reward_id)
            .await?
            .ok_or(RewardError::RewardNotFound(reward_id))
    }

    /// 分页获取待审批奖励（先到先审）
    pub async fn get_pending_rewards(&self, offset: i64, limit: i64) -> Result<(Vec<Reward>, i64)> {
        let rewards = self.reward_repo.list_pending(offset, limit).await?;
        let total = self.reward_repo.count_pending().await?;
        Ok((rewards, total))
    }

    /// 分页获取全部奖励（可按状态过滤）
    pub async fn get_all_rewards(
        &self,
        status: Option<RewardStatus>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Reward>, i64)> {
        let rewards = self.reward_repo.list_all(status, offset, limit).await?;
        let total = self.reward_repo.count_all(status).await?;
        Ok((rewards, total))
    }

    /// 分页获取某用户的奖励（可按状态过滤）
    pub async fn get_user_rewards(
        &self,
        user_id: Uuid,
        status: Option<RewardStatus>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Reward>, i64)> {
        let rewards = self
            .reward_repo
            .list_by_user(user_id, status, offset, limit)
            .await?;
        let total = self.reward_repo.count_by_user(user_id, status).await?;
        Ok((rewards, total))
    }

    /// 分页获取可用许可证（可按产品过滤）
    pub async fn get_available_licenses(
        &self,
        product_name: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<NiLicense>, i64)> {
        let licenses = self
            .license_repo
            .list_available(product_name, offset, limit)
            .await?;
        let total = self.license_repo.count_available(product_name).await?;
        Ok((licenses, total))
    }

    /// 分页获取已分配许可证
    pub async fn get_assigned_licenses(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<NiLicense>, i64)> {
        let licenses = self.license_repo.list_assigned(offset, limit).await?;
        let total = self.license_repo.count_assigned().await?;
        Ok((licenses, total))
    }

    /// 获取针对某目标对象的审计记录
    pub async fn get_audit_trail(&self, target_id: Uuid) -> Result<Vec<AdminAction>> {
        self.audit_repo.list_by_target(target_id).await
    }

    /// 运营看板统计
    pub async fn get_stats(&self) -> Result<RewardStats> {
        Ok(RewardStats {
            pending_rewards: self.reward_repo.count_pending().await?,
            total_rewards: self.reward_repo.count_all(None).await?,
            available_licenses: self.license_repo.count_available(None).await?,
            assigned_licenses: self.license_repo.count_assigned().await?,
        })
    }
}

/// 创建奖励的参数校验
fn validate_create(request: &CreateRewardRequest) -> Result<()> {
    if request.title.trim().is_empty() {
        return Err(RewardError::InvalidInput("奖励标题不能为空".to_string()));
    }

    if request.reward_type == RewardType::NiLicense
        && request
            .value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .is_none()
    {
        return Err(RewardError::InvalidInput(
            "ni_license 奖励必须指定产品名称".to_string(),
        ));
    }

    Ok(())
}

/// 许可证导入的参数校验
fn validate_import(request: &ImportLicensesRequest) -> Result<()> {
    if request.product_name.trim().is_empty() {
        return Err(RewardError::InvalidInput("产品名称不能为空".to_string()));
    }

    if request.license_keys.is_empty() {
        return Err(RewardError::InvalidInput("许可证列表不能为空".to_string()));
    }

    if request.license_keys.iter().any(|k| k.trim().is_empty()) {
        return Err(RewardError::InvalidInput("许可证密钥不能为空".to_string()));
    }

    Ok(())
}

/// 判断错误是否为唯一约束冲突
fn is_unique_violation(err: &RewardError) -> bool {
    matches!(
        err,
        RewardError::Database(sqlx::Error::Database(db)) if db.is_unique_violation()
    )
}
