//! RewardService 集成测试
//!
//! 使用真实 PostgreSQL 测试奖励审批流的完整生命周期。
//! 审批与许可证分配通过 sqlx 条件更新和行锁实现，
//! 无法通过纯 mock 覆盖，因此需要集成测试。
//!
//! ## 运行方式
//!
//! ```bash
//! DATABASE_URL=postgres://... \
//!   cargo test --test reward_service_test -- --ignored
//! ```

use reward_service::error::RewardError;
use reward_service::models::{RewardSourceType, RewardStatus, RewardType};
use reward_service::service::dto::{
    AdminActor, ApproveRewardRequest, CreateRewardRequest, ImportLicensesRequest,
    RejectRewardRequest,
};
use reward_service::service::RewardService;
use sqlx::PgPool;
use uuid::Uuid;

// ==================== 辅助函数 ====================

/// 从环境变量读取数据库 URL，未设置则 panic
fn database_url() -> String {
    std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests")
}

async fn connect() -> PgPool {
    PgPool::connect(&database_url()).await.unwrap()
}

/// 插入测试用户（幂等，按用户名去重）
async fn seed_user(pool: &PgPool, username: &str, is_admin: bool) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO users (username, email, password_hash, display_name, is_admin)
        VALUES ($1, $1 || '@integ.test', 'not-a-real-hash', $1, $2)
        ON CONFLICT (username) DO UPDATE SET is_admin = EXCLUDED.is_admin
        RETURNING id
        "#,
    )
    .bind(username)
    .bind(is_admin)
    .fetch_one(pool)
    .await
    .expect("插入测试用户失败")
}

/// 清理与指定用户相关的测试数据，按外键依赖顺序删除
async fn cleanup_test_data(pool: &PgPool, admin_id: Uuid, user_id: Uuid) {
    sqlx::query("DELETE FROM admin_actions WHERE admin_id = $1")
        .bind(admin_id)
        .execute(pool)
        .await
        .ok();

    sqlx::query("DELETE FROM rewards WHERE user_id = $1 OR approved_by = $2")
        .bind(user_id)
        .bind(admin_id)
        .execute(pool)
        .await
        .ok();

    sqlx::query("DELETE FROM ni_licenses WHERE imported_by = $1 OR assigned_to = $2")
        .bind(admin_id)
        .bind(user_id)
        .execute(pool)
        .await
        .ok();
}

/// 构建带 IP / User-Agent 的操作人上下文
fn actor(admin_id: Uuid) -> AdminActor {
    AdminActor {
        admin_id,
        ip_address: Some("203.0.113.7".to_string()),
        user_agent: Some("integ-test/1.0".to_string()),
    }
}

/// 构建创建奖励请求的快捷方法
fn create_request(user_id: Uuid, reward_type: RewardType, title: &str) -> CreateRewardRequest {
    CreateRewardRequest {
        user_id,
        reward_type,
        title: title.to_string(),
        description: Some("集成测试奖励".to_string()),
        value: match reward_type {
            RewardType::NiLicense => Some("Integ Product".to_string()),
            RewardType::Points => Some("500".to_string()),
            _ => None,
        },
        source_type: RewardSourceType::Challenge,
        source_id: None,
        expires_at: None,
        user_notes: None,
    }
}

fn import_request(product: &str, keys: &[&str]) -> ImportLicensesRequest {
    ImportLicensesRequest {
        product_name: product.to_string(),
        product_code: None,
        batch_id: None,
        license_keys: keys.iter().map(|k| k.to_string()).collect(),
    }
}

/// 查询奖励当前状态
async fn reward_status(pool: &PgPool, reward_id: Uuid) -> String {
    sqlx::query_scalar("SELECT status FROM rewards WHERE id = $1")
        .bind(reward_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

// ==================== 测试用例 ====================

/// 创建奖励：进入 pending 状态，且同一事务写入审计记录
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_create_reward_pending_with_audit() {
    let pool = connect().await;
    let admin_id = seed_user(&pool, "integ_create_admin", true).await;
    let user_id = seed_user(&pool, "integ_create_user", false).await;
    cleanup_test_data(&pool, admin_id, user_id).await;

    let svc = RewardService::new(pool.clone());
    let reward = svc
        .create_reward(&actor(admin_id), create_request(user_id, RewardType::Points, "签到积分"))
        .await
        .unwrap();

    assert_eq!(reward.status, RewardStatus::Pending);
    assert_eq!(reward.user_id, user_id);

    let audit = svc.get_audit_trail(reward.id).await.unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, "create_reward");
    assert_eq!(audit[0].admin_id, admin_id);
    assert_eq!(audit[0].ip_address.as_deref(), Some("203.0.113.7"));
    assert_eq!(audit[0].user_agent.as_deref(), Some("integ-test/1.0"));

    cleanup_test_data(&pool, admin_id, user_id).await;
}

/// 审批 ni_license 奖励：分配最早导入的许可证，value 覆盖为密钥，状态 delivered
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_approve_license_reward_assigns_oldest_key() {
    let pool = connect().await;
    let admin_id = seed_user(&pool, "integ_lic_admin", true).await;
    let user_id = seed_user(&pool, "integ_lic_user", false).await;
    cleanup_test_data(&pool, admin_id, user_id).await;

    let svc = RewardService::new(pool.clone());

    // 两个批次先后导入，审批时应取先导入的密钥
    svc.import_licenses(&actor(admin_id), import_request("Integ Product", &["INTEG-OLD-1"]))
        .await
        .unwrap();
    svc.import_licenses(&actor(admin_id), import_request("Integ Product", &["INTEG-NEW-1"]))
        .await
        .unwrap();

    let reward = svc
        .create_reward(
            &actor(admin_id),
            create_request(user_id, RewardType::NiLicense, "冠军许可证"),
        )
        .await
        .unwrap();

    let approved = svc
        .approve_reward(reward.id, &actor(admin_id), ApproveRewardRequest::default())
        .await
        .unwrap();

    assert_eq!(approved.status, RewardStatus::Delivered);
    assert_eq!(approved.value.as_deref(), Some("INTEG-OLD-1"));
    assert_eq!(approved.approved_by, Some(admin_id));
    assert!(approved.approved_at.is_some());
    assert!(approved.delivered_at.is_some());

    // 许可证行应被标记为已分配给该用户
    let (is_assigned, assigned_to): (bool, Option<Uuid>) = sqlx::query_as(
        "SELECT is_assigned, assigned_to FROM ni_licenses WHERE license_key = 'INTEG-OLD-1'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(is_assigned);
    assert_eq!(assigned_to, Some(user_id));

    // 后导入的密钥仍然可用
    let (available, _) = svc
        .get_available_licenses(Some("Integ Product"), 0, 10)
        .await
        .unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].license_key, "INTEG-NEW-1");

    // 审计：create + approve
    let audit = svc.get_audit_trail(reward.id).await.unwrap();
    assert_eq!(audit.len(), 2);
    assert_eq!(audit[1].action, "approve_reward");

    cleanup_test_data(&pool, admin_id, user_id).await;
}

/// 审批 ni_license 但无库存：整个事务回滚，奖励保持 pending
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_approve_without_stock_rolls_back() {
    let pool = connect().await;
    let admin_id = seed_user(&pool, "integ_nostock_admin", true).await;
    let user_id = seed_user(&pool, "integ_nostock_user", false).await;
    cleanup_test_data(&pool, admin_id, user_id).await;

    let svc = RewardService::new(pool.clone());

    let mut request = create_request(user_id, RewardType::NiLicense, "缺货许可证");
    request.value = Some("Integ Missing Product".to_string());
    let reward = svc.create_reward(&actor(admin_id), request).await.unwrap();

    let result = svc
        .approve_reward(reward.id, &actor(admin_id), ApproveRewardRequest::default())
        .await;
    assert!(matches!(result, Err(RewardError::NoLicenseAvailable(p)) if p == "Integ Missing Product"));

    // 条件更新已执行但事务回滚，状态应保持 pending
    assert_eq!(reward_status(&pool, reward.id).await, "pending");

    // 审批的审计记录也应一并回滚，只剩创建记录
    let audit = svc.get_audit_trail(reward.id).await.unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, "create_reward");

    // 回滚后可以再次审批
    svc.import_licenses(
        &actor(admin_id),
        import_request("Integ Missing Product", &["INTEG-LATE-1"]),
    )
    .await
    .unwrap();
    let approved = svc
        .approve_reward(reward.id, &actor(admin_id), ApproveRewardRequest::default())
        .await
        .unwrap();
    assert_eq!(approved.value.as_deref(), Some("INTEG-LATE-1"));

    cleanup_test_data(&pool, admin_id, user_id).await;
}

/// 并发审批同一奖励：恰好一方成功，另一方得到"不存在或已处理"
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_concurrent_approve_single_winner() {
    let pool = connect().await;
    let admin_id = seed_user(&pool, "integ_race_admin", true).await;
    let user_id = seed_user(&pool, "integ_race_user", false).await;
    cleanup_test_data(&pool, admin_id, user_id).await;

    let svc = RewardService::new(pool.clone());
    let reward = svc
        .create_reward(&actor(admin_id), create_request(user_id, RewardType::Badge, "竞速徽章"))
        .await
        .unwrap();

    let approver = actor(admin_id);
    let (first, second) = tokio::join!(
        svc.approve_reward(reward.id, &approver, ApproveRewardRequest::default()),
        svc.approve_reward(reward.id, &approver, ApproveRewardRequest::default()),
    );

    let winners = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "并发审批只能有一方成功");

    let loser = if first.is_err() { first } else { second };
    assert!(matches!(
        loser,
        Err(RewardError::RewardNotFoundOrProcessed(id)) if id == reward.id
    ));

    // 审计：create + 恰好一条 approve
    let audit = svc.get_audit_trail(reward.id).await.unwrap();
    assert_eq!(audit.len(), 2);

    cleanup_test_data(&pool, admin_id, user_id).await;
}

/// 并发审批 ni_license 奖励：一方成功，许可证池恰好减少一条可用许可证
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_concurrent_approve_license_claims_exactly_one() {
    let pool = connect().await;
    let admin_id = seed_user(&pool, "integ_race_lic_admin", true).await;
    let user_id = seed_user(&pool, "integ_race_lic_user", false).await;
    cleanup_test_data(&pool, admin_id, user_id).await;

    let svc = RewardService::new(pool.clone());

    svc.import_licenses(
        &actor(admin_id),
        import_request("Integ Race Product", &["RACE-1", "RACE-2"]),
    )
    .await
    .unwrap();

    let mut request = create_request(user_id, RewardType::NiLicense, "竞速许可证");
    request.value = Some("Integ Race Product".to_string());
    let reward = svc.create_reward(&actor(admin_id), request).await.unwrap();

    let (before, _) = svc
        .get_available_licenses(Some("Integ Race Product"), 0, 10)
        .await
        .unwrap();
    assert_eq!(before.len(), 2);

    let approver = actor(admin_id);
    let (first, second) = tokio::join!(
        svc.approve_reward(reward.id, &approver, ApproveRewardRequest::default()),
        svc.approve_reward(reward.id, &approver, ApproveRewardRequest::default()),
    );

    let winners = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "并发审批只能有一方成功");

    let loser = if first.is_err() { first } else { second };
    assert!(matches!(
        loser,
        Err(RewardError::RewardNotFoundOrProcessed(_))
    ));

    // 落败方的事务整体回滚，许可证池恰好减少一条
    let (after, after_total) = svc
        .get_available_licenses(Some("Integ Race Product"), 0, 10)
        .await
        .unwrap();
    assert_eq!(after_total, 1);
    assert_eq!(after.len(), 1);

    let assigned_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM ni_licenses WHERE assigned_to = $1",
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(assigned_count, 1);

    cleanup_test_data(&pool, admin_id, user_id).await;
}

/// badge / points 审批即交付；custom 停留在 approved
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_approve_dispatch_by_type() {
    let pool = connect().await;
    let admin_id = seed_user(&pool, "integ_dispatch_admin", true).await;
    let user_id = seed_user(&pool, "integ_dispatch_user", false).await;
    cleanup_test_data(&pool, admin_id, user_id).await;

    let svc = RewardService::new(pool.clone());

    let points = svc
        .create_reward(&actor(admin_id), create_request(user_id, RewardType::Points, "积分"))
        .await
        .unwrap();
    let approved = svc
        .approve_reward(points.id, &actor(admin_id), ApproveRewardRequest::default())
        .await
        .unwrap();
    assert_eq!(approved.status, RewardStatus::Delivered);
    // 非 license 类型 value 不被覆盖
    assert_eq!(approved.value.as_deref(), Some("500"));

    let custom = svc
        .create_reward(&actor(admin_id), create_request(user_id, RewardType::Custom, "线下礼包"))
        .await
        .unwrap();
    let approved = svc
        .approve_reward(custom.id, &actor(admin_id), ApproveRewardRequest::default())
        .await
        .unwrap();
    assert_eq!(approved.status, RewardStatus::Approved);
    assert!(approved.delivered_at.is_none());

    cleanup_test_data(&pool, admin_id, user_id).await;
}

/// 拒绝奖励：必须附原因；拒绝后不可再审批
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_reject_reward() {
    let pool = connect().await;
    let admin_id = seed_user(&pool, "integ_reject_admin", true).await;
    let user_id = seed_user(&pool, "integ_reject_user", false).await;
    cleanup_test_data(&pool, admin_id, user_id).await;

    let svc = RewardService::new(pool.clone());
    let reward = svc
        .create_reward(&actor(admin_id), create_request(user_id, RewardType::Badge, "待拒绝"))
        .await
        .unwrap();

    // 空原因直接被校验拦下
    let result = svc
        .reject_reward(
            reward.id,
            &actor(admin_id),
            RejectRewardRequest {
                admin_notes: "  ".to_string(),
            },
        )
        .await;
    assert!(matches!(result, Err(RewardError::InvalidInput(_))));
    assert_eq!(reward_status(&pool, reward.id).await, "pending");

    let rejected = svc
        .reject_reward(
            reward.id,
            &actor(admin_id),
            RejectRewardRequest {
                admin_notes: "不符合活动规则".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(rejected.status, RewardStatus::Rejected);
    assert!(rejected.rejected_at.is_some());
    // approved_by 记录做出决定的管理员，拒绝也不例外
    assert_eq!(rejected.approved_by, Some(admin_id));
    assert_eq!(rejected.admin_notes.as_deref(), Some("不符合活动规则"));

    // 已拒绝的奖励不能再被审批
    let result = svc
        .approve_reward(reward.id, &actor(admin_id), ApproveRewardRequest::default())
        .await;
    assert!(matches!(
        result,
        Err(RewardError::RewardNotFoundOrProcessed(_))
    ));

    cleanup_test_data(&pool, admin_id, user_id).await;
}

/// 导入批次中任一密钥重复，整批回滚
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_import_duplicate_key_rolls_back_batch() {
    let pool = connect().await;
    let admin_id = seed_user(&pool, "integ_dup_admin", true).await;
    let user_id = seed_user(&pool, "integ_dup_user", false).await;
    cleanup_test_data(&pool, admin_id, user_id).await;

    let svc = RewardService::new(pool.clone());

    // 调用方指定的批次 ID 原样落库
    let external_batch = Uuid::new_v4();
    let (batch_id, count) = svc
        .import_licenses(
            &actor(admin_id),
            ImportLicensesRequest {
                batch_id: Some(external_batch),
                ..import_request("Integ Dup", &["DUP-1", "DUP-2"])
            },
        )
        .await
        .unwrap();
    assert_eq!(batch_id, external_batch);
    assert_eq!(count, 2);

    let batch_rows: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM ni_licenses WHERE batch_id = $1")
            .bind(external_batch)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(batch_rows, 2);

    // DUP-1 与已有密钥冲突，DUP-3 不应被导入
    let result = svc
        .import_licenses(&actor(admin_id), import_request("Integ Dup", &["DUP-3", "DUP-1"]))
        .await;
    assert!(matches!(
        result,
        Err(RewardError::DuplicateLicenseKey(key)) if key == "DUP-1"
    ));

    let dup3_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM ni_licenses WHERE license_key = 'DUP-3'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(dup3_count, 0, "重复批次应整批回滚");

    // 批内重复同样整批回滚
    let result = svc
        .import_licenses(&actor(admin_id), import_request("Integ Dup", &["DUP-4", "DUP-4"]))
        .await;
    assert!(matches!(result, Err(RewardError::DuplicateLicenseKey(_))));

    // 首批导入的审计记录存在
    let audit = svc.get_audit_trail(batch_id).await.unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, "import_licenses");
    assert_eq!(audit[0].target_type, "license_batch");

    cleanup_test_data(&pool, admin_id, user_id).await;
}

/// 待审批列表先到先审，全量列表新的在前
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_pending_list_fifo_ordering() {
    let pool = connect().await;
    let admin_id = seed_user(&pool, "integ_page_admin", true).await;
    let user_id = seed_user(&pool, "integ_page_user", false).await;
    cleanup_test_data(&pool, admin_id, user_id).await;

    let svc = RewardService::new(pool.clone());

    let mut created = Vec::new();
    for title in ["第一个", "第二个", "第三个"] {
        let reward = svc
            .create_reward(&actor(admin_id), create_request(user_id, RewardType::Badge, title))
            .await
            .unwrap();
        created.push(reward.id);
    }

    let (pending, total) = svc.get_pending_rewards(0, 100).await.unwrap();
    assert!(total >= 3);
    let ours: Vec<Uuid> = pending
        .iter()
        .filter(|r| r.user_id == user_id)
        .map(|r| r.id)
        .collect();
    assert_eq!(ours, created, "待审批列表应按创建时间先到先审");

    // 用户维度列表新的在前
    let (user_rewards, user_total) = svc.get_user_rewards(user_id, None, 0, 100).await.unwrap();
    assert_eq!(user_total, 3);
    let ids: Vec<Uuid> = user_rewards.iter().map(|r| r.id).collect();
    let reversed: Vec<Uuid> = created.iter().rev().copied().collect();
    assert_eq!(ids, reversed);

    // 状态过滤
    svc.approve_reward(created[0], &actor(admin_id), ApproveRewardRequest::default())
        .await
        .unwrap();
    let (delivered, _) = svc
        .get_all_rewards(Some(RewardStatus::Delivered), 0, 100)
        .await
        .unwrap();
    assert!(delivered.iter().any(|r| r.id == created[0]));
    assert!(delivered.iter().all(|r| r.status == RewardStatus::Delivered));

    // 用户维度的状态过滤只剩未审批的两个
    let (still_pending, pending_total) = svc
        .get_user_rewards(user_id, Some(RewardStatus::Pending), 0, 100)
        .await
        .unwrap();
    assert_eq!(pending_total, 2);
    assert!(still_pending.iter().all(|r| r.status == RewardStatus::Pending));

    cleanup_test_data(&pool, admin_id, user_id).await;
}

/// 看板统计与许可证列表
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_stats_and_license_lists() {
    let pool = connect().await;
    let admin_id = seed_user(&pool, "integ_stats_admin", true).await;
    let user_id = seed_user(&pool, "integ_stats_user", false).await;
    cleanup_test_data(&pool, admin_id, user_id).await;

    let svc = RewardService::new(pool.clone());

    svc.import_licenses(
        &actor(admin_id),
        import_request("Integ Stats", &["STAT-1", "STAT-2"]),
    )
    .await
    .unwrap();

    let before = svc.get_stats().await.unwrap();

    let reward = svc
        .create_reward(
            &actor(admin_id),
            CreateRewardRequest {
                value: Some("Integ Stats".to_string()),
                ..create_request(user_id, RewardType::NiLicense, "统计用")
            },
        )
        .await
        .unwrap();
    svc.approve_reward(reward.id, &actor(admin_id), ApproveRewardRequest::default())
        .await
        .unwrap();

    let after = svc.get_stats().await.unwrap();
    assert_eq!(after.available_licenses, before.available_licenses - 1);
    assert_eq!(after.assigned_licenses, before.assigned_licenses + 1);
    assert_eq!(after.total_rewards, before.total_rewards + 1);

    let (assigned, _) = svc.get_assigned_licenses(0, 100).await.unwrap();
    assert!(assigned.iter().any(|l| l.assigned_to == Some(user_id)));

    cleanup_test_data(&pool, admin_id, user_id).await;
}
