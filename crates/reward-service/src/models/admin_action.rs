//! 管理员操作审计实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// 管理员操作记录
///
/// 只追加不修改，与触发它的业务写操作处于同一事务，
/// 业务失败时审计记录一并回滚。
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AdminAction {
    pub id: Uuid,
    /// 操作人 ID
    pub admin_id: Uuid,
    /// 动作名称，如 approve_reward / import_licenses
    pub action: String,
    /// 操作目标 ID
    #[sqlx(default)]
    pub target_id: Option<Uuid>,
    /// 目标类型，如 reward / license_batch
    pub target_type: String,
    /// 操作详情（结构化 JSON）
    #[sqlx(default)]
    pub details: Option<Value>,
    /// 操作来源 IP
    #[sqlx(default)]
    pub ip_address: Option<String>,
    /// 操作来源 User-Agent
    #[sqlx(default)]
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}
