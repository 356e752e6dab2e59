//! 奖励实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{RewardSourceType, RewardStatus, RewardType};

/// 奖励记录
///
/// value 字段的含义随类型和状态变化：
/// ni_license 类型创建时存放产品名称，审批通过后被分配到的许可证密钥覆盖；
/// points 类型存放积分数值的字符串表示；其余类型为自由文本。
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: Uuid,
    /// 获奖用户 ID
    pub user_id: Uuid,
    /// 奖励类型
    pub reward_type: RewardType,
    /// 当前状态
    pub status: RewardStatus,
    /// 奖励标题
    pub title: String,
    /// 奖励描述
    #[sqlx(default)]
    pub description: Option<String>,
    /// 奖励内容（见类型说明）
    #[sqlx(default)]
    pub value: Option<String>,
    /// 来源类型
    pub source_type: RewardSourceType,
    /// 来源对象 ID（如挑战赛 ID）
    #[sqlx(default)]
    pub source_id: Option<Uuid>,
    /// 审批人 ID
    #[sqlx(default)]
    pub approved_by: Option<Uuid>,
    /// 审批时间
    #[sqlx(default)]
    pub approved_at: Option<DateTime<Utc>>,
    /// 交付时间
    #[sqlx(default)]
    pub delivered_at: Option<DateTime<Utc>>,
    /// 拒绝时间
    #[sqlx(default)]
    pub rejected_at: Option<DateTime<Utc>>,
    /// 过期时间（可选）
    #[sqlx(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// 管理员备注（审批/拒绝原因）
    #[sqlx(default)]
    pub admin_notes: Option<String>,
    /// 用户可见备注
    #[sqlx(default)]
    pub user_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
