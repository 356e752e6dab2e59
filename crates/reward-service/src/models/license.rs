//! NI 许可证实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// NI 许可证
///
/// 批量导入后进入许可证池，审批 ni_license 奖励时按导入先后顺序分配。
/// license_key 全局唯一，分配后不可回收。
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NiLicense {
    pub id: Uuid,
    /// 许可证密钥（全局唯一）
    pub license_key: String,
    /// 产品名称，分配时按此匹配
    pub product_name: String,
    /// 产品编码
    #[sqlx(default)]
    pub product_code: Option<String>,
    /// 导入批次 ID，同一次导入的许可证共享
    pub batch_id: Uuid,
    /// 导入人 ID
    pub imported_by: Uuid,
    /// 是否已分配
    pub is_assigned: bool,
    /// 被分配的用户 ID
    #[sqlx(default)]
    pub assigned_to: Option<Uuid>,
    /// 分配时间
    #[sqlx(default)]
    pub assigned_at: Option<DateTime<Utc>>,
    /// 用户激活时间（由回调写入，可为空）
    #[sqlx(default)]
    pub claimed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
