//! 服务层请求对象

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{RewardSourceType, RewardType};

/// 操作人上下文
///
/// 由 HTTP 层从认证信息和请求头构造，随每个写操作传入，
/// 用于填充审计记录的操作人、IP 和 User-Agent 字段。
#[derive(Debug, Clone)]
pub struct AdminActor {
    pub admin_id: Uuid,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// 创建奖励请求
#[derive(Debug, Clone)]
pub struct CreateRewardRequest {
    pub user_id: Uuid,
    pub reward_type: RewardType,
    pub title: String,
    pub description: Option<String>,
    /// ni_license 类型必填：产品名称，审批时按此从许可证池分配
    pub value: Option<String>,
    pub source_type: RewardSourceType,
    pub source_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
    pub user_notes: Option<String>,
}

/// 审批通过请求
#[derive(Debug, Clone, Default)]
pub struct ApproveRewardRequest {
    pub admin_notes: Option<String>,
}

/// 审批拒绝请求
#[derive(Debug, Clone)]
pub struct RejectRewardRequest {
    /// 拒绝原因，必填
    pub admin_notes: String,
}

/// 许可证批量导入请求
///
/// 同一批次共享产品信息，任一密钥重复时整批回滚。
/// batch_id 可由调用方指定（对接采购单号等外部批次），缺省时服务端生成。
#[derive(Debug, Clone)]
pub struct ImportLicensesRequest {
    pub product_name: String,
    pub product_code: Option<String>,
    pub batch_id: Option<Uuid>,
    pub license_keys: Vec<String>,
}
