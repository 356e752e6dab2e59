//! 奖励服务枚举类型定义
//!
//! 所有枚举都支持数据库（sqlx）和 JSON（serde）序列化

use serde::{Deserialize, Serialize};

/// 奖励类型
///
/// 决定审批通过后的交付方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum RewardType {
    /// NI 许可证 - 审批时从许可证池分配密钥，自动交付
    NiLicense,
    /// 徽章 - 虚拟奖励，审批即视为交付
    Badge,
    /// 积分 - 虚拟奖励，审批即视为交付
    #[default]
    Points,
    /// 自定义 - 需要线下履约，审批后停留在 approved 状态
    Custom,
}

impl RewardType {
    /// 判断该类型是否在审批通过时自动交付
    ///
    /// 自定义奖励需要人工履约，其余类型审批即交付
    pub fn is_auto_delivered(&self) -> bool {
        !matches!(self, Self::Custom)
    }
}

/// 奖励状态
///
/// 状态机：pending -> approved -> delivered，或 pending -> rejected。
/// expired 由运营脚本批量标记，不参与审批流转。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum RewardStatus {
    /// 待审批 - 创建后的初始状态
    #[default]
    Pending,
    /// 已批准 - 审批通过但尚未交付（仅 custom 类型停留于此）
    Approved,
    /// 已交付 - 奖励已到达用户
    Delivered,
    /// 已拒绝 - 审批未通过
    Rejected,
    /// 已过期 - 超过有效期未处理
    Expired,
}

impl RewardStatus {
    /// 是否为终态（不再参与审批流转）
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Rejected | Self::Expired)
    }
}

/// 奖励来源类型
///
/// 标识奖励的触发来源，用于追溯
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum RewardSourceType {
    /// 挑战赛获奖
    Challenge,
    /// 活动奖励
    Event,
    /// 运营手动创建
    #[default]
    Manual,
    /// 系统发放
    System,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_type_serialization() {
        assert_eq!(
            serde_json::to_string(&RewardType::NiLicense).unwrap(),
            "\"ni_license\""
        );
        assert_eq!(
            serde_json::from_str::<RewardType>("\"custom\"").unwrap(),
            RewardType::Custom
        );
    }

    #[test]
    fn test_reward_type_is_auto_delivered() {
        assert!(RewardType::NiLicense.is_auto_delivered());
        assert!(RewardType::Badge.is_auto_delivered());
        assert!(RewardType::Points.is_auto_delivered());
        assert!(!RewardType::Custom.is_auto_delivered());
    }

    #[test]
    fn test_reward_status_serialization() {
        assert_eq!(
            serde_json::to_string(&RewardStatus::Delivered).unwrap(),
            "\"delivered\""
        );
        assert_eq!(
            serde_json::from_str::<RewardStatus>("\"pending\"").unwrap(),
            RewardStatus::Pending
        );
    }

    #[test]
    fn test_reward_status_is_terminal() {
        assert!(!RewardStatus::Pending.is_terminal());
        assert!(!RewardStatus::Approved.is_terminal());
        assert!(RewardStatus::Delivered.is_terminal());
        assert!(RewardStatus::Rejected.is_terminal());
        assert!(RewardStatus::Expired.is_terminal());
    }

    #[test]
    fn test_reward_status_default() {
        assert_eq!(RewardStatus::default(), RewardStatus::Pending);
    }
}
