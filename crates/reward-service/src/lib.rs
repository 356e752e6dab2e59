//! 奖励生命周期核心服务
//!
//! 提供奖励创建、审批、拒绝、交付以及 NI 许可证池管理的核心业务逻辑。
//! 所有写操作在单个数据库事务内完成，并同步写入管理员操作审计记录。

pub mod error;
pub mod models;
pub mod repository;
pub mod service;

pub use error::{Result, RewardError};
pub use models::{AdminAction, NiLicense, Reward, RewardSourceType, RewardStatus, RewardType};
pub use service::{
    AdminActor, ApproveRewardRequest, CreateRewardRequest, ImportLicensesRequest,
    RejectRewardRequest, RewardService, RewardStats,
};
