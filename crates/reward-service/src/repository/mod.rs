//! 数据访问层
//!
//! 每个仓储持有连接池提供只读查询；写操作提供 `*_in_tx` 关联函数，
//! 由服务层在单个事务内编排。

pub mod audit_repo;
pub mod license_repo;
pub mod reward_repo;

pub use audit_repo::{AuditRepository, NewAdminAction};
pub use license_repo::{LicenseRepository, NewLicense};
pub use reward_repo::{NewReward, RewardRepository};
