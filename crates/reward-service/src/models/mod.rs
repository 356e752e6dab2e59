//! 奖励领域实体定义

pub mod admin_action;
pub mod enums;
pub mod license;
pub mod reward;

pub use admin_action::AdminAction;
pub use enums::{RewardSourceType, RewardStatus, RewardType};
pub use license::NiLicense;
pub use reward::Reward;
