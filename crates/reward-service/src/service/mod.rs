//! 服务层
//!
//! 奖励生命周期的业务编排

pub mod dto;
pub mod reward_service;

pub use dto::{
    AdminActor, ApproveRewardRequest, CreateRewardRequest, ImportLicensesRequest,
    RejectRewardRequest,
};
pub use reward_service::{RewardService, RewardStats};
