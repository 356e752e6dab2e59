//! B端 API 请求/响应 DTO

pub mod request;
pub mod response;

pub use request::{
    ApproveRewardBody, CreateRewardBody, ImportLicensesBody, LicenseQueryFilter, PaginationParams,
    RejectRewardBody, RewardQueryFilter,
};
pub use response::{
    AdminUserDto, ApiResponse, CurrentUserResponse, ImportLicensesResponse, LoginResponse,
    PageResponse, StatsOverview,
};
