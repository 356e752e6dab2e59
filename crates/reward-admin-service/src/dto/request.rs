//! B端服务请求 DTO 定义
//!
//! 所有 REST API 的请求体和查询参数结构

use chrono::{DateTime, Utc};
use reward_service::models::{RewardSourceType, RewardStatus, RewardType};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// 分页查询参数
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PaginationParams {
    /// 计算数据库查询的 offset
    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0) * self.limit()
    }

    /// 获取限制条数（最大100）
    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, 100)
    }
}

/// 创建奖励请求体
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRewardBody {
    pub user_id: Uuid,
    pub reward_type: RewardType,
    #[validate(length(min = 1, max = 200, message = "标题长度必须在 1-200 之间"))]
    pub title: String,
    pub description: Option<String>,
    /// ni_license 类型必填：产品名称
    pub value: Option<String>,
    #[serde(default)]
    pub source_type: RewardSourceType,
    pub source_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
    pub user_notes: Option<String>,
}

/// 审批通过请求体
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRewardBody {
    pub admin_notes: Option<String>,
}

/// 审批拒绝请求体
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RejectRewardBody {
    #[validate(length(min = 1, max = 1000, message = "拒绝原因长度必须在 1-1000 之间"))]
    pub admin_notes: String,
}

/// 许可证批量导入请求体
///
/// batchId 缺省时由服务端生成
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ImportLicensesBody {
    #[validate(length(min = 1, max = 200, message = "产品名称长度必须在 1-200 之间"))]
    pub product_name: String,
    pub product_code: Option<String>,
    pub batch_id: Option<Uuid>,
    #[validate(length(min = 1, message = "许可证列表不能为空"))]
    pub license_keys: Vec<String>,
}

/// 奖励列表查询过滤
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardQueryFilter {
    pub status: Option<RewardStatus>,
}

/// 许可证列表查询过滤
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseQueryFilter {
    pub product_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 20);
        assert_eq!(params.offset(), 0);
        assert_eq!(params.limit(), 20);
    }

    #[test]
    fn test_pagination_offset_and_clamp() {
        let params = PaginationParams {
            page: 3,
            page_size: 50,
        };
        assert_eq!(params.offset(), 100);

        let oversized = PaginationParams {
            page: 1,
            page_size: 5000,
        };
        assert_eq!(oversized.limit(), 100);

        let negative = PaginationParams {
            page: -2,
            page_size: 0,
        };
        assert_eq!(negative.offset(), 0);
        assert_eq!(negative.limit(), 1);
    }

    #[test]
    fn test_create_reward_body_validation() {
        let body = CreateRewardBody {
            user_id: Uuid::new_v4(),
            reward_type: RewardType::Points,
            title: "".to_string(),
            description: None,
            value: None,
            source_type: RewardSourceType::Manual,
            source_id: None,
            expires_at: None,
            user_notes: None,
        };
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_create_reward_body_deserializes_camel_case() {
        let body: CreateRewardBody = serde_json::from_str(
            r#"{
                "userId": "8d7f1f5e-47c7-4af4-9d34-1f2a3b4c5d6e",
                "rewardType": "ni_license",
                "title": "Beat Battle 冠军",
                "value": "Komplete 14"
            }"#,
        )
        .unwrap();
        assert_eq!(body.reward_type, RewardType::NiLicense);
        assert_eq!(body.source_type, RewardSourceType::Manual);
        assert!(body.validate().is_ok());
    }

    #[test]
    fn test_import_licenses_body_validation() {
        let body = ImportLicensesBody {
            product_name: "Maschine".to_string(),
            product_code: None,
            batch_id: None,
            license_keys: vec![],
        };
        assert!(body.validate().is_err());
    }

    /// batchId 由调用方指定时必须原样透传，缺省时为 None
    #[test]
    fn test_import_licenses_body_batch_id() {
        let body: ImportLicensesBody = serde_json::from_str(
            r#"{
                "productName": "Komplete 15",
                "batchId": "6f3b1a2c-9d4e-4f5a-8b7c-0d1e2f3a4b5c",
                "licenseKeys": ["KEY-1"]
            }"#,
        )
        .unwrap();
        assert_eq!(
            body.batch_id,
            Some("6f3b1a2c-9d4e-4f5a-8b7c-0d1e2f3a4b5c".parse().unwrap())
        );

        let body: ImportLicensesBody = serde_json::from_str(
            r#"{ "productName": "Komplete 15", "licenseKeys": ["KEY-1"] }"#,
        )
        .unwrap();
        assert!(body.batch_id.is_none());
    }
}
