//! 许可证池相关的 HTTP 处理器

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::HeaderMap,
};
use reward_service::models::NiLicense;
use reward_service::service::dto::ImportLicensesRequest;
use validator::Validate;

use super::actor_from;
use crate::auth::Claims;
use crate::dto::{
    ApiResponse, ImportLicensesBody, ImportLicensesResponse, LicenseQueryFilter, PageResponse,
    PaginationParams,
};
use crate::error::Result;
use crate::state::AppState;

/// 批量导入许可证
///
/// 任一密钥重复时整批回滚并返回 409
pub async fn import_licenses(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    Json(body): Json<ImportLicensesBody>,
) -> Result<Json<ApiResponse<ImportLicensesResponse>>> {
    body.validate()?;
    let actor = actor_from(&claims, &headers)?;

    let (batch_id, imported) = state
        .reward_service
        .import_licenses(
            &actor,
            ImportLicensesRequest {
                product_name: body.product_name,
                product_code: body.product_code,
                batch_id: body.batch_id,
                license_keys: body.license_keys,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success_with_message(
        ImportLicensesResponse { batch_id, imported },
        format!("成功导入 {} 条许可证", imported),
    )))
}

/// 分页获取可用许可证（可按产品过滤）
pub async fn list_available_licenses(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<LicenseQueryFilter>,
) -> Result<Json<ApiResponse<PageResponse<NiLicense>>>> {
    let (licenses, total) = state
        .reward_service
        .get_available_licenses(
            filter.product_name.as_deref(),
            pagination.offset(),
            pagination.limit(),
        )
        .await?;

    Ok(Json(ApiResponse::success(PageResponse::new(
        licenses,
        total,
        pagination.page,
        pagination.limit(),
    ))))
}

/// 分页获取已分配许可证
pub async fn list_assigned_licenses(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<NiLicense>>>> {
    let (licenses, total) = state
        .reward_service
        .get_assigned_licenses(pagination.offset(), pagination.limit())
        .await?;

    Ok(Json(ApiResponse::success(PageResponse::new(
        licenses,
        total,
        pagination.page,
        pagination.limit(),
    ))))
}
