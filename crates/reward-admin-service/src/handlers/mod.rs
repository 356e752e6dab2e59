//! HTTP 处理器

pub mod auth;
pub mod license;
pub mod reward;
pub mod stats;

use axum::http::HeaderMap;
use reward_service::AdminActor;

use crate::auth::Claims;
use crate::error::Result;
use crate::middleware::rate_limit::client_ip;

/// 从认证信息和请求头构造操作人上下文
///
/// 审计记录需要操作人 ID、来源 IP 和 User-Agent
pub fn actor_from(claims: &Claims, headers: &HeaderMap) -> Result<AdminActor> {
    let admin_id = claims.admin_id()?;

    let ip_address = match client_ip(headers).as_str() {
        "unknown" => None,
        ip => Some(ip.to_string()),
    };

    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    Ok(AdminActor {
        admin_id,
        ip_address,
        user_agent,
    })
}
