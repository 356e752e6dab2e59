//! 管理员操作审计仓储
//!
//! 审计记录只追加不修改，且必须与触发它的业务写操作处于同一事务

use serde_json::Value;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::AdminAction;

/// 审计记录插入参数
#[derive(Debug, Clone)]
pub struct NewAdminAction {
    pub admin_id: Uuid,
    pub action: String,
    pub target_id: Option<Uuid>,
    pub target_type: String,
    pub details: Option<Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// 审计仓储
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 在事务中追加一条审计记录
    pub async fn insert_in_tx(tx: &mut PgConnection, new: &NewAdminAction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO admin_actions (admin_id, action, target_id, target_type,
                                       details, ip_address, user_agent, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            "#,
        )
        .bind(new.admin_id)
        .bind(&new.action)
        .bind(new.target_id)
        .bind(&new.target_type)
        .bind(&new.details)
        .bind(&new.ip_address)
        .bind(&new.user_agent)
        .execute(tx)
        .await?;

        Ok(())
    }

    /// 列出针对某目标对象的审计记录（按时间正序）
    pub async fn list_by_target(&self, target_id: Uuid) -> Result<Vec<AdminAction>> {
        let actions = sqlx::query_as::<_, AdminAction>(
            r#"
            SELECT id, admin_id, action, target_id, target_type,
                   details, ip_address, user_agent, created_at
            FROM admin_actions
            WHERE target_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(target_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(actions)
    }
}
