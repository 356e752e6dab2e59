//! NI 许可证仓储
//!
//! 提供许可证池的数据访问，包括批量导入和审批时的原子分配

use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use crate::error::Result;
use crate::models::NiLicense;

/// 许可证导入参数
#[derive(Debug, Clone)]
pub struct NewLicense {
    pub license_key: String,
    pub product_name: String,
    pub product_code: Option<String>,
    pub batch_id: Uuid,
    pub imported_by: Uuid,
}

/// 许可证仓储
pub struct LicenseRepository {
    pool: PgPool,
}

impl LicenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 事务内写操作 ====================

    /// 在事务中插入一条许可证
    ///
    /// license_key 冲突时返回数据库唯一约束错误，由服务层映射为业务错误
    pub async fn insert_in_tx(tx: &mut PgConnection, new: &NewLicense) -> Result<Uuid> {
        let row = sqlx::query(
            r#"
            INSERT INTO ni_licenses (license_key, product_name, product_code,
                                     batch_id, imported_by, is_assigned,
                                     created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, false, NOW(), NOW())
            RETURNING id
            "#,
        )
        .bind(&new.license_key)
        .bind(&new.product_name)
        .bind(&new.product_code)
        .bind(new.batch_id)
        .bind(new.imported_by)
        .fetch_one(tx)
        .await?;

        Ok(row.get("id"))
    }

    /// 在事务中认领一条可用许可证
    ///
    /// 按导入先后顺序（created_at ASC, id ASC）取最早的未分配许可证。
    /// SKIP LOCKED 保证并发审批各自拿到不同的行而不会互相阻塞。
    /// 返回 None 表示该产品没有剩余库存。
    pub async fn claim_available_in_tx(
        tx: &mut PgConnection,
        product_name: &str,
        user_id: Uuid,
    ) -> Result<Option<NiLicense>> {
        let license = sqlx::query_as::<_, NiLicense>(
            r#"
            UPDATE ni_licenses
            SET is_assigned = true, assigned_to = $2, assigned_at = NOW(), updated_at = NOW()
            WHERE id = (
                SELECT id FROM ni_licenses
                WHERE product_name = $1 AND is_assigned = false
                ORDER BY created_at ASC, id ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id, license_key, product_name, product_code, batch_id, imported_by,
                      is_assigned, assigned_to, assigned_at, claimed_at,
                      created_at, updated_at
            "#,
        )
        .bind(product_name)
        .bind(user_id)
        .fetch_optional(tx)
        .await?;

        Ok(license)
    }

    // ==================== 查询 ====================

    /// 分页列出可用许可证（可按产品过滤）
    pub async fn list_available(
        &self,
        product_name: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<NiLicense>> {
        let licenses = sqlx::query_as::<_, NiLicense>(
            r#"
            SELECT id, license_key, product_name, product_code, batch_id, imported_by,
                   is_assigned, assigned_to, assigned_at, claimed_at,
                   created_at, updated_at
            FROM ni_licenses
            WHERE is_assigned = false
              AND ($1::varchar IS NULL OR product_name = $1)
            ORDER BY created_at DESC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(product_name)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(licenses)
    }

    /// 统计可用许可证数量（可按产品过滤）
    pub async fn count_available(&self, product_name: Option<&str>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM ni_licenses
            WHERE is_assigned = false
              AND ($1::varchar IS NULL OR product_name = $1)
            "#,
        )
        .bind(product_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// 分页列出已分配许可证（按分配时间倒序）
    pub async fn list_assigned(&self, offset: i64, limit: i64) -> Result<Vec<NiLicense>> {
        let licenses = sqlx::query_as::<_, NiLicense>(
            r#"
            SELECT id, license_key, product_name, product_code, batch_id, imported_by,
                   is_assigned, assigned_to, assigned_at, claimed_at,
                   created_at, updated_at
            FROM ni_licenses
            WHERE is_assigned = true
            ORDER BY assigned_at DESC
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(licenses)
    }

    /// 统计已分配许可证数量
    pub async fn count_assigned(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM ni_licenses WHERE is_assigned = true
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
