use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::common::PaginationParams;
use crate::error::Result;
use crate::models::{AuditAction, AuditLog};

/// Append-only trail of administrative changes
pub struct AuditLogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AuditLogRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Newest entries first
    pub async fn list(&self, page: PaginationParams) -> Result<(Vec<AuditLog>, i64)> {
        let logs = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT log_id, action, entity_type, entity_id, old_data, new_data, created_at
            FROM audit_logs
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM audit_logs")
            .fetch_one(self.pool)
            .await?;

        Ok((logs, total))
    }

    /// Records a change inside the transaction that makes it
    pub async fn record(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        action: AuditAction,
        entity_type: &str,
        entity_id: Option<Uuid>,
        old_data: Option<Value>,
        new_data: Option<Value>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (action, entity_type, entity_id, old_data, new_data)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(action.as_str())
        .bind(entity_type)
        .bind(entity_id)
        .bind(old_data)
        .bind(new_data)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
