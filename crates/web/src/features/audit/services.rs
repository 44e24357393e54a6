use sqlx::PgPool;
use storage::{
    dto::common::PaginationParams, error::Result, models::AuditLog, repository::AuditLogRepository,
};

pub async fn list_audit_logs(pool: &PgPool, page: PaginationParams) -> Result<(Vec<AuditLog>, i64)> {
    AuditLogRepository::new(pool).list(page).await
}
