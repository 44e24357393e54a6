use axum::{
    Json,
    extract::{Query, State},
};
use storage::{
    Database,
    dto::common::{PaginatedResponse, PaginationParams},
    models::AuditLog,
};

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/audit-logs",
    params(PaginationParams),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Audit trail, newest first", body = PaginatedResponse<AuditLog>),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "audit"
)]
pub async fn list_audit_logs(
    State(db): State<Database>,
    Query(page): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<AuditLog>>, WebError> {
    page.validate()
        .map_err(|e| WebError::BadRequest(e.to_string()))?;

    let (logs, total) = services::list_audit_logs(db.pool(), page).await?;

    Ok(Json(PaginatedResponse::new(logs, page, total)))
}
