use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TournamentGroup {
    pub group_id: Uuid,
    pub tournament_id: Uuid,
    pub name: String,
}
