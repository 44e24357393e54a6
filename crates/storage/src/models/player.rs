use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Player {
    pub player_id: Uuid,
    pub team_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub jersey_number: Option<i32>,
    pub position: Option<String>,
    /// Accumulated individual points.
    pub points: i32,
    pub created_at: DateTime<Utc>,
}
