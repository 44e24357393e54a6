use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Request payload for registering a player
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePlayerRequest {
    #[validate(length(min = 1, max = 255, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 255, message = "Last name is required"))]
    pub last_name: String,

    #[validate(length(min = 1, max = 64, message = "National ID is required"))]
    pub national_id: String,

    pub team_id: Option<Uuid>,

    #[validate(range(min = 0, max = 99, message = "Jersey number must be between 0 and 99"))]
    pub jersey_number: Option<i32>,

    #[validate(length(max = 64))]
    pub position: Option<String>,
}

/// Request payload for updating a player; omitted fields keep their value
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePlayerRequest {
    #[validate(length(min = 1, max = 255))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub last_name: Option<String>,

    #[validate(length(min = 1, max = 64))]
    pub national_id: Option<String>,

    pub team_id: Option<Uuid>,

    #[validate(range(min = 0, max = 99))]
    pub jersey_number: Option<i32>,

    #[validate(length(max = 64))]
    pub position: Option<String>,
}

#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct PlayerFilter {
    pub team_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct PlayerStandingsQuery {
    /// Number of players to return (1-100, default 20)
    #[serde(default = "default_standings_limit")]
    pub limit: u32,
}

fn default_standings_limit() -> u32 {
    20
}

impl PlayerStandingsQuery {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.limit < 1 || self.limit > 100 {
            return Err("limit must be between 1 and 100");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct PointsImportQuery {
    /// Check the sheet against the database without applying it
    #[serde(default)]
    pub validate_only: bool,
}

/// A row of the individual points table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PlayerStanding {
    pub player_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub team_id: Option<Uuid>,
    pub team_name: Option<String>,
    pub jersey_number: Option<i32>,
    pub points: i32,
}

/// Outcome of a points sheet import
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PointsImportSummary {
    pub rows_read: usize,
    pub players_updated: usize,
    pub validate_only: bool,
}
