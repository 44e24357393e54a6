use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Player, Team};

/// Request payload for creating a new team
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTeamRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    #[validate(length(max = 255))]
    pub coach_name: Option<String>,

    #[validate(url)]
    #[validate(length(max = 500))]
    pub logo_url: Option<String>,
}

/// Request payload for updating a team; omitted fields keep their value
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateTeamRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[validate(length(max = 255))]
    pub coach_name: Option<String>,

    #[validate(url)]
    #[validate(length(max = 500))]
    pub logo_url: Option<String>,
}

/// A team with its current roster
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamDetailResponse {
    #[serde(flatten)]
    pub team: Team,
    pub players: Vec<Player>,
}
