use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::models::{Match, SetScore};
use crate::services::match_state::MatchStatus;
use crate::services::set_rules::{SetPoints, Side, is_supported_set_count};

/// Request payload for scheduling a single match by hand
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMatchRequest {
    pub tournament_id: Uuid,

    pub group_id: Option<Uuid>,

    pub local_team_id: Uuid,

    pub visitor_team_id: Uuid,

    #[validate(custom(function = "validate_set_count"))]
    #[serde(default = "default_sets")]
    pub number_of_sets: u32,

    pub match_date: Option<NaiveDate>,

    #[schema(value_type = Option<String>, example = "18:30:00")]
    pub match_time: Option<NaiveTime>,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    #[validate(length(max = 255))]
    pub phase: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate, ToSchema)]
pub struct SetScoreInput {
    #[validate(range(min = 1, max = 5, message = "Set number must be between 1 and 5"))]
    pub set_number: u32,
    #[validate(range(max = 99))]
    pub local_points: u32,
    #[validate(range(max = 99))]
    pub visitor_points: u32,
}

impl From<SetScoreInput> for SetPoints {
    fn from(input: SetScoreInput) -> Self {
        SetPoints::new(input.set_number, input.local_points, input.visitor_points)
    }
}

/// Request payload for editing a match.
///
/// Metadata, format and scores are applied together or not at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateMatchRequest {
    pub match_date: Option<NaiveDate>,

    #[schema(value_type = Option<String>, example = "18:30:00")]
    pub match_time: Option<NaiveTime>,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    #[validate(length(max = 255))]
    pub phase: Option<String>,

    #[validate(custom(function = "validate_set_count"))]
    pub number_of_sets: Option<u32>,

    #[validate(nested)]
    pub set_scores: Option<Vec<SetScoreInput>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimeoutRequest {
    pub team_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct MatchFilter {
    pub tournament_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimeoutView {
    pub team_id: Uuid,
    pub side: Side,
    pub started_at: DateTime<Utc>,
    pub seconds_left: i64,
}

/// Response containing match details
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchResponse {
    pub match_id: Uuid,
    pub tournament_id: Uuid,
    pub group_id: Option<Uuid>,
    pub local_team_id: Uuid,
    pub visitor_team_id: Uuid,
    pub number_of_sets: u32,
    pub match_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, example = "18:30:00")]
    pub match_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub phase: Option<String>,
    pub status: MatchStatus,
    pub local_sets_won: u32,
    pub visitor_sets_won: u32,
    pub winner_team_id: Option<Uuid>,
    pub local_timeouts: u32,
    pub visitor_timeouts: u32,
    pub timeout_active: bool,
    pub timeout: Option<TimeoutView>,
    pub sets: Vec<SetPoints>,
    pub updated_at: DateTime<Utc>,
}

impl MatchResponse {
    pub fn build(row: Match, sets: &[SetScore], now: DateTime<Utc>) -> Result<Self> {
        let state = row.to_state(sets)?;

        let timeout = state.timeouts.active.map(|active| TimeoutView {
            team_id: state.team_id(active.side),
            side: active.side,
            started_at: active.started_at,
            seconds_left: state.timeout_seconds_left(now).unwrap_or(0),
        });

        Ok(Self {
            match_id: row.match_id,
            tournament_id: row.tournament_id,
            group_id: row.group_id,
            local_team_id: row.local_team_id,
            visitor_team_id: row.visitor_team_id,
            number_of_sets: state.number_of_sets,
            match_date: row.match_date,
            match_time: row.match_time,
            location: row.location,
            phase: row.phase,
            status: state.status,
            local_sets_won: state.tally.local,
            visitor_sets_won: state.tally.visitor,
            winner_team_id: state.winner_team_id(),
            local_timeouts: state.timeouts.local_remaining,
            visitor_timeouts: state.timeouts.visitor_remaining,
            timeout_active: timeout.is_some(),
            timeout,
            sets: state.sets,
            updated_at: row.updated_at,
        })
    }
}

fn default_sets() -> u32 {
    3
}

fn validate_set_count(count: u32) -> std::result::Result<(), validator::ValidationError> {
    if is_supported_set_count(count) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_set_count")
            .with_message("Number of sets must be 3 or 5".into()))
    }
}

impl CreateMatchRequest {
    /// A team cannot play itself
    pub fn validate_teams(&self) -> std::result::Result<(), &'static str> {
        if self.local_team_id == self.visitor_team_id {
            return Err("Local and visitor teams must be different");
        }
        Ok(())
    }
}
