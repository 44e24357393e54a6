use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{TournamentStatus, TournamentType};
use crate::services::set_rules::is_supported_set_count;
use crate::services::standings::StandingsRow;

/// Request payload for creating a new tournament
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTournamentRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    pub description: Option<String>,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    #[serde(default = "default_type")]
    pub tournament_type: TournamentType,

    #[serde(default = "default_status")]
    pub status: TournamentStatus,

    #[validate(custom(function = "validate_set_count"))]
    #[serde(default = "default_sets")]
    pub default_number_of_sets: u32,
}

/// Request payload for updating a tournament; omitted fields keep their value
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateTournamentRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    pub description: Option<String>,

    pub start_date: Option<NaiveDate>,

    pub end_date: Option<NaiveDate>,

    pub tournament_type: Option<TournamentType>,

    pub status: Option<TournamentStatus>,

    #[validate(custom(function = "validate_set_count"))]
    pub default_number_of_sets: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddTeamRequest {
    pub team_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct GenerateMatchesRequest {
    /// Group count for group-stage tournaments (defaults to 1)
    #[validate(range(min = 1, max = 26, message = "Number of groups must be between 1 and 26"))]
    pub number_of_groups: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerationSummary {
    pub tournament_id: Uuid,
    pub matches_created: usize,
    pub groups_created: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StandingsResponse {
    pub tournament_id: Uuid,
    pub tournament_name: String,
    pub standings: Vec<StandingsRow>,
}

fn default_type() -> TournamentType {
    TournamentType::League
}

fn default_status() -> TournamentStatus {
    TournamentStatus::Scheduled
}

fn default_sets() -> u32 {
    3
}

fn validate_set_count(count: u32) -> Result<(), validator::ValidationError> {
    if is_supported_set_count(count) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_set_count")
            .with_message("Number of sets must be 3 or 5".into()))
    }
}

fn check_dates(start: NaiveDate, end: NaiveDate) -> Result<(), &'static str> {
    if end < start {
        return Err("End date must be on or after start date");
    }
    Ok(())
}

impl CreateTournamentRequest {
    /// Additional validation that requires multiple fields
    pub fn validate_dates(&self) -> Result<(), &'static str> {
        check_dates(self.start_date, self.end_date)
    }
}

impl UpdateTournamentRequest {
    /// Checks the date range the tournament ends up with once this update is applied
    pub fn validate_dates(&self, start: NaiveDate, end: NaiveDate) -> Result<(), &'static str> {
        check_dates(self.start_date.unwrap_or(start), self.end_date.unwrap_or(end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(start: &str, end: &str) -> CreateTournamentRequest {
        serde_json::from_value(serde_json::json!({
            "name": "Liga Apertura",
            "start_date": start,
            "end_date": end,
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let req = request("2025-03-01", "2025-04-01");
        assert_eq!(req.tournament_type, TournamentType::League);
        assert_eq!(req.status, TournamentStatus::Scheduled);
        assert_eq!(req.default_number_of_sets, 3);
        assert!(req.validate().is_ok());
        assert!(req.validate_dates().is_ok());
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let req = request("2025-04-01", "2025-03-01");
        assert!(req.validate_dates().is_err());
    }

    #[test]
    fn test_unsupported_set_count() {
        let mut req = request("2025-03-01", "2025-04-01");
        req.default_number_of_sets = 4;
        assert!(req.validate().is_err());

        let update: UpdateTournamentRequest =
            serde_json::from_value(serde_json::json!({ "default_number_of_sets": 4 })).unwrap();
        assert!(update.validate().is_err());

        let update: UpdateTournamentRequest =
            serde_json::from_value(serde_json::json!({ "default_number_of_sets": 5 })).unwrap();
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_update_dates_are_checked_against_current_range() {
        let update = UpdateTournamentRequest {
            name: None,
            location: None,
            description: None,
            start_date: None,
            end_date: NaiveDate::from_ymd_opt(2025, 2, 1),
            tournament_type: None,
            status: None,
            default_number_of_sets: None,
        };
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        assert!(update.validate_dates(start, end).is_err());
    }
}
