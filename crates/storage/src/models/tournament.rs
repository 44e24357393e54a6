use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Result, StorageError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Tournament {
    pub tournament_id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub tournament_type: String,
    pub default_number_of_sets: i32,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    pub fn kind(&self) -> Result<TournamentType> {
        self.tournament_type.parse()
    }

    pub fn default_sets(&self) -> Result<u32> {
        u32::try_from(self.default_number_of_sets).map_err(|_| {
            StorageError::Corrupt(format!(
                "tournament {} has {} default sets",
                self.tournament_id, self.default_number_of_sets
            ))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TournamentType {
    League,
    Knockout,
    GroupStage,
}

impl TournamentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::League => "league",
            Self::Knockout => "knockout",
            Self::GroupStage => "group_stage",
        }
    }
}

impl FromStr for TournamentType {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "league" => Ok(Self::League),
            "knockout" => Ok(Self::Knockout),
            "group_stage" => Ok(Self::GroupStage),
            other => Err(StorageError::Corrupt(format!(
                "unknown tournament type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    Scheduled,
    Active,
    Completed,
    Cancelled,
}

impl TournamentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for TournamentStatus {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(StorageError::Corrupt(format!(
                "unknown tournament status '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_round_trips_through_text() {
        for kind in [
            TournamentType::League,
            TournamentType::Knockout,
            TournamentType::GroupStage,
        ] {
            assert_eq!(kind.as_str().parse::<TournamentType>().unwrap(), kind);
        }
        assert!("swiss".parse::<TournamentType>().is_err());
    }

    #[test]
    fn test_serde_names_match_columns() {
        let json = serde_json::to_string(&TournamentType::GroupStage).unwrap();
        assert_eq!(json, "\"group_stage\"");
        let status: TournamentStatus = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(status, TournamentStatus::Active);
    }
}
