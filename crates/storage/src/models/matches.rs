use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::set_score::{SetScore, to_u32};
use crate::error::{Result, StorageError};
use crate::services::match_state::{ActiveTimeout, MatchState, MatchStatus, TimeoutState};
use crate::services::set_rules::{SetPoints, SetTally, Side, aggregate_sets};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Match {
    pub match_id: Uuid,
    pub tournament_id: Uuid,
    pub group_id: Option<Uuid>,
    pub local_team_id: Uuid,
    pub visitor_team_id: Uuid,
    pub number_of_sets: i32,
    pub match_date: Option<NaiveDate>,
    pub match_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub phase: Option<String>,
    pub status: String,
    pub local_sets_won: i32,
    pub visitor_sets_won: i32,
    pub winner_team_id: Option<Uuid>,
    pub local_timeouts: i32,
    pub visitor_timeouts: i32,
    pub timeout_team_id: Option<Uuid>,
    pub timeout_started_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    /// Rebuilds the engine state from the row and its set scores.
    ///
    /// The stored tally and winner are recomputed from the sets and must agree
    /// with them; a mismatch is reported as corruption.
    pub fn to_state(&self, sets: &[SetScore]) -> Result<MatchState> {
        let number_of_sets = to_u32(self.number_of_sets, "matches.number_of_sets")?;

        let mut points = sets
            .iter()
            .map(SetScore::to_points)
            .collect::<Result<Vec<_>>>()?;
        for set_number in 1..=number_of_sets {
            if !points.iter().any(|set| set.set_number == set_number) {
                points.push(SetPoints::zero(set_number));
            }
        }
        points.retain(|set| set.set_number <= number_of_sets);
        points.sort_by_key(|set| set.set_number);

        let tally = aggregate_sets(&points, number_of_sets);
        let stored = SetTally::new(
            to_u32(self.local_sets_won, "matches.local_sets_won")?,
            to_u32(self.visitor_sets_won, "matches.visitor_sets_won")?,
        );
        if tally != stored {
            return Err(StorageError::Corrupt(format!(
                "match {} stores {}-{} sets but its scores give {}-{}",
                self.match_id, stored.local, stored.visitor, tally.local, tally.visitor
            )));
        }

        let active = match (self.timeout_team_id, self.timeout_started_at) {
            (Some(team_id), Some(started_at)) => {
                let side = if team_id == self.local_team_id {
                    Side::Local
                } else if team_id == self.visitor_team_id {
                    Side::Visitor
                } else {
                    return Err(StorageError::Corrupt(format!(
                        "match {} has a timeout for foreign team {}",
                        self.match_id, team_id
                    )));
                };
                Some(ActiveTimeout { side, started_at })
            }
            _ => None,
        };

        let state = MatchState {
            local_team_id: self.local_team_id,
            visitor_team_id: self.visitor_team_id,
            number_of_sets,
            status: self.status.parse()?,
            sets: points,
            tally,
            winner: None,
            timeouts: TimeoutState {
                local_remaining: to_u32(self.local_timeouts, "matches.local_timeouts")?,
                visitor_remaining: to_u32(self.visitor_timeouts, "matches.visitor_timeouts")?,
                active,
            },
        };

        let winner = match self.winner_team_id {
            Some(team_id) => Some(state.side_of(team_id).ok_or_else(|| {
                StorageError::Corrupt(format!(
                    "match {} names foreign team {} as winner",
                    self.match_id, team_id
                ))
            })?),
            None => None,
        };
        let completed = state.status == MatchStatus::Completed;
        if winner != tally.decided_for(number_of_sets) || completed != winner.is_some() {
            return Err(StorageError::Corrupt(format!(
                "match {} is {} with winner {:?} but its sets give {}-{}",
                self.match_id, self.status, self.winner_team_id, tally.local, tally.visitor
            )));
        }

        Ok(MatchState { winner, ..state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, local_sets: i32, visitor_sets: i32) -> Match {
        let now = Utc::now();
        Match {
            match_id: Uuid::new_v4(),
            tournament_id: Uuid::new_v4(),
            group_id: None,
            local_team_id: Uuid::new_v4(),
            visitor_team_id: Uuid::new_v4(),
            number_of_sets: 3,
            match_date: None,
            match_time: None,
            location: None,
            phase: Some("Round 1".to_string()),
            status: status.to_string(),
            local_sets_won: local_sets,
            visitor_sets_won: visitor_sets,
            winner_team_id: None,
            local_timeouts: 2,
            visitor_timeouts: 1,
            timeout_team_id: None,
            timeout_started_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn score(m: &Match, set_number: i32, local: i32, visitor: i32) -> SetScore {
        SetScore {
            match_id: m.match_id,
            set_number,
            local_points: local,
            visitor_points: visitor,
        }
    }

    #[test]
    fn test_state_from_row() {
        let mut m = row("completed", 2, 0);
        m.winner_team_id = Some(m.local_team_id);
        let sets = vec![score(&m, 2, 25, 18), score(&m, 1, 25, 20), score(&m, 3, 0, 0)];

        let state = m.to_state(&sets).unwrap();
        assert_eq!(state.status, MatchStatus::Completed);
        assert_eq!(state.winner, Some(Side::Local));
        assert_eq!(state.sets[0].set_number, 1);
        assert_eq!(state.timeouts.visitor_remaining, 1);
    }

    #[test]
    fn test_missing_sets_are_zero() {
        let m = row("scheduled", 0, 0);
        let state = m.to_state(&[]).unwrap();
        assert_eq!(state.sets.len(), 3);
        assert!(state.sets.iter().all(SetPoints::is_blank));
    }

    #[test]
    fn test_winner_must_follow_the_sets() {
        let mut m = row("completed", 2, 0);
        let sets = vec![score(&m, 1, 25, 20), score(&m, 2, 25, 18)];
        assert!(matches!(m.to_state(&sets), Err(StorageError::Corrupt(_))));

        m.winner_team_id = Some(m.visitor_team_id);
        assert!(matches!(m.to_state(&sets), Err(StorageError::Corrupt(_))));

        m.winner_team_id = Some(Uuid::new_v4());
        assert!(matches!(m.to_state(&sets), Err(StorageError::Corrupt(_))));

        m.winner_team_id = Some(m.local_team_id);
        assert!(m.to_state(&sets).is_ok());

        m.status = "active".to_string();
        assert!(matches!(m.to_state(&sets), Err(StorageError::Corrupt(_))));
    }

    #[test]
    fn test_diverging_tally_is_corrupt() {
        let m = row("active", 1, 0);
        let sets = vec![score(&m, 1, 20, 18)];
        assert!(matches!(m.to_state(&sets), Err(StorageError::Corrupt(_))));
    }
}
