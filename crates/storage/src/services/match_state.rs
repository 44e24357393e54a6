//! Match lifecycle: score entry, winner resolution and the timeout protocol.
//!
//! Every operation takes the current [`MatchState`] by reference and returns a
//! [`Transition`] holding the next state and the events a caller should publish
//! once the new state is persisted. Nothing here touches the database.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use super::set_rules::{
    SetPoints, SetTally, Side, aggregate_sets, is_set_concluded, is_set_valid,
    is_supported_set_count, points_to_win,
};
use crate::error::StorageError;

/// Seconds after which a requested timeout is over.
pub const TIMEOUT_DURATION_SECS: i64 = 30;

/// Timeouts each side may call per match.
pub const TIMEOUTS_PER_MATCH: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    Active,
    Completed,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for MatchStatus {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(StorageError::Corrupt(format!("unknown match status '{}'", other))),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("A match is played as best of 3 or best of 5, not {0}")]
    UnsupportedFormat(u32),

    #[error("Set {0} does not exist in this match")]
    UnknownSet(u32),

    #[error("Set {0} is listed more than once")]
    DuplicateSet(u32),

    #[error(
        "Invalid score {local}-{visitor} for set {set_number}: a set is won with {threshold} points and a 2 point lead"
    )]
    InvalidSetScore {
        set_number: u32,
        local: u32,
        visitor: u32,
        threshold: u32,
    },

    #[error("The match was already decided before set {0}; it can no longer be edited")]
    SetAlreadyDecided(u32),

    #[error("Set {0} is finished; its score can no longer increase")]
    SetAlreadyConcluded(u32),

    #[error("The match is cancelled")]
    MatchCancelled,

    #[error("The match is already completed")]
    MatchCompleted,

    #[error("Timeouts can only be requested while the match is active")]
    MatchNotActive,

    #[error("A timeout is already active")]
    TimeoutAlreadyActive,

    #[error("The {} team has no timeouts left", .0.as_str())]
    NoTimeoutsRemaining(Side),

    #[error("Team {0} does not play in this match")]
    TeamNotInMatch(Uuid),

    #[error("There is no active timeout to end")]
    NoActiveTimeout,
}

impl ScoringError {
    /// Rejections caused by the match's current state rather than malformed input.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::SetAlreadyDecided(_)
                | Self::SetAlreadyConcluded(_)
                | Self::MatchCancelled
                | Self::MatchCompleted
                | Self::MatchNotActive
                | Self::TimeoutAlreadyActive
                | Self::NoTimeoutsRemaining(_)
                | Self::NoActiveTimeout
        )
    }
}

/// Something observers of a match should be told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchEvent {
    MatchUpdated,
    TimeoutRequested { side: Side },
    TimeoutEnded,
}

impl MatchEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MatchUpdated => "match_updated",
            Self::TimeoutRequested { .. } => "timeout_requested",
            Self::TimeoutEnded => "timeout_ended",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveTimeout {
    pub side: Side,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutState {
    pub local_remaining: u32,
    pub visitor_remaining: u32,
    pub active: Option<ActiveTimeout>,
}

impl TimeoutState {
    pub fn fresh() -> Self {
        Self {
            local_remaining: TIMEOUTS_PER_MATCH,
            visitor_remaining: TIMEOUTS_PER_MATCH,
            active: None,
        }
    }

    pub fn remaining(&self, side: Side) -> u32 {
        match side {
            Side::Local => self.local_remaining,
            Side::Visitor => self.visitor_remaining,
        }
    }

    fn consume(&mut self, side: Side) {
        match side {
            Side::Local => self.local_remaining -= 1,
            Side::Visitor => self.visitor_remaining -= 1,
        }
    }
}

impl Default for TimeoutState {
    fn default() -> Self {
        Self::fresh()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    pub local_team_id: Uuid,
    pub visitor_team_id: Uuid,
    pub number_of_sets: u32,
    pub status: MatchStatus,
    /// One entry per set of the format, ordered by set number.
    pub sets: Vec<SetPoints>,
    pub tally: SetTally,
    pub winner: Option<Side>,
    pub timeouts: TimeoutState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: MatchState,
    pub events: Vec<MatchEvent>,
}

impl Transition {
    fn unchanged(state: &MatchState) -> Self {
        Self {
            state: state.clone(),
            events: Vec::new(),
        }
    }
}

pub fn timeout_duration() -> Duration {
    Duration::seconds(TIMEOUT_DURATION_SECS)
}

pub fn elapsed_exceeds(started_at: DateTime<Utc>, now: DateTime<Utc>, limit: Duration) -> bool {
    now.signed_duration_since(started_at) >= limit
}

/// A set is locked once the sets before it already decided the match.
pub fn is_locked(sets: &[SetPoints], index: usize, number_of_sets: u32) -> bool {
    let end = index.min(sets.len());
    aggregate_sets(&sets[..end], number_of_sets)
        .decided_for(number_of_sets)
        .is_some()
}

impl MatchState {
    /// A freshly scheduled match with every set at 0-0.
    pub fn scheduled(
        local_team_id: Uuid,
        visitor_team_id: Uuid,
        number_of_sets: u32,
    ) -> Result<Self, ScoringError> {
        if !is_supported_set_count(number_of_sets) {
            return Err(ScoringError::UnsupportedFormat(number_of_sets));
        }

        Ok(Self {
            local_team_id,
            visitor_team_id,
            number_of_sets,
            status: MatchStatus::Scheduled,
            sets: (1..=number_of_sets).map(SetPoints::zero).collect(),
            tally: SetTally::default(),
            winner: None,
            timeouts: TimeoutState::fresh(),
        })
    }

    pub fn side_of(&self, team_id: Uuid) -> Option<Side> {
        if team_id == self.local_team_id {
            Some(Side::Local)
        } else if team_id == self.visitor_team_id {
            Some(Side::Visitor)
        } else {
            None
        }
    }

    pub fn team_id(&self, side: Side) -> Uuid {
        match side {
            Side::Local => self.local_team_id,
            Side::Visitor => self.visitor_team_id,
        }
    }

    pub fn winner_team_id(&self) -> Option<Uuid> {
        self.winner.map(|side| self.team_id(side))
    }

    pub fn is_set_locked(&self, index: usize) -> bool {
        is_locked(&self.sets, index, self.number_of_sets)
    }

    /// Seconds left on the active timeout, zero once it has run out.
    pub fn timeout_seconds_left(&self, now: DateTime<Utc>) -> Option<i64> {
        self.timeouts.active.map(|active| {
            let elapsed = now.signed_duration_since(active.started_at).num_seconds();
            (TIMEOUT_DURATION_SECS - elapsed).max(0)
        })
    }

    /// Applies point updates for one or more sets and resolves the outcome.
    pub fn apply_scores(&self, updates: &[SetPoints]) -> Result<Transition, ScoringError> {
        if self.status == MatchStatus::Cancelled {
            return Err(ScoringError::MatchCancelled);
        }

        let mut proposed = self.sets.clone();
        let mut seen = HashSet::new();

        for update in updates {
            if !seen.insert(update.set_number) {
                return Err(ScoringError::DuplicateSet(update.set_number));
            }

            let slot = proposed
                .iter_mut()
                .find(|set| set.set_number == update.set_number)
                .ok_or(ScoringError::UnknownSet(update.set_number))?;

            self.check_set(update)?;

            let current = *slot;
            if is_set_concluded(current.local, current.visitor, current.set_number, self.number_of_sets)
                && (update.local > current.local || update.visitor > current.visitor)
            {
                return Err(ScoringError::SetAlreadyConcluded(update.set_number));
            }

            *slot = *update;
        }

        for (index, set) in proposed.iter().enumerate() {
            let changed = self.sets.get(index) != Some(set);
            if changed && is_locked(&proposed, index, self.number_of_sets) {
                return Err(ScoringError::SetAlreadyDecided(set.set_number));
            }
        }

        let next = Self {
            sets: proposed,
            ..self.clone()
        }
        .resolved();

        if next == *self {
            return Ok(Transition::unchanged(self));
        }

        Ok(Transition {
            state: next,
            events: vec![MatchEvent::MatchUpdated],
        })
    }

    /// Switches between best-of-3 and best-of-5.
    ///
    /// Sets that exist in both formats keep their points, new sets start at 0-0
    /// and every set is re-checked against the new thresholds.
    pub fn change_format(&self, number_of_sets: u32) -> Result<Transition, ScoringError> {
        if !is_supported_set_count(number_of_sets) {
            return Err(ScoringError::UnsupportedFormat(number_of_sets));
        }
        if self.status == MatchStatus::Cancelled {
            return Err(ScoringError::MatchCancelled);
        }
        if number_of_sets == self.number_of_sets {
            return Ok(Transition::unchanged(self));
        }

        let sets: Vec<SetPoints> = (1..=number_of_sets)
            .map(|set_number| {
                self.sets
                    .iter()
                    .find(|set| set.set_number == set_number)
                    .copied()
                    .unwrap_or_else(|| SetPoints::zero(set_number))
            })
            .collect();

        let next = Self {
            number_of_sets,
            sets,
            ..self.clone()
        };

        for set in &next.sets {
            next.check_set(set)?;
        }

        Ok(Transition {
            state: next.resolved(),
            events: vec![MatchEvent::MatchUpdated],
        })
    }

    pub fn cancel(&self) -> Result<Transition, ScoringError> {
        match self.status {
            MatchStatus::Completed => return Err(ScoringError::MatchCompleted),
            MatchStatus::Cancelled => return Err(ScoringError::MatchCancelled),
            MatchStatus::Scheduled | MatchStatus::Active => {}
        }

        let mut next = self.clone();
        next.status = MatchStatus::Cancelled;

        let mut events = vec![MatchEvent::MatchUpdated];
        if next.timeouts.active.take().is_some() {
            events.push(MatchEvent::TimeoutEnded);
        }

        Ok(Transition {
            state: next,
            events,
        })
    }

    pub fn request_timeout(
        &self,
        team_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Transition, ScoringError> {
        if self.status != MatchStatus::Active {
            return Err(ScoringError::MatchNotActive);
        }

        let mut events = Vec::new();
        let mut next = match self.expire_timeout(now) {
            Some(expired) => {
                events.extend(expired.events);
                expired.state
            }
            None => self.clone(),
        };

        if next.timeouts.active.is_some() {
            return Err(ScoringError::TimeoutAlreadyActive);
        }

        let side = next
            .side_of(team_id)
            .ok_or(ScoringError::TeamNotInMatch(team_id))?;

        if next.timeouts.remaining(side) == 0 {
            return Err(ScoringError::NoTimeoutsRemaining(side));
        }

        next.timeouts.consume(side);
        next.timeouts.active = Some(ActiveTimeout {
            side,
            started_at: now,
        });
        events.push(MatchEvent::TimeoutRequested { side });

        Ok(Transition {
            state: next,
            events,
        })
    }

    pub fn end_timeout(&self) -> Result<Transition, ScoringError> {
        if self.timeouts.active.is_none() {
            return Err(ScoringError::NoActiveTimeout);
        }

        let mut next = self.clone();
        next.timeouts.active = None;

        Ok(Transition {
            state: next,
            events: vec![MatchEvent::TimeoutEnded],
        })
    }

    /// Clears a timeout whose time has run out; `None` when nothing expired.
    pub fn expire_timeout(&self, now: DateTime<Utc>) -> Option<Transition> {
        let active = self.timeouts.active?;
        if !elapsed_exceeds(active.started_at, now, timeout_duration()) {
            return None;
        }

        let mut next = self.clone();
        next.timeouts.active = None;

        Some(Transition {
            state: next,
            events: vec![MatchEvent::TimeoutEnded],
        })
    }

    fn check_set(&self, set: &SetPoints) -> Result<(), ScoringError> {
        if is_set_valid(set.local, set.visitor, set.set_number, self.number_of_sets) {
            Ok(())
        } else {
            Err(ScoringError::InvalidSetScore {
                set_number: set.set_number,
                local: set.local,
                visitor: set.visitor,
                threshold: points_to_win(set.set_number, self.number_of_sets),
            })
        }
    }

    /// Recomputes tally, winner and status from the set list.
    fn resolved(mut self) -> Self {
        self.tally = aggregate_sets(&self.sets, self.number_of_sets);

        match self.tally.decided_for(self.number_of_sets) {
            Some(side) => {
                self.winner = Some(side);
                self.status = MatchStatus::Completed;
            }
            None => {
                self.winner = None;
                let started = self.sets.iter().any(|set| !set.is_blank());
                match self.status {
                    MatchStatus::Completed => self.status = MatchStatus::Active,
                    MatchStatus::Scheduled if started => self.status = MatchStatus::Active,
                    _ => {}
                }
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teams() -> (Uuid, Uuid) {
        (Uuid::new_v4(), Uuid::new_v4())
    }

    fn best_of_three() -> MatchState {
        let (local, visitor) = teams();
        MatchState::scheduled(local, visitor, 3).unwrap()
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_750_000_000 + seconds, 0).unwrap()
    }

    fn active_match() -> MatchState {
        best_of_three()
            .apply_scores(&[SetPoints::new(1, 3, 1)])
            .unwrap()
            .state
    }

    #[test]
    fn test_scheduled_match_has_zeroed_sets() {
        let state = best_of_three();
        assert_eq!(state.sets.len(), 3);
        assert!(state.sets.iter().all(SetPoints::is_blank));
        assert_eq!(state.status, MatchStatus::Scheduled);
        assert!(matches!(
            MatchState::scheduled(Uuid::new_v4(), Uuid::new_v4(), 4),
            Err(ScoringError::UnsupportedFormat(4))
        ));
    }

    #[test]
    fn test_first_point_activates_match() {
        let transition = best_of_three()
            .apply_scores(&[SetPoints::new(1, 1, 0)])
            .unwrap();
        assert_eq!(transition.state.status, MatchStatus::Active);
        assert_eq!(transition.events, vec![MatchEvent::MatchUpdated]);
    }

    #[test]
    fn test_zero_update_keeps_match_scheduled() {
        let transition = best_of_three()
            .apply_scores(&[SetPoints::zero(1)])
            .unwrap();
        assert_eq!(transition.state.status, MatchStatus::Scheduled);
        assert!(transition.events.is_empty());
    }

    #[test]
    fn test_deciding_set_completes_match() {
        let state = best_of_three();
        let transition = state
            .apply_scores(&[
                SetPoints::new(1, 25, 20),
                SetPoints::new(2, 22, 25),
                SetPoints::new(3, 15, 10),
            ])
            .unwrap();

        let next = transition.state;
        assert_eq!(next.tally, SetTally::new(2, 1));
        assert_eq!(next.status, MatchStatus::Completed);
        assert_eq!(next.winner, Some(Side::Local));
        assert_eq!(next.winner_team_id(), Some(state.local_team_id));
    }

    #[test]
    fn test_sweep_completes_match_and_locks_last_set() {
        let next = best_of_three()
            .apply_scores(&[SetPoints::new(1, 25, 10), SetPoints::new(2, 25, 12)])
            .unwrap()
            .state;

        assert_eq!(next.tally, SetTally::new(2, 0));
        assert_eq!(next.status, MatchStatus::Completed);
        assert!(next.is_set_locked(2));
        assert!(!next.is_set_locked(1));

        assert_eq!(
            next.apply_scores(&[SetPoints::new(3, 1, 0)]),
            Err(ScoringError::SetAlreadyDecided(3))
        );
    }

    #[test]
    fn test_unchanged_locked_set_is_accepted() {
        let next = best_of_three()
            .apply_scores(&[SetPoints::new(1, 25, 10), SetPoints::new(2, 25, 12)])
            .unwrap()
            .state;

        let transition = next
            .apply_scores(&[
                SetPoints::new(1, 25, 10),
                SetPoints::new(2, 25, 12),
                SetPoints::zero(3),
            ])
            .unwrap();
        assert!(transition.events.is_empty());
    }

    #[test]
    fn test_invalid_score_is_rejected_without_change() {
        let state = active_match();
        let result = state.apply_scores(&[SetPoints::new(1, 26, 23)]);
        assert_eq!(
            result,
            Err(ScoringError::InvalidSetScore {
                set_number: 1,
                local: 26,
                visitor: 23,
                threshold: 25,
            })
        );
    }

    #[test]
    fn test_unknown_and_duplicate_sets_are_rejected() {
        let state = best_of_three();
        assert_eq!(
            state.apply_scores(&[SetPoints::new(4, 1, 0)]),
            Err(ScoringError::UnknownSet(4))
        );
        assert_eq!(
            state.apply_scores(&[SetPoints::new(1, 1, 0), SetPoints::new(1, 2, 0)]),
            Err(ScoringError::DuplicateSet(1))
        );
    }

    #[test]
    fn test_concluded_set_cannot_increase() {
        let state = best_of_three()
            .apply_scores(&[SetPoints::new(1, 25, 20)])
            .unwrap()
            .state;

        assert_eq!(
            state.apply_scores(&[SetPoints::new(1, 25, 21)]),
            Err(ScoringError::SetAlreadyConcluded(1))
        );

        let corrected = state.apply_scores(&[SetPoints::new(1, 24, 20)]).unwrap().state;
        assert_eq!(corrected.tally, SetTally::new(0, 0));
        assert_eq!(corrected.status, MatchStatus::Active);
    }

    #[test]
    fn test_downward_edit_reopens_completed_match() {
        let completed = best_of_three()
            .apply_scores(&[SetPoints::new(1, 25, 10), SetPoints::new(2, 25, 12)])
            .unwrap()
            .state;

        let reopened = completed
            .apply_scores(&[SetPoints::new(2, 24, 12)])
            .unwrap()
            .state;

        assert_eq!(reopened.status, MatchStatus::Active);
        assert_eq!(reopened.winner, None);
        assert_eq!(reopened.tally, SetTally::new(1, 0));
    }

    #[test]
    fn test_cancelled_match_rejects_edits() {
        let cancelled = active_match().cancel().unwrap().state;
        assert_eq!(cancelled.status, MatchStatus::Cancelled);
        assert_eq!(
            cancelled.apply_scores(&[SetPoints::new(1, 4, 1)]),
            Err(ScoringError::MatchCancelled)
        );
        assert_eq!(cancelled.cancel(), Err(ScoringError::MatchCancelled));
    }

    #[test]
    fn test_completed_match_cannot_be_cancelled() {
        let completed = best_of_three()
            .apply_scores(&[SetPoints::new(1, 25, 10), SetPoints::new(2, 25, 12)])
            .unwrap()
            .state;
        assert_eq!(completed.cancel(), Err(ScoringError::MatchCompleted));
    }

    #[test]
    fn test_format_change_keeps_existing_points() {
        let state = best_of_three()
            .apply_scores(&[SetPoints::new(1, 25, 20), SetPoints::new(2, 10, 8)])
            .unwrap()
            .state;

        let next = state.change_format(5).unwrap().state;
        assert_eq!(next.sets.len(), 5);
        assert_eq!(next.sets[0], SetPoints::new(1, 25, 20));
        assert_eq!(next.sets[1], SetPoints::new(2, 10, 8));
        assert!(next.sets[2..].iter().all(SetPoints::is_blank));
        assert_eq!(next.tally, SetTally::new(1, 0));
    }

    #[test]
    fn test_format_change_revalidates_thresholds() {
        let state = best_of_three()
            .apply_scores(&[SetPoints::new(3, 20, 18)])
            .unwrap()
            .state;

        // Set 3 is not the deciding set of a best-of-5, so 20-18 is fine there.
        let widened = state.change_format(5).unwrap().state;
        assert_eq!(widened.tally, SetTally::default());

        let state = MatchState::scheduled(Uuid::new_v4(), Uuid::new_v4(), 5)
            .unwrap()
            .apply_scores(&[SetPoints::new(3, 20, 10)])
            .unwrap()
            .state;
        assert!(matches!(
            state.change_format(3),
            Err(ScoringError::InvalidSetScore { set_number: 3, threshold: 15, .. })
        ));
    }

    #[test]
    fn test_timeout_rejected_unless_active() {
        let state = best_of_three();
        assert_eq!(state.timeouts.remaining(Side::Local), TIMEOUTS_PER_MATCH);
        assert_eq!(
            state.request_timeout(state.local_team_id, at(0)),
            Err(ScoringError::MatchNotActive)
        );
    }

    #[test]
    fn test_timeout_lifecycle() {
        let state = active_match();
        let requested = state.request_timeout(state.visitor_team_id, at(0)).unwrap();

        assert_eq!(
            requested.events,
            vec![MatchEvent::TimeoutRequested {
                side: Side::Visitor
            }]
        );
        let next = requested.state;
        assert_eq!(next.timeouts.visitor_remaining, 1);
        assert_eq!(next.timeouts.local_remaining, 2);
        assert_eq!(next.timeout_seconds_left(at(12)), Some(18));

        assert_eq!(
            next.request_timeout(next.local_team_id, at(5)),
            Err(ScoringError::TimeoutAlreadyActive)
        );

        let ended = next.end_timeout().unwrap();
        assert_eq!(ended.events, vec![MatchEvent::TimeoutEnded]);
        assert!(ended.state.timeouts.active.is_none());
        assert_eq!(ended.state.end_timeout(), Err(ScoringError::NoActiveTimeout));
    }

    #[test]
    fn test_timeout_expires_after_thirty_seconds() {
        let state = active_match();
        let next = state
            .request_timeout(state.local_team_id, at(0))
            .unwrap()
            .state;

        assert!(next.expire_timeout(at(29)).is_none());
        let expired = next.expire_timeout(at(30)).unwrap();
        assert!(expired.state.timeouts.active.is_none());

        let again = next.request_timeout(next.visitor_team_id, at(45)).unwrap();
        assert_eq!(
            again.events,
            vec![
                MatchEvent::TimeoutEnded,
                MatchEvent::TimeoutRequested {
                    side: Side::Visitor
                }
            ]
        );
    }

    #[test]
    fn test_timeouts_run_out() {
        let mut state = active_match();
        let local = state.local_team_id;
        for round in 0..2 {
            state = state.request_timeout(local, at(round * 60)).unwrap().state;
            state = state.end_timeout().unwrap().state;
        }

        assert_eq!(
            state.request_timeout(local, at(500)),
            Err(ScoringError::NoTimeoutsRemaining(Side::Local))
        );
    }

    #[test]
    fn test_timeout_for_foreign_team_is_rejected() {
        let state = active_match();
        let stranger = Uuid::new_v4();
        assert_eq!(
            state.request_timeout(stranger, at(0)),
            Err(ScoringError::TeamNotInMatch(stranger))
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(ScoringError::SetAlreadyDecided(3).is_conflict());
        assert!(ScoringError::MatchNotActive.is_conflict());
        assert!(!ScoringError::UnknownSet(9).is_conflict());
        assert!(!ScoringError::TeamNotInMatch(Uuid::nil()).is_conflict());
    }
}
