//! Point thresholds and set outcome rules for best-of-N volleyball matches.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Points needed to take a regular set.
pub const REGULAR_SET_POINTS: u32 = 25;

/// Points needed to take the deciding set of the match format.
pub const DECIDING_SET_POINTS: u32 = 15;

/// A set is only won with at least this lead.
pub const WINNING_MARGIN: u32 = 2;

/// Supported best-of formats.
pub const SUPPORTED_SET_COUNTS: &[u32] = &[3, 5];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Local,
    Visitor,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Self::Local => Self::Visitor,
            Self::Visitor => Self::Local,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Visitor => "visitor",
        }
    }
}

/// Point tally of one set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SetPoints {
    pub set_number: u32,
    pub local: u32,
    pub visitor: u32,
}

impl SetPoints {
    pub fn new(set_number: u32, local: u32, visitor: u32) -> Self {
        Self {
            set_number,
            local,
            visitor,
        }
    }

    pub fn zero(set_number: u32) -> Self {
        Self::new(set_number, 0, 0)
    }

    pub fn points(&self, side: Side) -> u32 {
        match side {
            Side::Local => self.local,
            Side::Visitor => self.visitor,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.local == 0 && self.visitor == 0
    }
}

/// Sets won by each side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SetTally {
    pub local: u32,
    pub visitor: u32,
}

impl SetTally {
    pub fn new(local: u32, visitor: u32) -> Self {
        Self { local, visitor }
    }

    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::Local => self.local,
            Side::Visitor => self.visitor,
        }
    }

    /// The side that has already taken `sets_to_win` sets, if any.
    pub fn decided_for(&self, number_of_sets: u32) -> Option<Side> {
        let needed = sets_to_win(number_of_sets);
        if self.local >= needed {
            Some(Side::Local)
        } else if self.visitor >= needed {
            Some(Side::Visitor)
        } else {
            None
        }
    }

    fn record(&mut self, side: Side) {
        match side {
            Side::Local => self.local += 1,
            Side::Visitor => self.visitor += 1,
        }
    }
}

pub fn is_supported_set_count(number_of_sets: u32) -> bool {
    SUPPORTED_SET_COUNTS.contains(&number_of_sets)
}

/// Sets a side must take to win the match (2 of 3, 3 of 5).
pub fn sets_to_win(number_of_sets: u32) -> u32 {
    number_of_sets.div_ceil(2)
}

/// The deciding set of the format is played to 15, every other set to 25.
pub fn points_to_win(set_number: u32, number_of_sets: u32) -> u32 {
    if set_number == number_of_sets {
        DECIDING_SET_POINTS
    } else {
        REGULAR_SET_POINTS
    }
}

/// Side that has taken the set: at or over the threshold with the required lead.
pub fn set_winner(local: u32, visitor: u32, set_number: u32, number_of_sets: u32) -> Option<Side> {
    let threshold = points_to_win(set_number, number_of_sets);

    if local >= threshold && local >= visitor + WINNING_MARGIN {
        Some(Side::Local)
    } else if visitor >= threshold && visitor >= local + WINNING_MARGIN {
        Some(Side::Visitor)
    } else {
        None
    }
}

pub fn is_set_concluded(local: u32, visitor: u32, set_number: u32, number_of_sets: u32) -> bool {
    set_winner(local, visitor, set_number, number_of_sets).is_some()
}

/// Whether a tally can occur in a real set, finished or not.
///
/// Below the threshold anything goes. Reaching the threshold exactly is always
/// reachable (a clean win, a deuce, or a tie). Past the threshold the set must
/// still be in deuce or have just been won, so the leader is at most
/// `WINNING_MARGIN` ahead: 26-24 is a win, 26-23 can never happen.
pub fn is_set_valid(local: u32, visitor: u32, set_number: u32, number_of_sets: u32) -> bool {
    let threshold = points_to_win(set_number, number_of_sets);
    let high = local.max(visitor);
    let low = local.min(visitor);

    if high <= threshold {
        return true;
    }

    high - low <= WINNING_MARGIN
}

/// Counts concluded sets per side; unfinished sets count for nobody.
pub fn aggregate_sets(sets: &[SetPoints], number_of_sets: u32) -> SetTally {
    sets.iter().fold(SetTally::default(), |mut tally, set| {
        if let Some(side) = set_winner(set.local, set.visitor, set.set_number, number_of_sets) {
            tally.record(side);
        }
        tally
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_follow_format() {
        assert_eq!(points_to_win(1, 3), 25);
        assert_eq!(points_to_win(2, 3), 25);
        assert_eq!(points_to_win(3, 3), 15);
        assert_eq!(points_to_win(3, 5), 25);
        assert_eq!(points_to_win(5, 5), 15);
        assert_eq!(sets_to_win(3), 2);
        assert_eq!(sets_to_win(5), 3);
    }

    #[test]
    fn test_valid_scores() {
        assert!(is_set_valid(0, 0, 1, 3));
        assert!(is_set_valid(24, 3, 1, 3));
        assert!(is_set_valid(25, 23, 1, 3));
        assert!(is_set_valid(26, 24, 1, 3));
        assert!(is_set_valid(25, 24, 1, 3));
        assert!(is_set_valid(24, 24, 1, 3));
        assert!(is_set_valid(31, 31, 1, 3));
        assert!(is_set_valid(32, 31, 2, 3));
        assert!(is_set_valid(25, 0, 2, 5));
        assert!(is_set_valid(15, 13, 3, 3));
    }

    #[test]
    fn test_unreachable_scores_are_rejected() {
        assert!(!is_set_valid(26, 23, 1, 3));
        assert!(!is_set_valid(23, 26, 1, 3));
        assert!(!is_set_valid(30, 10, 1, 3));
        assert!(!is_set_valid(16, 13, 3, 3));
        assert!(!is_set_valid(20, 10, 5, 5));
    }

    #[test]
    fn test_validity_is_symmetric() {
        for local in 0..35 {
            for visitor in 0..35 {
                assert_eq!(
                    is_set_valid(local, visitor, 1, 5),
                    is_set_valid(visitor, local, 1, 5)
                );
            }
        }
    }

    #[test]
    fn test_set_concluded_requires_threshold_and_margin() {
        assert!(is_set_concluded(25, 23, 1, 3));
        assert!(is_set_concluded(27, 25, 2, 3));
        assert!(is_set_concluded(15, 9, 3, 3));
        assert!(!is_set_concluded(25, 24, 1, 3));
        assert!(!is_set_concluded(24, 10, 1, 3));
        assert!(!is_set_concluded(15, 9, 3, 5));
        assert_eq!(set_winner(21, 25, 1, 3), Some(Side::Visitor));
    }

    #[test]
    fn test_aggregate_counts_only_concluded_sets() {
        let sets = [
            SetPoints::new(1, 25, 20),
            SetPoints::new(2, 22, 25),
            SetPoints::new(3, 15, 10),
        ];
        assert_eq!(aggregate_sets(&sets, 3), SetTally::new(2, 1));

        let unfinished = [SetPoints::new(1, 25, 20), SetPoints::new(2, 24, 23)];
        assert_eq!(aggregate_sets(&unfinished, 3), SetTally::new(1, 0));
    }

    #[test]
    fn test_tally_decision() {
        assert_eq!(SetTally::new(2, 1).decided_for(3), Some(Side::Local));
        assert_eq!(SetTally::new(2, 2).decided_for(5), None);
        assert_eq!(SetTally::new(1, 3).decided_for(5), Some(Side::Visitor));
    }
}
