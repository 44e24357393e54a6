//! Tournament standings derived from completed matches.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Serialize, Serializer};
use utoipa::ToSchema;
use uuid::Uuid;

use super::set_rules::{SetTally, Side, sets_to_win};

#[derive(Debug, Clone)]
pub struct StandingsTeam {
    pub team_id: Uuid,
    pub name: String,
    pub logo_url: Option<String>,
}

/// The parts of a completed match the table needs.
#[derive(Debug, Clone, Copy)]
pub struct MatchResult {
    pub local_team_id: Uuid,
    pub visitor_team_id: Uuid,
    pub number_of_sets: u32,
    pub tally: SetTally,
    pub winner: Side,
}

/// Ranking points for winner and loser.
///
/// A win that went to the deciding set is worth 2-1, any other win 3-0. A winner
/// without exactly `sets_to_win` sets earns nothing for either side.
pub fn match_points(winner_sets: u32, loser_sets: u32, number_of_sets: u32) -> (u32, u32) {
    let needed = sets_to_win(number_of_sets);
    if winner_sets != needed {
        return (0, 0);
    }

    if loser_sets == needed - 1 { (2, 1) } else { (3, 0) }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StandingsRow {
    pub position: u32,
    pub team_id: Uuid,
    pub team_name: String,
    pub team_logo: Option<String>,
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    pub points: u32,
    pub sets_for: u32,
    pub sets_against: u32,
    pub set_difference: i64,
    /// `sets_for / sets_against`; the string `"Infinity"` when no set was conceded.
    #[serde(serialize_with = "serialize_ratio")]
    #[schema(value_type = f64)]
    pub set_ratio: f64,
}

fn serialize_ratio<S: Serializer>(ratio: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if ratio.is_finite() {
        serializer.serialize_f64(*ratio)
    } else {
        serializer.serialize_str("Infinity")
    }
}

impl StandingsRow {
    fn empty(team: &StandingsTeam) -> Self {
        Self {
            position: 0,
            team_id: team.team_id,
            team_name: team.name.clone(),
            team_logo: team.logo_url.clone(),
            played: 0,
            won: 0,
            lost: 0,
            points: 0,
            sets_for: 0,
            sets_against: 0,
            set_difference: 0,
            set_ratio: 0.0,
        }
    }

    fn record(&mut self, sets_for: u32, sets_against: u32) {
        self.played += 1;
        self.sets_for += sets_for;
        self.sets_against += sets_against;
    }

    fn finish(&mut self) {
        self.set_difference = i64::from(self.sets_for) - i64::from(self.sets_against);
        self.set_ratio = match (self.sets_for, self.sets_against) {
            (_, 0) if self.sets_for > 0 => f64::INFINITY,
            (_, 0) => 0.0,
            (won, lost) => f64::from(won) / f64::from(lost),
        };
    }
}

/// Points, then wins, set ratio, set difference, and name ascending.
pub fn compare_rows(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.won.cmp(&a.won))
        .then_with(|| b.set_ratio.total_cmp(&a.set_ratio))
        .then_with(|| b.set_difference.cmp(&a.set_difference))
        .then_with(|| a.team_name.cmp(&b.team_name))
}

/// Ranked table for the given roster. Matches against teams no longer on the
/// roster are ignored.
pub fn compute_standings(teams: &[StandingsTeam], results: &[MatchResult]) -> Vec<StandingsRow> {
    let mut rows: HashMap<Uuid, StandingsRow> = teams
        .iter()
        .map(|team| (team.team_id, StandingsRow::empty(team)))
        .collect();

    for result in results {
        if !rows.contains_key(&result.local_team_id) || !rows.contains_key(&result.visitor_team_id) {
            continue;
        }

        let winner_id = match result.winner {
            Side::Local => result.local_team_id,
            Side::Visitor => result.visitor_team_id,
        };
        let loser_id = match result.winner {
            Side::Local => result.visitor_team_id,
            Side::Visitor => result.local_team_id,
        };
        let winner_sets = result.tally.get(result.winner);
        let loser_sets = result.tally.get(result.winner.opponent());
        let (winner_points, loser_points) =
            match_points(winner_sets, loser_sets, result.number_of_sets);

        if let Some(row) = rows.get_mut(&winner_id) {
            row.record(winner_sets, loser_sets);
            row.won += 1;
            row.points += winner_points;
        }
        if let Some(row) = rows.get_mut(&loser_id) {
            row.record(loser_sets, winner_sets);
            row.lost += 1;
            row.points += loser_points;
        }
    }

    let mut table: Vec<StandingsRow> = rows.into_values().collect();
    table.iter_mut().for_each(StandingsRow::finish);
    table.sort_by(compare_rows);

    for (index, row) in table.iter_mut().enumerate() {
        row.position = index as u32 + 1;
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(name: &str) -> StandingsTeam {
        StandingsTeam {
            team_id: Uuid::new_v4(),
            name: name.to_string(),
            logo_url: None,
        }
    }

    fn result(local: &StandingsTeam, visitor: &StandingsTeam, sets: (u32, u32), n: u32) -> MatchResult {
        let tally = SetTally::new(sets.0, sets.1);
        MatchResult {
            local_team_id: local.team_id,
            visitor_team_id: visitor.team_id,
            number_of_sets: n,
            tally,
            winner: if sets.0 > sets.1 { Side::Local } else { Side::Visitor },
        }
    }

    fn row<'a>(table: &'a [StandingsRow], t: &StandingsTeam) -> &'a StandingsRow {
        table.iter().find(|r| r.team_id == t.team_id).unwrap()
    }

    #[test]
    fn test_match_points() {
        assert_eq!(match_points(2, 1, 3), (2, 1));
        assert_eq!(match_points(2, 0, 3), (3, 0));
        assert_eq!(match_points(3, 2, 5), (2, 1));
        assert_eq!(match_points(3, 1, 5), (3, 0));
        assert_eq!(match_points(3, 0, 5), (3, 0));
        assert_eq!(match_points(1, 0, 3), (0, 0));
    }

    #[test]
    fn test_empty_tournament_is_alphabetical() {
        let teams = vec![team("Tigres"), team("Aguilas"), team("Osos")];
        let table = compute_standings(&teams, &[]);

        let names: Vec<_> = table.iter().map(|r| r.team_name.as_str()).collect();
        assert_eq!(names, vec!["Aguilas", "Osos", "Tigres"]);
        assert!(table.iter().all(|r| r.played == 0 && r.points == 0));
        assert_eq!(table[0].position, 1);
        assert_eq!(table[2].position, 3);
    }

    #[test]
    fn test_deciding_set_and_sweep_points() {
        let a = team("A");
        let b = team("B");
        let c = team("C");
        let teams = vec![a.clone(), b.clone(), c.clone()];
        let results = vec![result(&a, &b, (2, 1), 3), result(&c, &a, (0, 2), 3)];

        let table = compute_standings(&teams, &results);

        let ra = row(&table, &a);
        assert_eq!((ra.played, ra.won, ra.lost, ra.points), (2, 2, 0, 5));
        assert_eq!((ra.sets_for, ra.sets_against), (4, 1));
        assert_eq!(ra.set_difference, 3);
        assert_eq!(ra.set_ratio, 4.0);

        let rb = row(&table, &b);
        assert_eq!((rb.played, rb.lost, rb.points), (1, 1, 1));

        let rc = row(&table, &c);
        assert_eq!((rc.points, rc.set_ratio), (0, 0.0));

        assert_eq!(table[0].team_id, a.team_id);
        assert_eq!(table[1].team_id, b.team_id);
    }

    #[test]
    fn test_ratio_breaks_points_and_wins_tie() {
        let a = team("A");
        let b = team("B");
        let c = team("C");
        let d = team("D");
        let teams = vec![a.clone(), b.clone(), c.clone(), d.clone()];
        // A and B both take 3 points from one win; B concedes no set.
        let results = vec![
            result(&a, &c, (3, 1), 5),
            result(&b, &d, (3, 0), 5),
        ];

        let table = compute_standings(&teams, &results);
        assert_eq!(table[0].team_id, b.team_id);
        assert!(table[0].set_ratio.is_infinite());
        assert_eq!(table[1].team_id, a.team_id);
    }

    #[test]
    fn test_matches_with_removed_teams_are_skipped() {
        let a = team("A");
        let gone = team("Gone");
        let table = compute_standings(&[a.clone()], &[result(&a, &gone, (2, 0), 3)]);
        assert_eq!(row(&table, &a).played, 0);
    }

    #[test]
    fn test_infinite_ratio_serializes_as_string() {
        let a = team("A");
        let b = team("B");
        let table = compute_standings(&[a.clone(), b.clone()], &[result(&a, &b, (2, 0), 3)]);

        let winner = serde_json::to_value(row(&table, &a)).unwrap();
        assert_eq!(winner["set_ratio"], "Infinity");

        let loser = serde_json::to_value(row(&table, &b)).unwrap();
        assert_eq!(loser["set_ratio"], 0.0);
    }
}
