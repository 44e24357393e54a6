//! Round-robin fixture generation (circle method) for leagues and group stages.

use chrono::{Days, NaiveDate};
use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;
use uuid::Uuid;

use crate::models::tournament::TournamentType;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("At least 2 teams are needed to generate matches, found {0}")]
    NotEnoughTeams(usize),

    #[error("The number of groups must be at least 1")]
    InvalidGroupCount,

    #[error("{groups} groups need at least {needed} teams, found {found}")]
    NotEnoughTeamsForGroups {
        groups: usize,
        needed: usize,
        found: usize,
    },

    #[error("Matches cannot be generated automatically for {0} tournaments")]
    UnsupportedTournamentType(&'static str),
}

/// One generated pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub local_team_id: Uuid,
    pub visitor_team_id: Uuid,
    /// 1-based round number.
    pub round: u32,
    pub phase: String,
    pub match_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPlan {
    pub name: String,
    pub team_ids: Vec<Uuid>,
    pub fixtures: Vec<Fixture>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    League(Vec<Fixture>),
    Groups(Vec<GroupPlan>),
}

impl Schedule {
    pub fn fixture_count(&self) -> usize {
        match self {
            Self::League(fixtures) => fixtures.len(),
            Self::Groups(groups) => groups.iter().map(|g| g.fixtures.len()).sum(),
        }
    }
}

/// Pairings per round. Odd rosters get a bye slot, and pairings against it are skipped.
pub fn round_robin(team_ids: &[Uuid]) -> Vec<Vec<(Uuid, Uuid)>> {
    let mut slots: Vec<Option<Uuid>> = team_ids.iter().copied().map(Some).collect();
    if slots.len() % 2 != 0 {
        slots.push(None);
    }

    let n = slots.len();
    if n < 2 {
        return Vec::new();
    }

    let mut rounds = Vec::with_capacity(n - 1);
    for _ in 0..n - 1 {
        let pairs = (0..n / 2)
            .filter_map(|i| match (slots[i], slots[n - 1 - i]) {
                (Some(local), Some(visitor)) => Some((local, visitor)),
                _ => None,
            })
            .collect();
        rounds.push(pairs);

        // position 0 stays fixed
        if let Some(last) = slots.pop() {
            slots.insert(1, last);
        }
    }

    rounds
}

/// Date of each round, spread evenly from `start` to `end`.
pub fn round_dates(start: NaiveDate, end: NaiveDate, rounds: usize) -> Vec<NaiveDate> {
    if start > end || rounds <= 1 {
        return vec![start; rounds];
    }

    let span = (end - start).num_days() as f64;
    let interval = span / (rounds - 1) as f64;

    (0..rounds)
        .map(|round| {
            let offset = (round as f64 * interval).round() as u64;
            start.checked_add_days(Days::new(offset)).unwrap_or(end)
        })
        .collect()
}

pub fn generate_league(
    team_ids: &[Uuid],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Fixture>, ScheduleError> {
    if team_ids.len() < 2 {
        return Err(ScheduleError::NotEnoughTeams(team_ids.len()));
    }

    let rounds = round_robin(team_ids);
    let dates = round_dates(start, end, rounds.len());

    let fixtures = rounds
        .into_iter()
        .zip(dates)
        .enumerate()
        .flat_map(|(index, (pairs, date))| {
            let round = index as u32 + 1;
            pairs.into_iter().map(move |(local, visitor)| Fixture {
                local_team_id: local,
                visitor_team_id: visitor,
                round,
                phase: format!("Round {}", round),
                match_date: Some(date),
            })
        })
        .collect();

    Ok(fixtures)
}

/// "Group A", "Group B", ...; past Z the index is spelled out.
pub fn group_name(index: usize) -> String {
    match u8::try_from(index) {
        Ok(offset) if offset < 26 => format!("Group {}", char::from(b'A' + offset)),
        _ => format!("Group {}", index + 1),
    }
}

/// Shuffles the roster and deals it into `number_of_groups` buckets.
pub fn partition_groups<R: Rng + ?Sized>(
    team_ids: &[Uuid],
    number_of_groups: usize,
    rng: &mut R,
) -> Result<Vec<Vec<Uuid>>, ScheduleError> {
    if number_of_groups == 0 {
        return Err(ScheduleError::InvalidGroupCount);
    }

    let needed = number_of_groups * 2;
    if team_ids.len() < needed {
        return Err(ScheduleError::NotEnoughTeamsForGroups {
            groups: number_of_groups,
            needed,
            found: team_ids.len(),
        });
    }

    let mut shuffled = team_ids.to_vec();
    shuffled.shuffle(rng);

    let mut buckets = vec![Vec::new(); number_of_groups];
    for (index, team_id) in shuffled.into_iter().enumerate() {
        buckets[index % number_of_groups].push(team_id);
    }

    Ok(buckets)
}

/// Group-stage plan. Fixtures are paired within each group and left undated.
pub fn generate_group_stage<R: Rng + ?Sized>(
    team_ids: &[Uuid],
    number_of_groups: usize,
    rng: &mut R,
) -> Result<Vec<GroupPlan>, ScheduleError> {
    let buckets = partition_groups(team_ids, number_of_groups, rng)?;

    let groups = buckets
        .into_iter()
        .enumerate()
        .map(|(index, members)| {
            let name = group_name(index);
            let fixtures = round_robin(&members)
                .into_iter()
                .enumerate()
                .flat_map(|(round_index, pairs)| {
                    let round = round_index as u32 + 1;
                    let phase = format!("{} - Round {}", name, round);
                    pairs.into_iter().map(move |(local, visitor)| Fixture {
                        local_team_id: local,
                        visitor_team_id: visitor,
                        round,
                        phase: phase.clone(),
                        match_date: None,
                    })
                })
                .collect();

            GroupPlan {
                name,
                team_ids: members,
                fixtures,
            }
        })
        .collect();

    Ok(groups)
}

/// Builds the full schedule for a tournament of the given type.
pub fn plan<R: Rng + ?Sized>(
    tournament_type: TournamentType,
    team_ids: &[Uuid],
    start: NaiveDate,
    end: NaiveDate,
    number_of_groups: Option<usize>,
    rng: &mut R,
) -> Result<Schedule, ScheduleError> {
    match tournament_type {
        TournamentType::League => generate_league(team_ids, start, end).map(Schedule::League),
        TournamentType::GroupStage => {
            generate_group_stage(team_ids, number_of_groups.unwrap_or(1), rng).map(Schedule::Groups)
        }
        TournamentType::Knockout => Err(ScheduleError::UnsupportedTournamentType(
            TournamentType::Knockout.as_str(),
        )),
    }
}
