use sqlx::PgPool;
use storage::{
    dto::tournament::{
        CreateTournamentRequest, GenerateMatchesRequest, GenerationSummary, StandingsResponse,
        UpdateTournamentRequest,
    },
    error::{Result, StorageError},
    models::{AuditAction, Team, Tournament, TournamentGroup},
    repository::{
        AuditLogRepository, MatchRepository, TournamentRepository,
        matches::{MatchWithSets, NewMatch},
    },
    services::{
        schedule::{Fixture, Schedule, plan},
        standings::{MatchResult, StandingsTeam, compute_standings},
    },
};
use uuid::Uuid;

use crate::features::snapshot;

const ENTITY: &str = "tournament";

pub async fn list_tournaments(pool: &PgPool) -> Result<Vec<Tournament>> {
    TournamentRepository::new(pool).list().await
}

pub async fn get_tournament(pool: &PgPool, id: Uuid) -> Result<Tournament> {
    TournamentRepository::new(pool).find_by_id(id).await
}

pub async fn create_tournament(
    pool: &PgPool,
    request: &CreateTournamentRequest,
) -> Result<Tournament> {
    let mut tx = pool.begin().await?;

    let tournament = TournamentRepository::new(pool).create(&mut tx, request).await?;
    AuditLogRepository::new(pool)
        .record(
            &mut tx,
            AuditAction::Create,
            ENTITY,
            Some(tournament.tournament_id),
            None,
            snapshot(&tournament),
        )
        .await?;

    tx.commit().await?;
    Ok(tournament)
}

/// Update a tournament; the resulting date range must stay ordered
pub async fn update_tournament(
    pool: &PgPool,
    id: Uuid,
    request: &UpdateTournamentRequest,
) -> Result<Tournament> {
    let repo = TournamentRepository::new(pool);
    let mut tx = pool.begin().await?;

    let old = repo.lock(&mut tx, id).await?;
    request
        .validate_dates(old.start_date, old.end_date)
        .map_err(|e| StorageError::InvalidInput(e.to_string()))?;

    let tournament = repo.update(&mut tx, id, request).await?;
    AuditLogRepository::new(pool)
        .record(
            &mut tx,
            AuditAction::Update,
            ENTITY,
            Some(id),
            snapshot(&old),
            snapshot(&tournament),
        )
        .await?;

    tx.commit().await?;
    Ok(tournament)
}

pub async fn delete_tournament(pool: &PgPool, id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;

    let tournament = TournamentRepository::new(pool).delete(&mut tx, id).await?;
    AuditLogRepository::new(pool)
        .record(&mut tx, AuditAction::Delete, ENTITY, Some(id), snapshot(&tournament), None)
        .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn list_teams(pool: &PgPool, id: Uuid) -> Result<Vec<Team>> {
    let repo = TournamentRepository::new(pool);
    repo.find_by_id(id).await?;
    repo.list_teams(id).await
}

pub async fn add_team(pool: &PgPool, id: Uuid, team_id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;

    TournamentRepository::new(pool)
        .add_team(&mut tx, id, team_id)
        .await?;
    AuditLogRepository::new(pool)
        .record(
            &mut tx,
            AuditAction::Create,
            "tournament_team",
            Some(id),
            None,
            Some(serde_json::json!({ "tournament_id": id, "team_id": team_id })),
        )
        .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn remove_team(pool: &PgPool, id: Uuid, team_id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;

    TournamentRepository::new(pool)
        .remove_team(&mut tx, id, team_id)
        .await?;
    AuditLogRepository::new(pool)
        .record(
            &mut tx,
            AuditAction::Delete,
            "tournament_team",
            Some(id),
            Some(serde_json::json!({ "tournament_id": id, "team_id": team_id })),
            None,
        )
        .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn list_groups(pool: &PgPool, id: Uuid) -> Result<Vec<TournamentGroup>> {
    let repo = TournamentRepository::new(pool);
    repo.find_by_id(id).await?;
    repo.list_groups(id).await
}

fn new_match(
    tournament: &Tournament,
    number_of_sets: u32,
    group_id: Option<Uuid>,
    fixture: Fixture,
) -> NewMatch {
    NewMatch {
        tournament_id: tournament.tournament_id,
        group_id,
        local_team_id: fixture.local_team_id,
        visitor_team_id: fixture.visitor_team_id,
        number_of_sets,
        match_date: fixture.match_date,
        match_time: None,
        location: tournament.location.clone(),
        phase: Some(fixture.phase),
    }
}

/// Replaces the tournament's schedule with a freshly generated one.
///
/// Existing matches and groups are dropped and the new ones inserted in a single
/// transaction, so a failure keeps the previous schedule.
pub async fn generate_matches(
    pool: &PgPool,
    id: Uuid,
    request: &GenerateMatchesRequest,
) -> Result<GenerationSummary> {
    let tournaments = TournamentRepository::new(pool);
    let matches = MatchRepository::new(pool);
    let mut tx = pool.begin().await?;

    let tournament = tournaments.lock(&mut tx, id).await?;
    let number_of_sets = tournament.default_sets()?;
    let team_ids = tournaments.team_ids(&mut tx, id).await?;

    let schedule = plan(
        tournament.kind()?,
        &team_ids,
        tournament.start_date,
        tournament.end_date,
        request.number_of_groups.map(|n| n as usize),
        &mut rand::thread_rng(),
    )?;

    let removed = matches.delete_for_tournament(&mut tx, id).await?;
    tournaments.delete_groups(&mut tx, id).await?;

    let matches_created = schedule.fixture_count();
    let mut groups_created = 0;

    match schedule {
        Schedule::League(fixtures) => {
            for fixture in fixtures {
                let new = new_match(&tournament, number_of_sets, None, fixture);
                matches.create(&mut tx, &new).await?;
            }
        }
        Schedule::Groups(groups) => {
            for group in groups {
                let created = tournaments.create_group(&mut tx, id, &group.name).await?;
                groups_created += 1;
                for fixture in group.fixtures {
                    let new = new_match(&tournament, number_of_sets, Some(created.group_id), fixture);
                    matches.create(&mut tx, &new).await?;
                }
            }
        }
    }

    AuditLogRepository::new(pool)
        .record(
            &mut tx,
            AuditAction::Create,
            "schedule",
            Some(id),
            Some(serde_json::json!({ "matches": removed })),
            Some(serde_json::json!({ "matches": matches_created, "groups": groups_created })),
        )
        .await?;

    tx.commit().await?;

    tracing::info!(
        tournament_id = %id,
        matches_created,
        groups_created,
        replaced = removed,
        "Schedule generated"
    );

    Ok(GenerationSummary {
        tournament_id: id,
        matches_created,
        groups_created,
    })
}

/// Table of the tournament's registered teams over its completed matches
pub async fn standings(pool: &PgPool, id: Uuid) -> Result<StandingsResponse> {
    let tournaments = TournamentRepository::new(pool);
    let match_repo = MatchRepository::new(pool);

    let tournament = tournaments.find_by_id(id).await?;
    let teams: Vec<StandingsTeam> = tournaments
        .list_teams(id)
        .await?
        .into_iter()
        .map(|team| StandingsTeam {
            team_id: team.team_id,
            name: team.name,
            logo_url: team.logo_url,
        })
        .collect();

    let completed = match_repo.list_completed(id).await?;

    let mut results = Vec::with_capacity(completed.len());
    for MatchWithSets { row, sets } in &completed {
        let state = row.to_state(sets)?;
        let Some(winner) = state.winner else {
            return Err(StorageError::Corrupt(format!(
                "completed match {} has no winner",
                row.match_id
            )));
        };
        results.push(MatchResult {
            local_team_id: state.local_team_id,
            visitor_team_id: state.visitor_team_id,
            number_of_sets: state.number_of_sets,
            tally: state.tally,
            winner,
        });
    }

    Ok(StandingsResponse {
        tournament_id: tournament.tournament_id,
        tournament_name: tournament.name,
        standings: compute_standings(&teams, &results),
    })
}
