//! Postgres fixtures shared by the database tests.
//!
//! The tests run against the database named by `DATABASE_URL` and are skipped
//! when it is unset. Every fixture gets unique names, so tests can share one
//! database and run in parallel.

#![allow(dead_code)]

use chrono::NaiveDate;
use sqlx::PgPool;
use storage::{
    Database,
    dto::{player::CreatePlayerRequest, team::CreateTeamRequest, tournament::CreateTournamentRequest},
    models::{Match, Player, Team, Tournament, TournamentStatus, TournamentType},
    repository::{
        MatchRepository, PlayerRepository, TeamRepository, TournamentRepository,
        matches::NewMatch,
    },
};
use uuid::Uuid;

pub async fn test_pool() -> Option<PgPool> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL is not set, skipping database test");
        return None;
    };

    let db = Database::with_max_connections(&url, 8)
        .await
        .expect("Failed to connect to test database");
    db.run_migrations()
        .await
        .expect("Failed to migrate test database");

    Some(db.pool().clone())
}

fn unique(prefix: &str) -> String {
    format!("{prefix} {}", Uuid::new_v4().simple())
}

pub async fn create_team(pool: &PgPool) -> Team {
    let mut tx = pool.begin().await.unwrap();
    let team = TeamRepository::new(pool)
        .create(
            &mut tx,
            &CreateTeamRequest {
                name: unique("Club"),
                coach_name: None,
                logo_url: None,
            },
        )
        .await
        .unwrap();
    tx.commit().await.unwrap();
    team
}

pub async fn create_player(pool: &PgPool, team_id: Option<Uuid>) -> Player {
    let mut tx = pool.begin().await.unwrap();
    let player = PlayerRepository::new(pool)
        .create(
            &mut tx,
            &CreatePlayerRequest {
                first_name: "Ana".to_string(),
                last_name: "Rojas".to_string(),
                national_id: unique("DNI"),
                team_id,
                jersey_number: None,
                position: None,
            },
        )
        .await
        .unwrap();
    tx.commit().await.unwrap();
    player
}

/// A league tournament with `teams` registered teams.
pub async fn create_tournament(pool: &PgPool, teams: usize) -> (Tournament, Vec<Team>) {
    let repo = TournamentRepository::new(pool);
    let mut registered = Vec::with_capacity(teams);
    for _ in 0..teams {
        registered.push(create_team(pool).await);
    }

    let mut tx = pool.begin().await.unwrap();
    let tournament = repo
        .create(
            &mut tx,
            &CreateTournamentRequest {
                name: unique("Liga"),
                location: Some("Coliseo Municipal".to_string()),
                description: None,
                start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 4, 30).unwrap(),
                tournament_type: TournamentType::League,
                status: TournamentStatus::Scheduled,
                default_number_of_sets: 3,
            },
        )
        .await
        .unwrap();
    for team in &registered {
        repo.add_team(&mut tx, tournament.tournament_id, team.team_id)
            .await
            .unwrap();
    }
    tx.commit().await.unwrap();

    (tournament, registered)
}

/// A scheduled best-of-3 match between the first two teams.
pub async fn create_match(pool: &PgPool, tournament: &Tournament, teams: &[Team]) -> Match {
    let mut tx = pool.begin().await.unwrap();
    let created = MatchRepository::new(pool)
        .create(
            &mut tx,
            &NewMatch {
                tournament_id: tournament.tournament_id,
                group_id: None,
                local_team_id: teams[0].team_id,
                visitor_team_id: teams[1].team_id,
                number_of_sets: 3,
                match_date: None,
                match_time: None,
                location: None,
                phase: Some("Round 1".to_string()),
            },
        )
        .await
        .unwrap();
    tx.commit().await.unwrap();
    created
}
