//! Postgres access for service tests.
//!
//! Tests run against `DATABASE_URL` (read from `.env.test` when present) and are
//! skipped when it is unset.

use chrono::NaiveDate;
use sqlx::PgPool;
use storage::{
    Database,
    dto::{team::CreateTeamRequest, tournament::CreateTournamentRequest},
    models::{Team, Tournament, TournamentStatus, TournamentType},
};
use uuid::Uuid;

use crate::features::{teams, tournaments};

pub async fn test_pool() -> Option<PgPool> {
    dotenvy::from_filename(".env.test").ok();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL is not set, skipping database test");
        return None;
    };

    let db = Database::with_max_connections(&url, 4)
        .await
        .expect("Failed to connect to test database");
    db.run_migrations()
        .await
        .expect("Failed to migrate test database");

    Some(db.pool().clone())
}

/// A tournament of `kind` with `team_count` freshly created teams registered in it.
pub async fn tournament_with_teams(
    pool: &PgPool,
    kind: TournamentType,
    team_count: usize,
) -> (Tournament, Vec<Team>) {
    let tournament = tournaments::services::create_tournament(
        pool,
        &CreateTournamentRequest {
            name: format!("Copa {}", Uuid::new_v4().simple()),
            location: Some("Polideportivo Norte".to_string()),
            description: None,
            start_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            tournament_type: kind,
            status: TournamentStatus::Scheduled,
            default_number_of_sets: 3,
        },
    )
    .await
    .unwrap();

    let mut registered = Vec::with_capacity(team_count);
    for _ in 0..team_count {
        let team = teams::services::create_team(
            pool,
            &CreateTeamRequest {
                name: format!("Club {}", Uuid::new_v4().simple()),
                coach_name: None,
                logo_url: None,
            },
        )
        .await
        .unwrap();
        tournaments::services::add_team(pool, tournament.tournament_id, team.team_id)
            .await
            .unwrap();
        registered.push(team);
    }

    (tournament, registered)
}
