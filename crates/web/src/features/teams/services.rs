use sqlx::PgPool;
use storage::{
    dto::team::{CreateTeamRequest, TeamDetailResponse, UpdateTeamRequest},
    error::Result,
    models::{AuditAction, Team},
    repository::{AuditLogRepository, PlayerRepository, TeamRepository},
};
use uuid::Uuid;

use crate::features::snapshot;

const ENTITY: &str = "team";

pub async fn list_teams(pool: &PgPool) -> Result<Vec<Team>> {
    TeamRepository::new(pool).list().await
}

/// Get a team with its roster
pub async fn get_team(pool: &PgPool, id: Uuid) -> Result<TeamDetailResponse> {
    let team = TeamRepository::new(pool).find_by_id(id).await?;
    let players = PlayerRepository::new(pool).list_by_team(id).await?;

    Ok(TeamDetailResponse { team, players })
}

pub async fn create_team(pool: &PgPool, request: &CreateTeamRequest) -> Result<Team> {
    let mut tx = pool.begin().await?;

    let team = TeamRepository::new(pool).create(&mut tx, request).await?;
    AuditLogRepository::new(pool)
        .record(&mut tx, AuditAction::Create, ENTITY, Some(team.team_id), None, snapshot(&team))
        .await?;

    tx.commit().await?;
    Ok(team)
}

pub async fn update_team(pool: &PgPool, id: Uuid, request: &UpdateTeamRequest) -> Result<Team> {
    let repo = TeamRepository::new(pool);
    let old = repo.find_by_id(id).await?;

    let mut tx = pool.begin().await?;
    let team = repo.update(&mut tx, id, request).await?;
    AuditLogRepository::new(pool)
        .record(&mut tx, AuditAction::Update, ENTITY, Some(id), snapshot(&old), snapshot(&team))
        .await?;

    tx.commit().await?;
    Ok(team)
}

/// Delete a team; its players stay registered without a team
pub async fn delete_team(pool: &PgPool, id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;

    let team = TeamRepository::new(pool).delete(&mut tx, id).await?;
    AuditLogRepository::new(pool)
        .record(&mut tx, AuditAction::Delete, ENTITY, Some(id), snapshot(&team), None)
        .await?;

    tx.commit().await?;
    Ok(())
}
