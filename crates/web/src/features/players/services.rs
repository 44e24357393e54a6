use sqlx::PgPool;
use storage::{
    dto::{
        common::PaginationParams,
        player::{CreatePlayerRequest, PlayerStanding, PointsImportSummary, UpdatePlayerRequest},
    },
    error::{Result, StorageError},
    models::{AuditAction, Player},
    repository::{AuditLogRepository, PlayerRepository},
    services::points_sheet::parse_points_sheet,
};
use uuid::Uuid;

use crate::features::snapshot;

const ENTITY: &str = "player";

pub async fn list_players(
    pool: &PgPool,
    team_id: Option<Uuid>,
    page: PaginationParams,
) -> Result<(Vec<Player>, i64)> {
    PlayerRepository::new(pool).list(team_id, page).await
}

pub async fn get_player(pool: &PgPool, id: Uuid) -> Result<Player> {
    PlayerRepository::new(pool).find_by_id(id).await
}

pub async fn player_standings(pool: &PgPool, limit: i64) -> Result<Vec<PlayerStanding>> {
    PlayerRepository::new(pool).standings(limit).await
}

pub async fn create_player(pool: &PgPool, request: &CreatePlayerRequest) -> Result<Player> {
    let mut tx = pool.begin().await?;

    let player = PlayerRepository::new(pool)
        .create(&mut tx, request)
        .await
        .map_err(unknown_team)?;
    AuditLogRepository::new(pool)
        .record(
            &mut tx,
            AuditAction::Create,
            ENTITY,
            Some(player.player_id),
            None,
            snapshot(&player),
        )
        .await?;

    tx.commit().await?;
    Ok(player)
}

/// Update a player.
///
/// Moving a player to another team is refused while their current team plays
/// an active tournament.
pub async fn update_player(
    pool: &PgPool,
    id: Uuid,
    request: &UpdatePlayerRequest,
) -> Result<Player> {
    let repo = PlayerRepository::new(pool);
    let mut tx = pool.begin().await?;

    let old = repo.lock(&mut tx, id).await?;

    let moving = matches!(
        (old.team_id, request.team_id),
        (Some(current), Some(next)) if current != next
    );
    if moving {
        if let Some(current) = old.team_id {
            if repo.team_in_active_tournament(&mut tx, current).await? {
                return Err(StorageError::Conflict(
                    "Player cannot change teams while the team plays an active tournament"
                        .to_string(),
                ));
            }
        }
    }

    let player = repo.update(&mut tx, id, request).await.map_err(unknown_team)?;
    AuditLogRepository::new(pool)
        .record(&mut tx, AuditAction::Update, ENTITY, Some(id), snapshot(&old), snapshot(&player))
        .await?;

    tx.commit().await?;
    Ok(player)
}

pub async fn delete_player(pool: &PgPool, id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;

    let player = PlayerRepository::new(pool).delete(&mut tx, id).await?;
    AuditLogRepository::new(pool)
        .record(&mut tx, AuditAction::Delete, ENTITY, Some(id), snapshot(&player), None)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Adds the point deltas of a CSV sheet to the players' totals, all or nothing
pub async fn import_points(
    pool: &PgPool,
    body: &[u8],
    validate_only: bool,
) -> Result<PointsImportSummary> {
    let sheet = parse_points_sheet(body)?;
    let summary = PlayerRepository::new(pool)
        .import_points_sheet(&sheet, "upload", validate_only)
        .await?;

    if !validate_only {
        tracing::info!(
            rows = summary.rows_read,
            players = summary.players_updated,
            "Points sheet imported"
        );
    }
    Ok(summary)
}

fn unknown_team(error: StorageError) -> StorageError {
    if error.is_foreign_key_violation() {
        StorageError::InvalidInput("Team does not exist".to_string())
    } else {
        error
    }
}
