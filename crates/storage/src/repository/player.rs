use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::common::PaginationParams;
use crate::dto::player::{
    CreatePlayerRequest, PlayerStanding, PointsImportSummary, UpdatePlayerRequest,
};
use crate::error::{Result, StorageError};
use crate::models::{AuditAction, Player};
use crate::repository::AuditLogRepository;
use crate::services::points_sheet::{PointDelta, PointsSheet};

/// Maps unique violations on the players table to a message naming the clashing field.
fn player_conflict(err: sqlx::Error) -> StorageError {
    let constraint = match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            db_err.constraint().map(str::to_owned)
        }
        _ => None,
    };

    match constraint.as_deref() {
        Some("players_national_id_key") => {
            StorageError::ConstraintViolation("A player with this national ID already exists".to_string())
        }
        Some("players_team_jersey_key") => StorageError::ConstraintViolation(
            "This jersey number is already taken in the team".to_string(),
        ),
        _ => StorageError::from(err),
    }
}

pub struct PlayerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PlayerRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List players, optionally restricted to one team, one page at a time
    pub async fn list(
        &self,
        team_id: Option<Uuid>,
        page: PaginationParams,
    ) -> Result<(Vec<Player>, i64)> {
        let players = sqlx::query_as::<_, Player>(
            r#"
            SELECT player_id, team_id, first_name, last_name, national_id,
                   jersey_number, position, points, created_at
            FROM players
            WHERE $1::uuid IS NULL OR team_id = $1
            ORDER BY last_name, first_name
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(team_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM players WHERE $1::uuid IS NULL OR team_id = $1",
        )
        .bind(team_id)
        .fetch_one(self.pool)
        .await?;

        Ok((players, total))
    }

    /// Roster of a team ordered by jersey number
    pub async fn list_by_team(&self, team_id: Uuid) -> Result<Vec<Player>> {
        let players = sqlx::query_as::<_, Player>(
            r#"
            SELECT player_id, team_id, first_name, last_name, national_id,
                   jersey_number, position, points, created_at
            FROM players
            WHERE team_id = $1
            ORDER BY jersey_number NULLS LAST, last_name
            "#,
        )
        .bind(team_id)
        .fetch_all(self.pool)
        .await?;

        Ok(players)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Player> {
        sqlx::query_as::<_, Player>(
            r#"
            SELECT player_id, team_id, first_name, last_name, national_id,
                   jersey_number, position, points, created_at
            FROM players
            WHERE player_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Loads a player and holds its row lock until the transaction ends
    pub async fn lock(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Player> {
        sqlx::query_as::<_, Player>(
            r#"
            SELECT player_id, team_id, first_name, last_name, national_id,
                   jersey_number, position, points, created_at
            FROM players
            WHERE player_id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        req: &CreatePlayerRequest,
    ) -> Result<Player> {
        let player = sqlx::query_as::<_, Player>(
            r#"
            INSERT INTO players (team_id, first_name, last_name, national_id, jersey_number, position)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING player_id, team_id, first_name, last_name, national_id,
                      jersey_number, position, points, created_at
            "#,
        )
        .bind(req.team_id)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.national_id)
        .bind(req.jersey_number)
        .bind(&req.position)
        .fetch_one(&mut **tx)
        .await
        .map_err(player_conflict)?;

        Ok(player)
    }

    pub async fn update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        req: &UpdatePlayerRequest,
    ) -> Result<Player> {
        sqlx::query_as::<_, Player>(
            r#"
            UPDATE players
            SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                national_id = COALESCE($4, national_id),
                team_id = COALESCE($5, team_id),
                jersey_number = COALESCE($6, jersey_number),
                position = COALESCE($7, position)
            WHERE player_id = $1
            RETURNING player_id, team_id, first_name, last_name, national_id,
                      jersey_number, position, points, created_at
            "#,
        )
        .bind(id)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.national_id)
        .bind(req.team_id)
        .bind(req.jersey_number)
        .bind(&req.position)
        .fetch_optional(&mut **tx)
        .await
        .map_err(player_conflict)?
        .ok_or(StorageError::NotFound)
    }

    pub async fn delete(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Player> {
        sqlx::query_as::<_, Player>(
            r#"
            DELETE FROM players
            WHERE player_id = $1
            RETURNING player_id, team_id, first_name, last_name, national_id,
                      jersey_number, position, points, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Whether the team is registered in a tournament that is currently being played
    pub async fn team_in_active_tournament(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        team_id: Uuid,
    ) -> Result<bool> {
        let active = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM tournament_teams tt
                JOIN tournaments t ON t.tournament_id = tt.tournament_id
                WHERE tt.team_id = $1 AND t.status = 'active'
            )
            "#,
        )
        .bind(team_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(active)
    }

    /// Individual points table, best first
    pub async fn standings(&self, limit: i64) -> Result<Vec<PlayerStanding>> {
        let rows = sqlx::query_as::<_, PlayerStanding>(
            r#"
            SELECT p.player_id, p.first_name, p.last_name, p.team_id,
                   t.name AS team_name, p.jersey_number, p.points
            FROM players p
            LEFT JOIN teams t ON t.team_id = p.team_id
            ORDER BY p.points DESC, p.last_name, p.first_name
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Ids from `ids` that have no player row
    pub async fn missing_ids(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ids: &[Uuid],
    ) -> Result<Vec<Uuid>> {
        let missing = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id
            FROM UNNEST($1::uuid[]) AS requested(id)
            WHERE NOT EXISTS (SELECT 1 FROM players p WHERE p.player_id = requested.id)
            ORDER BY id
            "#,
        )
        .bind(ids)
        .fetch_all(&mut **tx)
        .await?;

        Ok(missing)
    }

    /// Adds each delta to the player's running total; returns the number of rows touched
    pub async fn apply_point_deltas(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        deltas: &[PointDelta],
    ) -> Result<u64> {
        let ids: Vec<Uuid> = deltas.iter().map(|d| d.player_id).collect();
        let points: Vec<i32> = deltas.iter().map(|d| d.points).collect();

        let result = sqlx::query(
            r#"
            UPDATE players p
            SET points = p.points + d.points
            FROM UNNEST($1::uuid[], $2::int4[]) AS d(player_id, points)
            WHERE p.player_id = d.player_id
            "#,
        )
        .bind(&ids)
        .bind(&points)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }

    /// Checks every referenced player exists, then applies the sheet's deltas.
    ///
    /// Nothing is written when an id is unknown; the caller decides whether to commit.
    pub async fn apply_points_sheet(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sheet: &PointsSheet,
    ) -> Result<u64> {
        let missing = self.missing_ids(tx, &sheet.player_ids()).await?;
        if !missing.is_empty() {
            let ids: Vec<String> = missing.iter().map(Uuid::to_string).collect();
            return Err(StorageError::InvalidInput(format!(
                "Unknown player ids: {}",
                ids.join(", ")
            )));
        }

        self.apply_point_deltas(tx, &sheet.deltas).await
    }

    /// Applies a points sheet in its own transaction and records it in the audit trail.
    ///
    /// With `validate_only` every check runs, including player existence, and the
    /// transaction is rolled back so nothing is written.
    pub async fn import_points_sheet(
        &self,
        sheet: &PointsSheet,
        source: &str,
        validate_only: bool,
    ) -> Result<PointsImportSummary> {
        let mut tx = self.pool.begin().await?;
        let updated = self.apply_points_sheet(&mut tx, sheet).await?;

        let summary = PointsImportSummary {
            rows_read: sheet.rows_read,
            players_updated: usize::try_from(updated).unwrap_or(usize::MAX),
            validate_only,
        };

        if validate_only {
            tx.rollback().await?;
            return Ok(summary);
        }

        AuditLogRepository::new(self.pool)
            .record(
                &mut tx,
                AuditAction::Update,
                "player_points",
                None,
                None,
                Some(serde_json::json!({ "source": source, "deltas": sheet.deltas })),
            )
            .await?;

        tx.commit().await?;
        Ok(summary)
    }
}
