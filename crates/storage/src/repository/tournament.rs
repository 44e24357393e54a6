use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::tournament::{CreateTournamentRequest, UpdateTournamentRequest};
use crate::error::{Result, StorageError};
use crate::models::{Team, Tournament, TournamentGroup};

/// Repository for Tournament database operations
pub struct TournamentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TournamentRepository<'a> {
    /// Create a new TournamentRepository
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all tournaments, most recent first
    pub async fn list(&self) -> Result<Vec<Tournament>> {
        let tournaments = sqlx::query_as::<_, Tournament>(
            r#"
            SELECT tournament_id, name, location, description, start_date, end_date,
                   status, tournament_type, default_number_of_sets, created_at
            FROM tournaments
            ORDER BY start_date DESC, created_at DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(tournaments)
    }

    /// Get a tournament by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Tournament> {
        sqlx::query_as::<_, Tournament>(
            r#"
            SELECT tournament_id, name, location, description, start_date, end_date,
                   status, tournament_type, default_number_of_sets, created_at
            FROM tournaments
            WHERE tournament_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Loads a tournament and holds its row lock until the transaction ends
    pub async fn lock(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Tournament> {
        sqlx::query_as::<_, Tournament>(
            r#"
            SELECT tournament_id, name, location, description, start_date, end_date,
                   status, tournament_type, default_number_of_sets, created_at
            FROM tournaments
            WHERE tournament_id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Create a new tournament
    pub async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        req: &CreateTournamentRequest,
    ) -> Result<Tournament> {
        let tournament = sqlx::query_as::<_, Tournament>(
            r#"
            INSERT INTO tournaments (
                name, location, description, start_date, end_date,
                status, tournament_type, default_number_of_sets
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING tournament_id, name, location, description, start_date, end_date,
                      status, tournament_type, default_number_of_sets, created_at
            "#,
        )
        .bind(&req.name)
        .bind(&req.location)
        .bind(&req.description)
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(req.status.as_str())
        .bind(req.tournament_type.as_str())
        .bind(req.default_number_of_sets as i32)
        .fetch_one(&mut **tx)
        .await?;

        Ok(tournament)
    }

    /// Update an existing tournament
    pub async fn update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        req: &UpdateTournamentRequest,
    ) -> Result<Tournament> {
        sqlx::query_as::<_, Tournament>(
            r#"
            UPDATE tournaments
            SET
                name = COALESCE($2, name),
                location = COALESCE($3, location),
                description = COALESCE($4, description),
                start_date = COALESCE($5, start_date),
                end_date = COALESCE($6, end_date),
                status = COALESCE($7, status),
                tournament_type = COALESCE($8, tournament_type),
                default_number_of_sets = COALESCE($9, default_number_of_sets)
            WHERE tournament_id = $1
            RETURNING tournament_id, name, location, description, start_date, end_date,
                      status, tournament_type, default_number_of_sets, created_at
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.location)
        .bind(&req.description)
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(req.status.map(|s| s.as_str()))
        .bind(req.tournament_type.map(|t| t.as_str()))
        .bind(req.default_number_of_sets.map(|n| n as i32))
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Delete a tournament with its matches and groups
    pub async fn delete(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Tournament> {
        sqlx::query_as::<_, Tournament>(
            r#"
            DELETE FROM tournaments
            WHERE tournament_id = $1
            RETURNING tournament_id, name, location, description, start_date, end_date,
                      status, tournament_type, default_number_of_sets, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Teams registered in the tournament, by name
    pub async fn list_teams(&self, id: Uuid) -> Result<Vec<Team>> {
        let teams = sqlx::query_as::<_, Team>(
            r#"
            SELECT t.team_id, t.name, t.coach_name, t.logo_url, t.created_at
            FROM tournament_teams tt
            JOIN teams t ON t.team_id = tt.team_id
            WHERE tt.tournament_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(teams)
    }

    /// Registered team ids, read inside the schedule transaction
    pub async fn team_ids(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT tt.team_id
            FROM tournament_teams tt
            JOIN teams t ON t.team_id = tt.team_id
            WHERE tt.tournament_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(ids)
    }

    pub async fn add_team(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        team_id: Uuid,
    ) -> Result<()> {
        sqlx::query("INSERT INTO tournament_teams (tournament_id, team_id) VALUES ($1, $2)")
            .bind(id)
            .bind(team_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                let err = StorageError::from(e);
                if err.is_foreign_key_violation() {
                    StorageError::NotFound
                } else if err.is_unique_violation() {
                    StorageError::Conflict("Team is already registered in this tournament".to_string())
                } else {
                    err
                }
            })?;

        Ok(())
    }

    pub async fn remove_team(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        team_id: Uuid,
    ) -> Result<()> {
        let result =
            sqlx::query("DELETE FROM tournament_teams WHERE tournament_id = $1 AND team_id = $2")
                .bind(id)
                .bind(team_id)
                .execute(&mut **tx)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    pub async fn list_groups(&self, id: Uuid) -> Result<Vec<TournamentGroup>> {
        let groups = sqlx::query_as::<_, TournamentGroup>(
            r#"
            SELECT group_id, tournament_id, name
            FROM tournament_groups
            WHERE tournament_id = $1
            ORDER BY name
            "#,
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(groups)
    }

    pub async fn delete_groups(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM tournament_groups WHERE tournament_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn create_group(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        name: &str,
    ) -> Result<TournamentGroup> {
        let group = sqlx::query_as::<_, TournamentGroup>(
            r#"
            INSERT INTO tournament_groups (tournament_id, name)
            VALUES ($1, $2)
            RETURNING group_id, tournament_id, name
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_one(&mut **tx)
        .await?;

        Ok(group)
    }
}
