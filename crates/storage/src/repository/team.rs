use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::team::{CreateTeamRequest, UpdateTeamRequest};
use crate::error::{Result, StorageError};
use crate::models::Team;

const DUPLICATE_NAME: &str = "A team with this name already exists";

/// Repository for Team database operations
pub struct TeamRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TeamRepository<'a> {
    /// Create a new TeamRepository
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all teams
    pub async fn list(&self) -> Result<Vec<Team>> {
        let teams = sqlx::query_as::<_, Team>(
            r#"
            SELECT team_id, name, coach_name, logo_url, created_at
            FROM teams
            ORDER BY name
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(teams)
    }

    /// Get a team by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Team> {
        sqlx::query_as::<_, Team>(
            r#"
            SELECT team_id, name, coach_name, logo_url, created_at
            FROM teams
            WHERE team_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn exists(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<bool> {
        let found = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM teams WHERE team_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(found)
    }

    /// Create a new team
    pub async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        req: &CreateTeamRequest,
    ) -> Result<Team> {
        sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (name, coach_name, logo_url)
            VALUES ($1, $2, $3)
            RETURNING team_id, name, coach_name, logo_url, created_at
            "#,
        )
        .bind(&req.name)
        .bind(&req.coach_name)
        .bind(&req.logo_url)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| StorageError::from(e).on_unique_violation(DUPLICATE_NAME))
    }

    /// Update an existing team
    pub async fn update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        req: &UpdateTeamRequest,
    ) -> Result<Team> {
        sqlx::query_as::<_, Team>(
            r#"
            UPDATE teams
            SET
                name = COALESCE($2, name),
                coach_name = COALESCE($3, coach_name),
                logo_url = COALESCE($4, logo_url)
            WHERE team_id = $1
            RETURNING team_id, name, coach_name, logo_url, created_at
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.coach_name)
        .bind(&req.logo_url)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| StorageError::from(e).on_unique_violation(DUPLICATE_NAME))?
        .ok_or(StorageError::NotFound)
    }

    /// Delete a team, returning the removed row
    pub async fn delete(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Team> {
        sqlx::query_as::<_, Team>(
            r#"
            DELETE FROM teams
            WHERE team_id = $1
            RETURNING team_id, name, coach_name, logo_url, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StorageError::NotFound)
    }
}
