use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::matches::UpdateMatchRequest;
use crate::error::{Result, StorageError};
use crate::models::{Match, SetScore};
use crate::services::match_state::MatchState;

/// Columns of a match row, without the fields stored in `set_scores`.
pub struct NewMatch {
    pub tournament_id: Uuid,
    pub group_id: Option<Uuid>,
    pub local_team_id: Uuid,
    pub visitor_team_id: Uuid,
    pub number_of_sets: u32,
    pub match_date: Option<NaiveDate>,
    pub match_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub phase: Option<String>,
}

const MATCH_COLUMNS: &str = "match_id, tournament_id, group_id, local_team_id, visitor_team_id, \
     number_of_sets, match_date, match_time, location, phase, status, local_sets_won, \
     visitor_sets_won, winner_team_id, local_timeouts, visitor_timeouts, timeout_team_id, \
     timeout_started_at, created_at, updated_at";

/// A match row and the set scores stored with it, read from one snapshot
#[derive(Debug, Clone)]
pub struct MatchWithSets {
    pub row: Match,
    pub sets: Vec<SetScore>,
}

fn attach_sets(rows: Vec<Match>, sets: Vec<SetScore>) -> Vec<MatchWithSets> {
    let mut by_match: HashMap<Uuid, Vec<SetScore>> = HashMap::new();
    for set in sets {
        by_match.entry(set.match_id).or_default().push(set);
    }

    rows.into_iter()
        .map(|row| {
            let sets = by_match.remove(&row.match_id).unwrap_or_default();
            MatchWithSets { row, sets }
        })
        .collect()
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Repository for Match and SetScore database operations
pub struct MatchRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MatchRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Opens a read-only transaction that sees a single snapshot for every
    /// statement, so a match row and its set scores always agree.
    async fn snapshot(&self) -> Result<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }

    /// List matches with their sets, optionally for a single tournament, in calendar order
    pub async fn list(&self, tournament_id: Option<Uuid>) -> Result<Vec<MatchWithSets>> {
        let sql = format!(
            r#"
            SELECT {MATCH_COLUMNS}
            FROM matches
            WHERE $1::uuid IS NULL OR tournament_id = $1
            ORDER BY match_date NULLS LAST, match_time NULLS LAST, phase, created_at
            "#
        );

        let mut tx = self.snapshot().await?;
        let rows = sqlx::query_as::<_, Match>(&sql)
            .bind(tournament_id)
            .fetch_all(&mut *tx)
            .await?;
        let sets = Self::sets_of(&mut tx, &rows).await?;
        tx.commit().await?;

        Ok(attach_sets(rows, sets))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<MatchWithSets> {
        let sql = format!("SELECT {MATCH_COLUMNS} FROM matches WHERE match_id = $1");

        let mut tx = self.snapshot().await?;
        let row = sqlx::query_as::<_, Match>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StorageError::NotFound)?;
        let sets = Self::sets_of(&mut tx, std::slice::from_ref(&row)).await?;
        tx.commit().await?;

        Ok(MatchWithSets { row, sets })
    }

    /// Loads a match and holds its row lock until the transaction ends
    pub async fn lock(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Match> {
        let sql = format!("SELECT {MATCH_COLUMNS} FROM matches WHERE match_id = $1 FOR UPDATE");

        sqlx::query_as::<_, Match>(&sql)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(StorageError::NotFound)
    }

    /// Completed matches of a tournament with their sets, the input of its standings
    pub async fn list_completed(&self, tournament_id: Uuid) -> Result<Vec<MatchWithSets>> {
        let sql = format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE tournament_id = $1 AND status = 'completed'"
        );

        let mut tx = self.snapshot().await?;
        let rows = sqlx::query_as::<_, Match>(&sql)
            .bind(tournament_id)
            .fetch_all(&mut *tx)
            .await?;
        let sets = Self::sets_of(&mut tx, &rows).await?;
        tx.commit().await?;

        Ok(attach_sets(rows, sets))
    }

    async fn sets_of(
        tx: &mut Transaction<'_, Postgres>,
        rows: &[Match],
    ) -> Result<Vec<SetScore>> {
        let ids: Vec<Uuid> = rows.iter().map(|m| m.match_id).collect();

        let sets = sqlx::query_as::<_, SetScore>(
            r#"
            SELECT match_id, set_number, local_points, visitor_points
            FROM set_scores
            WHERE match_id = ANY($1)
            ORDER BY match_id, set_number
            "#,
        )
        .bind(&ids)
        .fetch_all(&mut **tx)
        .await?;

        Ok(sets)
    }

    pub async fn set_scores_locked(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        match_id: Uuid,
    ) -> Result<Vec<SetScore>> {
        let sets = sqlx::query_as::<_, SetScore>(
            r#"
            SELECT match_id, set_number, local_points, visitor_points
            FROM set_scores
            WHERE match_id = $1
            ORDER BY set_number
            FOR UPDATE
            "#,
        )
        .bind(match_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(sets)
    }

    /// Inserts a scheduled match together with a 0-0 row for each of its sets
    pub async fn create(&self, tx: &mut Transaction<'_, Postgres>, new: &NewMatch) -> Result<Match> {
        let sql = format!(
            r#"
            INSERT INTO matches (
                tournament_id, group_id, local_team_id, visitor_team_id, number_of_sets,
                match_date, match_time, location, phase
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {MATCH_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, Match>(&sql)
            .bind(new.tournament_id)
            .bind(new.group_id)
            .bind(new.local_team_id)
            .bind(new.visitor_team_id)
            .bind(to_i32(new.number_of_sets))
            .bind(new.match_date)
            .bind(new.match_time)
            .bind(&new.location)
            .bind(&new.phase)
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| {
                let err = StorageError::from(e);
                if err.is_foreign_key_violation() {
                    StorageError::InvalidInput(
                        "Tournament, group or team does not exist".to_string(),
                    )
                } else {
                    err
                }
            })?;

        sqlx::query(
            r#"
            INSERT INTO set_scores (match_id, set_number)
            SELECT $1, generate_series(1, $2)
            "#,
        )
        .bind(created.match_id)
        .bind(to_i32(new.number_of_sets))
        .execute(&mut **tx)
        .await?;

        Ok(created)
    }

    /// Writes schedule metadata; fields left out keep their value
    pub async fn update_details(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        req: &UpdateMatchRequest,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE matches
            SET
                match_date = COALESCE($2, match_date),
                match_time = COALESCE($3, match_time),
                location = COALESCE($4, location),
                phase = COALESCE($5, phase),
                updated_at = NOW()
            WHERE match_id = $1
            "#,
        )
        .bind(id)
        .bind(req.match_date)
        .bind(req.match_time)
        .bind(&req.location)
        .bind(&req.phase)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    /// Persists a match state: format, tally, status, winner, timeouts and every set
    pub async fn save_state(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        state: &MatchState,
    ) -> Result<Match> {
        let active = state.timeouts.active;
        let sql = format!(
            r#"
            UPDATE matches
            SET
                number_of_sets = $2,
                status = $3,
                local_sets_won = $4,
                visitor_sets_won = $5,
                winner_team_id = $6,
                local_timeouts = $7,
                visitor_timeouts = $8,
                timeout_team_id = $9,
                timeout_started_at = $10,
                updated_at = NOW()
            WHERE match_id = $1
            RETURNING {MATCH_COLUMNS}
            "#
        );

        let saved = sqlx::query_as::<_, Match>(&sql)
            .bind(id)
            .bind(to_i32(state.number_of_sets))
            .bind(state.status.as_str())
            .bind(to_i32(state.tally.local))
            .bind(to_i32(state.tally.visitor))
            .bind(state.winner_team_id())
            .bind(to_i32(state.timeouts.local_remaining))
            .bind(to_i32(state.timeouts.visitor_remaining))
            .bind(active.map(|a| state.team_id(a.side)))
            .bind(active.map(|a| a.started_at))
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(StorageError::NotFound)?;

        sqlx::query("DELETE FROM set_scores WHERE match_id = $1 AND set_number > $2")
            .bind(id)
            .bind(to_i32(state.number_of_sets))
            .execute(&mut **tx)
            .await?;

        let numbers: Vec<i32> = state.sets.iter().map(|s| to_i32(s.set_number)).collect();
        let local: Vec<i32> = state.sets.iter().map(|s| to_i32(s.local)).collect();
        let visitor: Vec<i32> = state.sets.iter().map(|s| to_i32(s.visitor)).collect();

        sqlx::query(
            r#"
            INSERT INTO set_scores (match_id, set_number, local_points, visitor_points)
            SELECT $1, s.set_number, s.local_points, s.visitor_points
            FROM UNNEST($2::int4[], $3::int4[], $4::int4[])
                AS s(set_number, local_points, visitor_points)
            ON CONFLICT (match_id, set_number)
            DO UPDATE SET
                local_points = EXCLUDED.local_points,
                visitor_points = EXCLUDED.visitor_points
            "#,
        )
        .bind(id)
        .bind(&numbers)
        .bind(&local)
        .bind(&visitor)
        .execute(&mut **tx)
        .await?;

        Ok(saved)
    }

    pub async fn delete(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Match> {
        let sql = format!("DELETE FROM matches WHERE match_id = $1 RETURNING {MATCH_COLUMNS}");

        sqlx::query_as::<_, Match>(&sql)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(StorageError::NotFound)
    }

    /// Drops the whole schedule of a tournament; set scores go with it
    pub async fn delete_for_tournament(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tournament_id: Uuid,
    ) -> Result<u64> {
        let result = sqlx::query("DELETE FROM matches WHERE tournament_id = $1")
            .bind(tournament_id)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }
}
