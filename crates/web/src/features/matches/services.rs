use chrono::{DateTime, Utc};
use sqlx::PgPool;
use storage::{
    dto::matches::{CreateMatchRequest, MatchResponse, UpdateMatchRequest},
    error::Result,
    models::{AuditAction, Match},
    repository::{
        AuditLogRepository, MatchRepository,
        matches::{MatchWithSets, NewMatch},
    },
    services::{
        match_state::{MatchEvent, MatchState, ScoringError, Transition},
        set_rules::SetPoints,
    },
};
use uuid::Uuid;

use crate::events::MatchEvents;
use crate::features::snapshot;

const ENTITY: &str = "match";

pub async fn list_matches(pool: &PgPool, tournament_id: Option<Uuid>) -> Result<Vec<MatchResponse>> {
    let now = Utc::now();
    MatchRepository::new(pool)
        .list(tournament_id)
        .await?
        .into_iter()
        .map(|MatchWithSets { row, sets }| MatchResponse::build(row, &sets, now))
        .collect()
}

/// Get a match, ending its timeout first when the timeout has run out
pub async fn get_match(pool: &PgPool, events: &MatchEvents, id: Uuid) -> Result<MatchResponse> {
    let MatchWithSets { row, sets } = MatchRepository::new(pool).find_by_id(id).await?;

    let now = Utc::now();
    if row.to_state(&sets)?.expire_timeout(now).is_none() {
        return MatchResponse::build(row, &sets, now);
    }

    run_transition(pool, events, id, |state, now| {
        Ok(state
            .expire_timeout(now)
            .unwrap_or_else(|| Transition {
                state: state.clone(),
                events: Vec::new(),
            }))
    })
    .await
}

pub async fn create_match(pool: &PgPool, request: &CreateMatchRequest) -> Result<MatchResponse> {
    let repo = MatchRepository::new(pool);
    let mut tx = pool.begin().await?;

    let new = NewMatch {
        tournament_id: request.tournament_id,
        group_id: request.group_id,
        local_team_id: request.local_team_id,
        visitor_team_id: request.visitor_team_id,
        number_of_sets: request.number_of_sets,
        match_date: request.match_date,
        match_time: request.match_time,
        location: request.location.clone(),
        phase: request.phase.clone(),
    };
    let created = repo.create(&mut tx, &new).await?;
    let sets = repo.set_scores_locked(&mut tx, created.match_id).await?;

    AuditLogRepository::new(pool)
        .record(
            &mut tx,
            AuditAction::Create,
            ENTITY,
            Some(created.match_id),
            None,
            snapshot(&created),
        )
        .await?;

    tx.commit().await?;
    MatchResponse::build(created, &sets, Utc::now())
}

/// Applies metadata, format and set scores of an edit as one unit.
///
/// The match row stays locked from the first read to the commit; subscribers are
/// told about the change only once it is committed.
pub async fn update_match(
    pool: &PgPool,
    events: &MatchEvents,
    id: Uuid,
    request: &UpdateMatchRequest,
) -> Result<MatchResponse> {
    let repo = MatchRepository::new(pool);
    let mut tx = pool.begin().await?;

    let old = repo.lock(&mut tx, id).await?;
    let sets = repo.set_scores_locked(&mut tx, id).await?;
    let mut state = old.to_state(&sets)?;
    let mut emitted = Vec::new();

    if let Some(number_of_sets) = request.number_of_sets {
        let transition = state.change_format(number_of_sets)?;
        state = transition.state;
        emitted.extend(transition.events);
    }

    if let Some(scores) = &request.set_scores {
        let updates: Vec<SetPoints> = scores.iter().copied().map(SetPoints::from).collect();
        let transition = state.apply_scores(&updates)?;
        state = transition.state;
        emitted.extend(transition.events);
    }

    let has_details = request.match_date.is_some()
        || request.match_time.is_some()
        || request.location.is_some()
        || request.phase.is_some();
    if has_details {
        repo.update_details(&mut tx, id, request).await?;
        emitted.push(MatchEvent::MatchUpdated);
    }

    let saved = repo.save_state(&mut tx, id, &state).await?;
    let sets = repo.set_scores_locked(&mut tx, id).await?;

    AuditLogRepository::new(pool)
        .record(&mut tx, AuditAction::Update, ENTITY, Some(id), snapshot(&old), snapshot(&saved))
        .await?;

    tx.commit().await?;

    emitted.dedup();
    events.publish(id, &emitted);

    MatchResponse::build(saved, &sets, Utc::now())
}

pub async fn delete_match(pool: &PgPool, id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;

    let removed = MatchRepository::new(pool).delete(&mut tx, id).await?;
    AuditLogRepository::new(pool)
        .record(&mut tx, AuditAction::Delete, ENTITY, Some(id), snapshot(&removed), None)
        .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn cancel_match(pool: &PgPool, events: &MatchEvents, id: Uuid) -> Result<MatchResponse> {
    run_transition(pool, events, id, |state, _| state.cancel()).await
}

pub async fn request_timeout(
    pool: &PgPool,
    events: &MatchEvents,
    id: Uuid,
    team_id: Uuid,
) -> Result<MatchResponse> {
    run_transition(pool, events, id, |state, now| state.request_timeout(team_id, now)).await
}

pub async fn end_timeout(pool: &PgPool, events: &MatchEvents, id: Uuid) -> Result<MatchResponse> {
    run_transition(pool, events, id, |state, _| state.end_timeout()).await
}

/// Locks the match, applies `step` to its state, persists the result and
/// publishes the resulting events after commit.
async fn run_transition<F>(
    pool: &PgPool,
    events: &MatchEvents,
    id: Uuid,
    step: F,
) -> Result<MatchResponse>
where
    F: FnOnce(&MatchState, DateTime<Utc>) -> std::result::Result<Transition, ScoringError>,
{
    let repo = MatchRepository::new(pool);
    let mut tx = pool.begin().await?;

    let old: Match = repo.lock(&mut tx, id).await?;
    let sets = repo.set_scores_locked(&mut tx, id).await?;
    let now = Utc::now();

    let transition = step(&old.to_state(&sets)?, now)?;
    if transition.events.is_empty() {
        tx.rollback().await?;
        return MatchResponse::build(old, &sets, now);
    }

    let saved = repo.save_state(&mut tx, id, &transition.state).await?;
    AuditLogRepository::new(pool)
        .record(&mut tx, AuditAction::Update, ENTITY, Some(id), snapshot(&old), snapshot(&saved))
        .await?;

    tx.commit().await?;

    for event in &transition.events {
        tracing::debug!(match_id = %id, event = event.name(), "Match transition committed");
    }
    events.publish(id, &transition.events);

    MatchResponse::build(saved, &sets, now)
}
