use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::matches::{
        CreateMatchRequest, MatchFilter, MatchResponse, TimeoutRequest, UpdateMatchRequest,
    },
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::events::MatchEvents;
use crate::extract::AppJson;

use super::services;

#[utoipa::path(
    get,
    path = "/api/matches",
    params(MatchFilter),
    responses(
        (status = 200, description = "Matches in calendar order", body = Vec<MatchResponse>)
    ),
    tag = "matches"
)]
pub async fn list_matches(
    State(db): State<Database>,
    Query(filter): Query<MatchFilter>,
) -> Result<Json<Vec<MatchResponse>>, WebError> {
    let matches = services::list_matches(db.pool(), filter.tournament_id).await?;
    Ok(Json(matches))
}

#[utoipa::path(
    get,
    path = "/api/matches/{id}",
    params(
        ("id" = Uuid, Path, description = "Match ID")
    ),
    responses(
        (status = 200, description = "Match with its sets and timeout state", body = MatchResponse),
        (status = 404, description = "Match not found")
    ),
    tag = "matches"
)]
pub async fn get_match(
    State(db): State<Database>,
    State(events): State<MatchEvents>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchResponse>, WebError> {
    let response = services::get_match(db.pool(), &events, id).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/matches",
    request_body = CreateMatchRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Match scheduled", body = MatchResponse),
        (status = 400, description = "Validation error or unknown tournament/team"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "matches"
)]
pub async fn create_match(
    State(db): State<Database>,
    AppJson(req): AppJson<CreateMatchRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    req.validate_teams()
        .map_err(|e| WebError::BadRequest(e.to_string()))?;

    let response = services::create_match(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/matches/{id}",
    params(
        ("id" = Uuid, Path, description = "Match ID")
    ),
    request_body = UpdateMatchRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Match updated", body = MatchResponse),
        (status = 400, description = "Invalid set score or format"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Match not found"),
        (status = 409, description = "Set already decided, or match cancelled")
    ),
    tag = "matches"
)]
pub async fn update_match(
    State(db): State<Database>,
    State(events): State<MatchEvents>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<UpdateMatchRequest>,
) -> Result<Json<MatchResponse>, WebError> {
    req.validate()?;

    let response = services::update_match(db.pool(), &events, id, &req).await?;

    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/api/matches/{id}",
    params(
        ("id" = Uuid, Path, description = "Match ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Match deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Match not found")
    ),
    tag = "matches"
)]
pub async fn delete_match(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, WebError> {
    services::delete_match(db.pool(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/matches/{id}/cancel",
    params(
        ("id" = Uuid, Path, description = "Match ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Match cancelled", body = MatchResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Match not found"),
        (status = 409, description = "Match already completed or cancelled")
    ),
    tag = "matches"
)]
pub async fn cancel_match(
    State(db): State<Database>,
    State(events): State<MatchEvents>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchResponse>, WebError> {
    let response = services::cancel_match(db.pool(), &events, id).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/matches/{id}/timeout",
    params(
        ("id" = Uuid, Path, description = "Match ID")
    ),
    request_body = TimeoutRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Timeout started", body = MatchResponse),
        (status = 400, description = "Team does not play this match"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Match not found"),
        (status = 409, description = "Match not active, timeout running, or none left")
    ),
    tag = "matches"
)]
pub async fn request_timeout(
    State(db): State<Database>,
    State(events): State<MatchEvents>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<TimeoutRequest>,
) -> Result<Json<MatchResponse>, WebError> {
    let response = services::request_timeout(db.pool(), &events, id, req.team_id).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/matches/{id}/end-timeout",
    params(
        ("id" = Uuid, Path, description = "Match ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Timeout ended", body = MatchResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Match not found"),
        (status = 409, description = "No timeout is running")
    ),
    tag = "matches"
)]
pub async fn end_timeout(
    State(db): State<Database>,
    State(events): State<MatchEvents>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchResponse>, WebError> {
    let response = services::end_timeout(db.pool(), &events, id).await?;
    Ok(Json(response))
}
