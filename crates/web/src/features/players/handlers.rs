use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        common::{PaginatedResponse, PaginationParams},
        player::{
            CreatePlayerRequest, PlayerFilter, PlayerStanding, PlayerStandingsQuery,
            PointsImportQuery, PointsImportSummary, UpdatePlayerRequest,
        },
    },
    models::Player,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::extract::AppJson;

use super::services;

#[utoipa::path(
    get,
    path = "/api/players",
    params(PaginationParams, PlayerFilter),
    responses(
        (status = 200, description = "Players ordered by name", body = PaginatedResponse<Player>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "players"
)]
pub async fn list_players(
    State(db): State<Database>,
    Query(page): Query<PaginationParams>,
    Query(filter): Query<PlayerFilter>,
) -> Result<Response, WebError> {
    page.validate()
        .map_err(|e| WebError::BadRequest(e.to_string()))?;

    let (players, total) = services::list_players(db.pool(), filter.team_id, page).await?;

    Ok(Json(PaginatedResponse::new(players, page, total)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/players/standings",
    params(PlayerStandingsQuery),
    responses(
        (status = 200, description = "Players ordered by accumulated points", body = Vec<PlayerStanding>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "players"
)]
pub async fn player_standings(
    State(db): State<Database>,
    Query(query): Query<PlayerStandingsQuery>,
) -> Result<Json<Vec<PlayerStanding>>, WebError> {
    query
        .validate()
        .map_err(|e| WebError::BadRequest(e.to_string()))?;

    let rows = services::player_standings(db.pool(), i64::from(query.limit)).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/players/{id}",
    params(
        ("id" = Uuid, Path, description = "Player ID")
    ),
    responses(
        (status = 200, description = "Player found", body = Player),
        (status = 404, description = "Player not found")
    ),
    tag = "players"
)]
pub async fn get_player(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Player>, WebError> {
    let player = services::get_player(db.pool(), id).await?;
    Ok(Json(player))
}

#[utoipa::path(
    post,
    path = "/api/players",
    request_body = CreatePlayerRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Player created successfully", body = Player),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "National ID or jersey number already taken")
    ),
    tag = "players"
)]
pub async fn create_player(
    State(db): State<Database>,
    AppJson(req): AppJson<CreatePlayerRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let player = services::create_player(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(player)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/players/{id}",
    params(
        ("id" = Uuid, Path, description = "Player ID")
    ),
    request_body = UpdatePlayerRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Player updated successfully", body = Player),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Player not found"),
        (status = 409, description = "Duplicate field, or team change during an active tournament")
    ),
    tag = "players"
)]
pub async fn update_player(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<UpdatePlayerRequest>,
) -> Result<Json<Player>, WebError> {
    req.validate()?;

    let player = services::update_player(db.pool(), id, &req).await?;

    Ok(Json(player))
}

#[utoipa::path(
    delete,
    path = "/api/players/{id}",
    params(
        ("id" = Uuid, Path, description = "Player ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Player deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Player not found")
    ),
    tag = "players"
)]
pub async fn delete_player(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, WebError> {
    services::delete_player(db.pool(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/players/points",
    params(PointsImportQuery),
    request_body(content = String, content_type = "text/csv", description = "CSV with player_id and points columns"),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Points applied, or checked when validate_only is set", body = PointsImportSummary),
        (status = 400, description = "Malformed sheet or unknown players"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "players"
)]
pub async fn import_points(
    State(db): State<Database>,
    Query(query): Query<PointsImportQuery>,
    body: Bytes,
) -> Result<Json<PointsImportSummary>, WebError> {
    let summary = services::import_points(db.pool(), &body, query.validate_only).await?;
    Ok(Json(summary))
}
