use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::team::{CreateTeamRequest, TeamDetailResponse, UpdateTeamRequest},
    models::Team,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::extract::AppJson;

use super::services;

#[utoipa::path(
    get,
    path = "/api/teams",
    responses(
        (status = 200, description = "List all teams", body = Vec<Team>)
    ),
    tag = "teams"
)]
pub async fn list_teams(State(db): State<Database>) -> Result<Json<Vec<Team>>, WebError> {
    let teams = services::list_teams(db.pool()).await?;
    Ok(Json(teams))
}

#[utoipa::path(
    get,
    path = "/api/teams/{id}",
    params(
        ("id" = Uuid, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Team with its players", body = TeamDetailResponse),
        (status = 404, description = "Team not found")
    ),
    tag = "teams"
)]
pub async fn get_team(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamDetailResponse>, WebError> {
    let team = services::get_team(db.pool(), id).await?;
    Ok(Json(team))
}

#[utoipa::path(
    post,
    path = "/api/teams",
    request_body = CreateTeamRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Team created successfully", body = Team),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Team name already exists")
    ),
    tag = "teams"
)]
pub async fn create_team(
    State(db): State<Database>,
    AppJson(req): AppJson<CreateTeamRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let team = services::create_team(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(team)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/teams/{id}",
    params(
        ("id" = Uuid, Path, description = "Team ID")
    ),
    request_body = UpdateTeamRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Team updated successfully", body = Team),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found"),
        (status = 409, description = "Team name already exists")
    ),
    tag = "teams"
)]
pub async fn update_team(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<UpdateTeamRequest>,
) -> Result<Json<Team>, WebError> {
    req.validate()?;

    let team = services::update_team(db.pool(), id, &req).await?;

    Ok(Json(team))
}

#[utoipa::path(
    delete,
    path = "/api/teams/{id}",
    params(
        ("id" = Uuid, Path, description = "Team ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Team deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found")
    ),
    tag = "teams"
)]
pub async fn delete_team(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, WebError> {
    services::delete_team(db.pool(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
