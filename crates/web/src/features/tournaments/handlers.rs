use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::tournament::{
        AddTeamRequest, CreateTournamentRequest, GenerateMatchesRequest, GenerationSummary,
        StandingsResponse, UpdateTournamentRequest,
    },
    models::{Team, Tournament, TournamentGroup},
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::extract::AppJson;

use super::services;

#[utoipa::path(
    get,
    path = "/api/tournaments",
    responses(
        (status = 200, description = "List all tournaments", body = Vec<Tournament>)
    ),
    tag = "tournaments"
)]
pub async fn list_tournaments(
    State(db): State<Database>,
) -> Result<Json<Vec<Tournament>>, WebError> {
    let tournaments = services::list_tournaments(db.pool()).await?;
    Ok(Json(tournaments))
}

#[utoipa::path(
    get,
    path = "/api/tournaments/{id}",
    params(
        ("id" = Uuid, Path, description = "Tournament ID")
    ),
    responses(
        (status = 200, description = "Tournament found", body = Tournament),
        (status = 404, description = "Tournament not found")
    ),
    tag = "tournaments"
)]
pub async fn get_tournament(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Tournament>, WebError> {
    let tournament = services::get_tournament(db.pool(), id).await?;
    Ok(Json(tournament))
}

#[utoipa::path(
    post,
    path = "/api/tournaments",
    request_body = CreateTournamentRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Tournament created successfully", body = Tournament),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "tournaments"
)]
pub async fn create_tournament(
    State(db): State<Database>,
    AppJson(req): AppJson<CreateTournamentRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    req.validate_dates()
        .map_err(|e| WebError::BadRequest(e.to_string()))?;

    let tournament = services::create_tournament(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(tournament)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/tournaments/{id}",
    params(
        ("id" = Uuid, Path, description = "Tournament ID")
    ),
    request_body = UpdateTournamentRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Tournament updated successfully", body = Tournament),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Tournament not found")
    ),
    tag = "tournaments"
)]
pub async fn update_tournament(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<UpdateTournamentRequest>,
) -> Result<Json<Tournament>, WebError> {
    req.validate()?;

    let tournament = services::update_tournament(db.pool(), id, &req).await?;

    Ok(Json(tournament))
}

#[utoipa::path(
    delete,
    path = "/api/tournaments/{id}",
    params(
        ("id" = Uuid, Path, description = "Tournament ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Tournament deleted with its matches and groups"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Tournament not found")
    ),
    tag = "tournaments"
)]
pub async fn delete_tournament(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, WebError> {
    services::delete_tournament(db.pool(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/tournaments/{id}/teams",
    params(
        ("id" = Uuid, Path, description = "Tournament ID")
    ),
    responses(
        (status = 200, description = "Registered teams", body = Vec<Team>),
        (status = 404, description = "Tournament not found")
    ),
    tag = "tournaments"
)]
pub async fn list_tournament_teams(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Team>>, WebError> {
    let teams = services::list_teams(db.pool(), id).await?;
    Ok(Json(teams))
}

#[utoipa::path(
    post,
    path = "/api/tournaments/{id}/teams",
    params(
        ("id" = Uuid, Path, description = "Tournament ID")
    ),
    request_body = AddTeamRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Team registered"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Tournament or team not found"),
        (status = 409, description = "Team already registered")
    ),
    tag = "tournaments"
)]
pub async fn add_tournament_team(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<AddTeamRequest>,
) -> Result<StatusCode, WebError> {
    services::add_team(db.pool(), id, req.team_id).await?;
    Ok(StatusCode::CREATED)
}

#[utoipa::path(
    delete,
    path = "/api/tournaments/{id}/teams/{team_id}",
    params(
        ("id" = Uuid, Path, description = "Tournament ID"),
        ("team_id" = Uuid, Path, description = "Team ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Team withdrawn"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team is not registered in the tournament")
    ),
    tag = "tournaments"
)]
pub async fn remove_tournament_team(
    State(db): State<Database>,
    Path((id, team_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, WebError> {
    services::remove_team(db.pool(), id, team_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/tournaments/{id}/groups",
    params(
        ("id" = Uuid, Path, description = "Tournament ID")
    ),
    responses(
        (status = 200, description = "Groups of a group-stage tournament", body = Vec<TournamentGroup>),
        (status = 404, description = "Tournament not found")
    ),
    tag = "tournaments"
)]
pub async fn list_tournament_groups(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TournamentGroup>>, WebError> {
    let groups = services::list_groups(db.pool(), id).await?;
    Ok(Json(groups))
}

#[utoipa::path(
    post,
    path = "/api/tournaments/{id}/generate-matches",
    params(
        ("id" = Uuid, Path, description = "Tournament ID")
    ),
    request_body = GenerateMatchesRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Schedule replaced", body = GenerationSummary),
        (status = 400, description = "Not enough teams, bad group count or unsupported tournament type"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Tournament not found")
    ),
    tag = "tournaments"
)]
pub async fn generate_matches(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Response, WebError> {
    let req = generation_request(&body)?;
    req.validate()?;

    let summary = services::generate_matches(db.pool(), id, &req).await?;

    Ok((StatusCode::CREATED, Json(summary)).into_response())
}

/// An empty body asks for the defaults; anything else has to parse.
fn generation_request(body: &[u8]) -> Result<GenerateMatchesRequest, WebError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GenerateMatchesRequest::default());
    }

    serde_json::from_slice(body)
        .map_err(|e| WebError::BadRequest(format!("Invalid generation request: {e}")))
}

#[utoipa::path(
    get,
    path = "/api/tournaments/{id}/standings",
    params(
        ("id" = Uuid, Path, description = "Tournament ID")
    ),
    responses(
        (status = 200, description = "Team table over completed matches", body = StandingsResponse),
        (status = 404, description = "Tournament not found")
    ),
    tag = "tournaments"
)]
pub async fn get_standings(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<StandingsResponse>, WebError> {
    let standings = services::standings(db.pool(), id).await?;
    Ok(Json(standings))
}
