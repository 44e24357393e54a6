use anyhow::Context;
use axum::Router;
use storage::Database;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod events;
mod extract;
mod features;
mod middleware;
mod state;
#[cfg(test)]
mod test_support;

use config::Config;
use events::MatchEvents;
use middleware::auth::ApiKeys;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::tournaments::handlers::list_tournaments,
        features::tournaments::handlers::get_tournament,
        features::tournaments::handlers::create_tournament,
        features::tournaments::handlers::update_tournament,
        features::tournaments::handlers::delete_tournament,
        features::tournaments::handlers::list_tournament_teams,
        features::tournaments::handlers::add_tournament_team,
        features::tournaments::handlers::remove_tournament_team,
        features::tournaments::handlers::list_tournament_groups,
        features::tournaments::handlers::generate_matches,
        features::tournaments::handlers::get_standings,
        features::teams::handlers::list_teams,
        features::teams::handlers::get_team,
        features::teams::handlers::create_team,
        features::teams::handlers::update_team,
        features::teams::handlers::delete_team,
        features::players::handlers::list_players,
        features::players::handlers::player_standings,
        features::players::handlers::get_player,
        features::players::handlers::create_player,
        features::players::handlers::update_player,
        features::players::handlers::delete_player,
        features::players::handlers::import_points,
        features::matches::handlers::list_matches,
        features::matches::handlers::get_match,
        features::matches::handlers::create_match,
        features::matches::handlers::update_match,
        features::matches::handlers::delete_match,
        features::matches::handlers::cancel_match,
        features::matches::handlers::request_timeout,
        features::matches::handlers::end_timeout,
        events::stream_match_events,
        features::audit::handlers::list_audit_logs,
    ),
    components(
        schemas(
            storage::dto::tournament::CreateTournamentRequest,
            storage::dto::tournament::UpdateTournamentRequest,
            storage::dto::tournament::AddTeamRequest,
            storage::dto::tournament::GenerateMatchesRequest,
            storage::dto::tournament::GenerationSummary,
            storage::dto::tournament::StandingsResponse,
            storage::dto::team::CreateTeamRequest,
            storage::dto::team::UpdateTeamRequest,
            storage::dto::team::TeamDetailResponse,
            storage::dto::player::CreatePlayerRequest,
            storage::dto::player::UpdatePlayerRequest,
            storage::dto::player::PlayerStanding,
            storage::dto::player::PointsImportSummary,
            storage::dto::matches::CreateMatchRequest,
            storage::dto::matches::UpdateMatchRequest,
            storage::dto::matches::SetScoreInput,
            storage::dto::matches::TimeoutRequest,
            storage::dto::matches::TimeoutView,
            storage::dto::matches::MatchResponse,
            storage::dto::common::PaginationMeta,
            storage::models::Tournament,
            storage::models::TournamentType,
            storage::models::TournamentStatus,
            storage::models::TournamentGroup,
            storage::models::Team,
            storage::models::Player,
            storage::models::AuditLog,
            storage::services::match_state::MatchStatus,
            storage::services::match_state::MatchEvent,
            storage::services::set_rules::Side,
            storage::services::set_rules::SetPoints,
            storage::services::standings::StandingsRow,
            events::MatchNotification,
        )
    ),
    tags(
        (name = "tournaments", description = "Tournaments, registrations, schedules and standings"),
        (name = "teams", description = "Teams and rosters"),
        (name = "players", description = "Players and individual points"),
        (name = "matches", description = "Match scoring, timeouts and live events"),
        (name = "audit", description = "Administrative change history"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

fn api_routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .nest("/tournaments", features::tournaments::routes::routes(api_keys.clone()))
        .nest("/teams", features::teams::routes::routes(api_keys.clone()))
        .nest("/players", features::players::routes::routes(api_keys.clone()))
        .nest("/matches", features::matches::routes::routes(api_keys.clone()))
        .nest("/audit-logs", features::audit::routes::routes(api_keys))
}

fn app(state: AppState, api_keys: ApiKeys) -> Router {
    Router::new()
        .nest("/api", api_routes(api_keys))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting volleyball league API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::with_max_connections(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    if api_keys.is_empty() {
        tracing::warn!("API_KEYS is empty; every protected endpoint will answer 401");
    }

    let state = AppState {
        db,
        events: MatchEvents::new(config.event_channel_capacity),
    };

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    axum::serve(listener, app(state, api_keys))
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;

    fn test_app() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let state = AppState {
            db: Database::from_pool(pool),
            events: MatchEvents::new(4),
        };
        app(state, ApiKeys::from_comma_separated("secret"))
    }

    #[tokio::test]
    async fn test_mutations_require_api_key() {
        let cases = [
            ("POST", "/api/teams"),
            ("PUT", "/api/matches/6f1c2a9e-2d4b-4c59-9d38-0d6b3f1f8a11"),
            ("POST", "/api/players/points"),
            ("POST", "/api/tournaments/6f1c2a9e-2d4b-4c59-9d38-0d6b3f1f8a11/generate-matches"),
            ("GET", "/api/audit-logs"),
        ];

        for (method, uri) in cases {
            let response = test_app()
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn test_wrong_api_key_is_rejected() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/teams/6f1c2a9e-2d4b-4c59-9d38-0d6b3f1f8a11")
                    .header(header::AUTHORIZATION, "Bearer nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_json_error() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/teams")
                    .header(header::AUTHORIZATION, "Bearer secret")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"name\":"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_validation_runs_before_storage() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/matches")
                    .header(header::AUTHORIZATION, "Bearer secret")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "tournament_id": "6f1c2a9e-2d4b-4c59-9d38-0d6b3f1f8a11",
                            "local_team_id": "0b6a1e0c-8f39-4f43-a4a6-3a1f2f3b4c5d",
                            "visitor_team_id": "0b6a1e0c-8f39-4f43-a4a6-3a1f2f3b4c5d",
                            "number_of_sets": 3
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_generation_body_is_rejected() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/tournaments/6f1c2a9e-2d4b-4c59-9d38-0d6b3f1f8a11/generate-matches")
                    .header(header::AUTHORIZATION, "Bearer secret")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"number_of_groups":"x"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(doc["paths"]["/api/matches/{id}/timeout"].is_object());
        assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
    }
}
