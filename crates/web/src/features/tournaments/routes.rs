use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use super::handlers::{
    add_tournament_team, create_tournament, delete_tournament, generate_matches, get_standings,
    get_tournament, list_tournament_groups, list_tournament_teams, list_tournaments,
    remove_tournament_team, update_tournament,
};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_tournament))
        .route("/:id", put(update_tournament))
        .route("/:id", delete(delete_tournament))
        .route("/:id/teams", post(add_tournament_team))
        .route("/:id/teams/:team_id", delete(remove_tournament_team))
        .route("/:id/generate-matches", post(generate_matches))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_tournaments))
        .route("/:id", get(get_tournament))
        .route("/:id/teams", get(list_tournament_teams))
        .route("/:id/groups", get(list_tournament_groups))
        .route("/:id/standings", get(get_standings))
        .merge(protected)
}
