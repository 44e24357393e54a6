use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use super::handlers::{
    create_player, delete_player, get_player, import_points, list_players, player_standings,
    update_player,
};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_player))
        .route("/points", post(import_points))
        .route("/:id", put(update_player))
        .route("/:id", delete(delete_player))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_players))
        .route("/standings", get(player_standings))
        .route("/:id", get(get_player))
        .merge(protected)
}
