use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use super::handlers::{
    cancel_match, create_match, delete_match, end_timeout, get_match, list_matches,
    request_timeout, update_match,
};
use crate::events::stream_match_events;
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_match))
        .route("/:id", put(update_match))
        .route("/:id", delete(delete_match))
        .route("/:id/cancel", post(cancel_match))
        .route("/:id/timeout", post(request_timeout))
        .route("/:id/end-timeout", post(end_timeout))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_matches))
        .route("/events", get(stream_match_events))
        .route("/:id", get(get_match))
        .merge(protected)
}
