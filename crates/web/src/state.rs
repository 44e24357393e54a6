use axum::extract::FromRef;
use storage::Database;

use crate::events::MatchEvents;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db: Database,
    pub events: MatchEvents,
}
